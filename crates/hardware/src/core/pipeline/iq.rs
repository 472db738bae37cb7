//! Issue queue: unordered wait stations with broadcast wakeup.
//!
//! Eight slots by default, unordered. Each cycle the selection logic picks
//! at most one all-ready instruction per functional-unit class, oldest
//! first by residency counter. Store variants additionally require their
//! store-data register before issuing for address generation.

use crate::core::pipeline::latches::Operand;
use crate::core::pipeline::rename::Tag;
use crate::core::pipeline::rob::Rob;
use crate::isa::{FuClass, Instruction, Opcode};

/// An occupied issue queue slot.
#[derive(Debug, Clone, Copy)]
pub struct IqEntry {
    /// The instruction (kind, register indices, immediate).
    pub inst: Instruction,
    /// Program counter.
    pub pc: u32,
    /// Destination tag for writing kinds.
    pub dest_tag: Option<Tag>,
    /// First source operand.
    pub src1: Operand,
    /// Second source operand.
    pub src2: Operand,
    /// Store-data operand for STORE/STR.
    pub store_src: Operand,
    /// Back-pointer into the load/store queue for memory ops.
    pub lsq_index: Option<usize>,
    /// Cycles spent waiting; selection prefers the largest.
    pub age: u32,
}

impl IqEntry {
    /// All operands the shape requires are present.
    pub fn operands_ready(&self) -> bool {
        let kind = self.inst.kind;
        (!kind.reads_rs1() || self.src1.ready)
            && (!kind.reads_rs2() || self.src2.ready)
            && (!kind.reads_store_data() || self.store_src.ready)
    }
}

/// The issue queue.
#[derive(Debug)]
pub struct IssueQueue {
    slots: Vec<Option<IqEntry>>,
}

impl IssueQueue {
    /// Creates an issue queue with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Capacity of the queue.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// True when no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// True when no slot is free.
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Inserts an entry into a free slot. Returns `false` when full.
    pub fn insert(&mut self, entry: IqEntry) -> bool {
        match self.slots.iter_mut().find(|s| s.is_none()) {
            Some(slot) => {
                *slot = Some(entry);
                true
            }
            None => false,
        }
    }

    /// Broadcast wakeup: every pending operand waiting on `tag` copies the
    /// value and becomes ready.
    pub fn wake(&mut self, tag: Tag, value: i32) {
        for entry in self.slots.iter_mut().flatten() {
            let _ = entry.src1.wake(tag, value);
            let _ = entry.src2.wake(tag, value);
            if entry.inst.kind.reads_store_data() {
                let _ = entry.store_src.wake(tag, value);
            }
        }
    }

    /// Selects the oldest all-ready instruction of `class`, removing it from
    /// the queue. Entries must have waited at least one full cycle, and a
    /// conditional branch additionally waits until no older flag producer is
    /// still in flight.
    pub fn select(&mut self, class: FuClass, rob: &Rob) -> Option<IqEntry> {
        let mut best: Option<usize> = None;
        for (i, slot) in self.slots.iter().enumerate() {
            let Some(entry) = slot else { continue };
            if entry.inst.kind.fu_class() != Some(class)
                || entry.age == 0
                || !entry.operands_ready()
            {
                continue;
            }
            if matches!(entry.inst.kind, Opcode::Bz | Opcode::Bnz)
                && rob.flag_hazard_before(entry.pc)
            {
                continue;
            }
            match best {
                Some(b) if self.slots[b].is_some_and(|e| e.age >= entry.age) => {}
                _ => best = Some(i),
            }
        }
        best.and_then(|i| self.slots[i].take())
    }

    /// Advances every occupied slot's residency counter.
    pub fn tick_ages(&mut self) {
        for entry in self.slots.iter_mut().flatten() {
            entry.age += 1;
        }
    }

    /// Discards every entry. Used by squash.
    pub fn flush(&mut self) {
        self.slots.fill(None);
    }

    /// Raw slot view for state dumps.
    pub fn slot(&self, idx: usize) -> Option<&IqEntry> {
        self.slots.get(idx).and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::rob::RobEntry;

    fn empty_rob() -> Rob {
        Rob::new(12)
    }

    fn entry(kind: Opcode, pc: u32, src1: Operand, src2: Operand) -> IqEntry {
        IqEntry {
            inst: Instruction {
                kind,
                rd: 0,
                rs1: src1.reg,
                rs2: src2.reg,
                imm: 0,
            },
            pc,
            dest_tag: Some(Tag(0)),
            src1,
            src2,
            store_src: Operand::unused(),
            lsq_index: None,
            age: 0,
        }
    }

    #[test]
    fn wakeup_fills_pending_sources() {
        let mut iq = IssueQueue::new(4);
        iq.insert(entry(
            Opcode::Add,
            4008,
            Operand::pending(1, Tag(3)),
            Operand::ready(2, 7),
        ));

        iq.wake(Tag(3), 5);
        let e = iq.slot(0).unwrap();
        assert!(e.src1.ready);
        assert_eq!(e.src1.value, 5);
    }

    #[test]
    fn select_requires_one_cycle_residency() {
        let mut iq = IssueQueue::new(4);
        iq.insert(entry(
            Opcode::Movc,
            4000,
            Operand::unused(),
            Operand::unused(),
        ));
        assert!(iq.select(FuClass::Int, &empty_rob()).is_none());

        iq.tick_ages();
        assert!(iq.select(FuClass::Int, &empty_rob()).is_some());
        assert!(iq.is_empty());
    }

    #[test]
    fn select_prefers_oldest() {
        let mut iq = IssueQueue::new(4);
        iq.insert(entry(
            Opcode::Movc,
            4000,
            Operand::unused(),
            Operand::unused(),
        ));
        iq.tick_ages();
        iq.insert(entry(
            Opcode::Movc,
            4004,
            Operand::unused(),
            Operand::unused(),
        ));
        iq.tick_ages();

        let picked = iq.select(FuClass::Int, &empty_rob()).unwrap();
        assert_eq!(picked.pc, 4000);
    }

    #[test]
    fn select_skips_not_ready_and_wrong_class() {
        let mut iq = IssueQueue::new(4);
        iq.insert(entry(
            Opcode::Add,
            4000,
            Operand::pending(1, Tag(0)),
            Operand::ready(2, 1),
        ));
        iq.insert(entry(
            Opcode::Mul,
            4004,
            Operand::ready(1, 2),
            Operand::ready(2, 3),
        ));
        iq.tick_ages();

        // The ADD is not ready; the MUL is, but only for the MUL pipeline.
        assert!(iq.select(FuClass::Int, &empty_rob()).is_none());
        assert_eq!(iq.select(FuClass::Mul, &empty_rob()).unwrap().pc, 4004);
    }

    #[test]
    fn store_waits_for_its_data_register() {
        let mut iq = IssueQueue::new(4);
        let mut e = entry(
            Opcode::Store,
            4000,
            Operand::ready(2, 0),
            Operand::unused(),
        );
        e.store_src = Operand::pending(1, Tag(4));
        e.dest_tag = None;
        iq.insert(e);
        iq.tick_ages();

        assert!(iq.select(FuClass::Int, &empty_rob()).is_none());
        iq.wake(Tag(4), 42);
        let picked = iq.select(FuClass::Int, &empty_rob()).unwrap();
        assert_eq!(picked.store_src.value, 42);
    }

    #[test]
    fn branches_are_always_ready() {
        let mut iq = IssueQueue::new(4);
        let mut e = entry(Opcode::Bz, 4008, Operand::unused(), Operand::unused());
        e.dest_tag = None;
        iq.insert(e);
        iq.tick_ages();
        assert!(iq.select(FuClass::Branch, &empty_rob()).is_some());
    }

    #[test]
    fn conditional_branch_waits_for_older_flag_producer() {
        let mut rob = Rob::new(12);
        rob.allocate(RobEntry {
            kind: Opcode::Add,
            pc: 4000,
            ..RobEntry::default()
        });
        rob.allocate(RobEntry {
            kind: Opcode::Bz,
            pc: 4004,
            ..RobEntry::default()
        });

        let mut iq = IssueQueue::new(4);
        let mut e = entry(Opcode::Bz, 4004, Operand::unused(), Operand::unused());
        e.dest_tag = None;
        iq.insert(e);
        iq.tick_ages();

        // The ADD ahead of the branch has not executed; the branch holds.
        assert!(iq.select(FuClass::Branch, &rob).is_none());

        rob.complete(4000, 0);
        assert!(iq.select(FuClass::Branch, &rob).is_some());
    }

    #[test]
    fn full_queue_rejects() {
        let mut iq = IssueQueue::new(1);
        assert!(iq.insert(entry(
            Opcode::Movc,
            4000,
            Operand::unused(),
            Operand::unused()
        )));
        assert!(iq.is_full());
        assert!(!iq.insert(entry(
            Opcode::Movc,
            4004,
            Operand::unused(),
            Operand::unused()
        )));
    }
}
