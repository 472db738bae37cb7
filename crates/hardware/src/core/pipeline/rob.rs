//! Reorder buffer (ROB) for in-order commit.
//!
//! The ROB is a circular buffer tracking every in-flight instruction from
//! dispatch through commit. It provides:
//! 1. **Allocation:** Entries are appended at the tail in program order.
//! 2. **Completion:** Writeback marks entries ready by program counter,
//!    which is unique among in-flight instructions.
//! 3. **In-order commit:** The head retires only once ready.
//! 4. **Forwarding:** The value of an already-completed tag can be read at
//!    rename time.
//! 5. **Flush:** Squash discards all entries.

use crate::core::pipeline::rename::Tag;
use crate::isa::Opcode;

/// A single reorder buffer entry.
#[derive(Debug, Clone, Default)]
pub struct RobEntry {
    /// Operation kind.
    pub kind: Opcode,
    /// Program counter, unique among in-flight entries.
    pub pc: u32,
    /// Destination architectural register (meaningful when `kind` writes).
    pub dest_arch: usize,
    /// Physical tag allocated for the destination, if any.
    pub dest_tag: Option<Tag>,
    /// Result value; branch entries carry the resolved target here.
    pub value: i32,
    /// Result ready (entry may commit).
    pub ready: bool,
    /// Branch entries: resolved taken. Doubles as the exception bit.
    pub taken: bool,
    /// Entry is occupied.
    pub valid: bool,
}

/// The reorder buffer.
#[derive(Debug)]
pub struct Rob {
    entries: Vec<RobEntry>,
    head: usize,
    tail: usize,
    len: usize,
}

impl Rob {
    /// Creates a ROB with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![RobEntry::default(); capacity],
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Capacity of the buffer.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Number of in-flight entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no instruction is in flight.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when no slot is free.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.entries.len()
    }

    /// Appends an entry at the tail. Returns `false` when full.
    pub fn allocate(&mut self, entry: RobEntry) -> bool {
        if self.is_full() {
            return false;
        }
        self.entries[self.tail] = RobEntry {
            valid: true,
            ..entry
        };
        self.tail = (self.tail + 1) % self.entries.len();
        self.len += 1;
        true
    }

    /// Marks the entry with program counter `pc` ready with `value`.
    pub fn complete(&mut self, pc: u32, value: i32) {
        if let Some(e) = self.find_mut(pc) {
            e.value = value;
            e.ready = true;
        }
    }

    /// Records a branch outcome: ready, taken bit, and the resolved target
    /// in the value field.
    pub fn resolve_branch(&mut self, pc: u32, taken: bool, target: u32) {
        if let Some(e) = self.find_mut(pc) {
            e.ready = true;
            e.taken = taken;
            e.value = target as i32;
        }
    }

    /// Value of an in-flight completed definition of `tag`, if any.
    ///
    /// Used at rename time: a source whose producer has already broadcast
    /// must take its value here, since the broadcast will not recur.
    pub fn ready_value(&self, tag: Tag) -> Option<i32> {
        let mut idx = self.head;
        for _ in 0..self.len {
            let e = &self.entries[idx];
            if e.valid && e.dest_tag == Some(tag) {
                return e.ready.then_some(e.value);
            }
            idx = (idx + 1) % self.entries.len();
        }
        None
    }

    /// The oldest in-flight entry, if any.
    pub fn peek_head(&self) -> Option<&RobEntry> {
        (self.len > 0).then(|| &self.entries[self.head])
    }

    /// True when a flag-writing instruction older than the branch at
    /// `branch_pc` has not yet finished executing. A conditional branch must
    /// wait for it so the flag state it reads is the program-order state.
    pub fn flag_hazard_before(&self, branch_pc: u32) -> bool {
        let mut idx = self.head;
        for _ in 0..self.len {
            let e = &self.entries[idx];
            if e.valid {
                if e.pc == branch_pc {
                    return false;
                }
                if e.kind.writes_flags() && !e.ready {
                    return true;
                }
            }
            idx = (idx + 1) % self.entries.len();
        }
        false
    }

    /// Retires the head entry if it is ready. Returns `None` when the ROB is
    /// empty or the head has not finished.
    pub fn commit_head(&mut self) -> Option<RobEntry> {
        if self.len == 0 || !self.entries[self.head].ready {
            return None;
        }
        let committed = self.entries[self.head].clone();
        self.entries[self.head] = RobEntry::default();
        self.head = (self.head + 1) % self.entries.len();
        self.len -= 1;
        Some(committed)
    }

    /// Discards every entry. Used by squash.
    pub fn flush(&mut self) {
        for e in &mut self.entries {
            *e = RobEntry::default();
        }
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }

    /// Raw entry at a physical slot index, for state dumps.
    pub fn entry_at(&self, idx: usize) -> &RobEntry {
        &self.entries[idx]
    }

    /// Physical index of the commit pointer.
    pub fn head_index(&self) -> usize {
        self.head
    }

    /// Physical index of the next allocation.
    pub fn tail_index(&self) -> usize {
        self.tail
    }

    fn find_mut(&mut self, pc: u32) -> Option<&mut RobEntry> {
        let cap = self.entries.len();
        let mut idx = self.head;
        for _ in 0..self.len {
            if self.entries[idx].valid && self.entries[idx].pc == pc {
                return Some(&mut self.entries[idx]);
            }
            idx = (idx + 1) % cap;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn writer(pc: u32, arch: usize, tag: usize) -> RobEntry {
        RobEntry {
            kind: Opcode::Movc,
            pc,
            dest_arch: arch,
            dest_tag: Some(Tag(tag)),
            ..RobEntry::default()
        }
    }

    #[test]
    fn allocate_and_commit() {
        let mut rob = Rob::new(4);
        assert!(rob.allocate(writer(4000, 1, 0)));
        assert_eq!(rob.len(), 1);

        // Not ready yet.
        assert!(rob.commit_head().is_none());

        rob.complete(4000, 42);
        let e = rob.commit_head().unwrap();
        assert_eq!(e.pc, 4000);
        assert_eq!(e.value, 42);
        assert!(rob.is_empty());
    }

    #[test]
    fn commit_is_in_order() {
        let mut rob = Rob::new(4);
        rob.allocate(writer(4000, 1, 0));
        rob.allocate(writer(4004, 2, 1));

        // Younger finishes first; head still blocks.
        rob.complete(4004, 200);
        assert!(rob.commit_head().is_none());

        rob.complete(4000, 100);
        assert_eq!(rob.commit_head().unwrap().value, 100);
        assert_eq!(rob.commit_head().unwrap().value, 200);
    }

    #[test]
    fn full_rob_rejects() {
        let mut rob = Rob::new(2);
        assert!(rob.allocate(writer(4000, 1, 0)));
        assert!(rob.allocate(writer(4004, 2, 1)));
        assert!(rob.is_full());
        assert!(!rob.allocate(writer(4008, 3, 2)));
    }

    #[test]
    fn ready_value_by_tag() {
        let mut rob = Rob::new(4);
        rob.allocate(writer(4000, 5, 7));
        assert_eq!(rob.ready_value(Tag(7)), None);

        rob.complete(4000, 31);
        assert_eq!(rob.ready_value(Tag(7)), Some(31));
        assert_eq!(rob.ready_value(Tag(8)), None);
    }

    #[test]
    fn branch_outcome_is_recorded() {
        let mut rob = Rob::new(4);
        rob.allocate(RobEntry {
            kind: Opcode::Bz,
            pc: 4008,
            ..RobEntry::default()
        });
        rob.resolve_branch(4008, true, 4016);

        let e = rob.commit_head().unwrap();
        assert!(e.taken);
        assert_eq!(e.value, 4016);
    }

    #[test]
    fn flush_empties_everything() {
        let mut rob = Rob::new(4);
        rob.allocate(writer(4000, 1, 0));
        rob.allocate(writer(4004, 2, 1));
        rob.flush();
        assert!(rob.is_empty());
        assert!(rob.commit_head().is_none());
    }

    proptest! {
        /// Filling and draining through wraparound keeps FIFO order.
        #[test]
        fn wraparound_preserves_order(cap in 2usize..8, rounds in 1usize..40) {
            let mut rob = Rob::new(cap);
            let mut next_pc = 4000u32;
            let mut expect_pc = 4000u32;
            for _ in 0..rounds {
                if rob.allocate(writer(next_pc, 1, 0)) {
                    rob.complete(next_pc, next_pc as i32);
                    next_pc += 4;
                }
                if let Some(e) = rob.commit_head() {
                    prop_assert_eq!(e.pc, expect_pc);
                    expect_pc += 4;
                }
            }
            while let Some(e) = rob.commit_head() {
                prop_assert_eq!(e.pc, expect_pc);
                expect_pc += 4;
            }
            prop_assert!(rob.is_empty());
        }
    }
}
