//! Two-stage integer pipeline.
//!
//! Stage one marks the destination register in flight; stage two computes.
//! For memory operations the computation is the effective address, injected
//! back into the load/store queue by the writeback broadcast; everything
//! else produces a register result.

use crate::core::arch::{Flags, RegFile};
use crate::core::pipeline::broadcast::Broadcast;
use crate::core::units::{FuOp, alu};
use crate::stats::SimStats;

/// The integer functional unit.
#[derive(Debug, Default)]
pub struct IntFu {
    /// Stage latches; index 0 is the entry stage, 1 the exit stage.
    stages: [Option<FuOp>; 2],
}

impl IntFu {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// The entry stage is free this cycle.
    pub fn can_accept(&self) -> bool {
        self.stages[0].is_none()
    }

    /// Both stages are empty.
    pub fn is_idle(&self) -> bool {
        self.stages.iter().all(Option::is_none)
    }

    /// Injects a selected instruction into the entry stage.
    pub fn inject(&mut self, op: FuOp) {
        self.stages[0] = Some(op);
    }

    /// Runs both stages for one cycle. The exit stage's result is returned
    /// for the end-of-cycle broadcast.
    pub fn execute(
        &mut self,
        regs: &mut RegFile,
        flags: &mut Flags,
        stats: &mut SimStats,
    ) -> Option<Broadcast> {
        if let Some(op) = &self.stages[0] {
            if op.inst.kind.writes_rd() {
                regs.mark_pending(op.inst.rd);
            }
        }

        let op = self.stages[1].as_ref()?;
        let kind = op.inst.kind;
        if kind.is_mem() {
            let addr = alu::effective_address(kind, op.src1, op.src2, op.inst.imm);
            let store_data = kind.is_store().then_some(op.store_data);
            return Some(Broadcast::MemAddr {
                pc: op.pc,
                lsq_index: op.lsq_index.unwrap_or(usize::MAX),
                addr,
                store_data,
            });
        }

        let (value, fault) = alu::execute(kind, op.src1, op.src2, op.inst.imm, op.pc, flags);
        if let Some(fault) = fault {
            fault.report();
            stats.faults += 1;
        }
        op.dest_tag.map(|tag| Broadcast::Result {
            pc: op.pc,
            tag,
            value,
        })
    }

    /// Advances the pipeline: the exit stage drains, the entry stage moves up.
    pub fn shift(&mut self) {
        self.stages[1] = self.stages[0].take();
    }

    /// Discards both stages. Used by squash.
    pub fn flush(&mut self) {
        self.stages = [None, None];
    }

    /// Stage view for state dumps (0 = entry, 1 = exit).
    pub fn stage(&self, idx: usize) -> Option<&FuOp> {
        self.stages.get(idx).and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::rename::Tag;
    use crate::isa::{Instruction, Opcode};

    fn op(kind: Opcode, rd: usize, src1: i32, src2: i32, imm: i32) -> FuOp {
        FuOp {
            inst: Instruction {
                kind,
                rd,
                rs1: 0,
                rs2: 0,
                imm,
            },
            pc: 4000,
            dest_tag: kind.writes_rd().then_some(Tag(2)),
            src1,
            src2,
            store_data: 0,
            lsq_index: kind.is_mem().then_some(0),
        }
    }

    #[test]
    fn two_cycle_latency() {
        let mut fu = IntFu::new();
        let mut regs = RegFile::new();
        let mut flags = Flags::default();
        let mut stats = SimStats::default();

        fu.inject(op(Opcode::Add, 3, 5, 7, 0));
        // Cycle 1: entry stage only; destination marked in flight.
        assert!(fu.execute(&mut regs, &mut flags, &mut stats).is_none());
        assert_eq!(regs.pending_writers(3), 1);
        fu.shift();
        assert!(fu.can_accept());

        // Cycle 2: exit stage computes and broadcasts.
        let b = fu.execute(&mut regs, &mut flags, &mut stats).unwrap();
        assert_eq!(
            b,
            Broadcast::Result {
                pc: 4000,
                tag: Tag(2),
                value: 12
            }
        );
        fu.shift();
        assert!(fu.stage(1).is_none());
    }

    #[test]
    fn mem_op_produces_address() {
        let mut fu = IntFu::new();
        let mut regs = RegFile::new();
        let mut flags = Flags::default();
        let mut stats = SimStats::default();

        let mut store = op(Opcode::Store, 1, 8, 0, 16);
        store.store_data = 42;
        fu.inject(store);
        fu.execute(&mut regs, &mut flags, &mut stats);
        fu.shift();

        let b = fu.execute(&mut regs, &mut flags, &mut stats).unwrap();
        assert_eq!(
            b,
            Broadcast::MemAddr {
                pc: 4000,
                lsq_index: 0,
                addr: 24,
                store_data: Some(42)
            }
        );
    }

    #[test]
    fn divide_by_zero_counts_a_fault() {
        let mut fu = IntFu::new();
        let mut regs = RegFile::new();
        let mut flags = Flags::default();
        let mut stats = SimStats::default();

        fu.inject(op(Opcode::Div, 3, 9, 0, 0));
        fu.execute(&mut regs, &mut flags, &mut stats);
        fu.shift();
        let b = fu.execute(&mut regs, &mut flags, &mut stats).unwrap();
        assert!(matches!(b, Broadcast::Result { value: 0, .. }));
        assert_eq!(stats.faults, 1);
    }
}
