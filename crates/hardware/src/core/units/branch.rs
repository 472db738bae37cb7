//! Single-stage branch pipeline.
//!
//! Resolves BZ/BNZ against the flag state at execute and JUMP
//! unconditionally. Targets are validated for alignment and code-memory
//! range; an invalid target is reported and the branch acts as not-taken.

use crate::common::constants::{INSTRUCTION_BYTES, PC_BASE};
use crate::common::error::Fault;
use crate::core::arch::Flags;
use crate::core::pipeline::broadcast::Broadcast;
use crate::core::units::FuOp;
use crate::isa::Opcode;
use crate::stats::SimStats;

/// The branch functional unit.
#[derive(Debug, Default)]
pub struct BranchFu {
    stage: Option<FuOp>,
}

impl BranchFu {
    /// Creates an empty unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// The unit is free this cycle.
    pub fn can_accept(&self) -> bool {
        self.stage.is_none()
    }

    /// Injects a selected branch.
    pub fn inject(&mut self, op: FuOp) {
        self.stage = Some(op);
    }

    /// Resolves the held branch, if any. `code_len` bounds the valid target
    /// range.
    pub fn execute(&mut self, flags: &Flags, code_len: usize, stats: &mut SimStats) -> Option<Broadcast> {
        let op = self.stage.as_ref()?;
        let kind = op.inst.kind;

        let mut taken = match kind {
            Opcode::Bz => flags.zero,
            Opcode::Bnz => !flags.zero,
            Opcode::Jump => true,
            _ => false,
        };

        let target = match kind {
            Opcode::Bz | Opcode::Bnz => i64::from(op.pc) + i64::from(op.inst.imm),
            Opcode::Jump => i64::from(op.src1) + i64::from(op.inst.imm),
            _ => 0,
        };

        let end = i64::from(PC_BASE) + (code_len as i64) * i64::from(INSTRUCTION_BYTES);
        let valid =
            target % i64::from(INSTRUCTION_BYTES) == 0 && target >= i64::from(PC_BASE) && target <= end;
        if taken && !valid {
            Fault::InvalidBranchTarget {
                kind: kind.mnemonic(),
                target,
            }
            .report();
            stats.faults += 1;
            taken = false;
        }

        Some(Broadcast::Branch {
            pc: op.pc,
            taken,
            target: if valid { target as u32 } else { op.pc + INSTRUCTION_BYTES },
        })
    }

    /// Drains the unit at the end of the cycle.
    pub fn shift(&mut self) {
        self.stage = None;
    }

    /// Discards the held branch. Used by squash.
    pub fn flush(&mut self) {
        self.stage = None;
    }

    /// Stage view for state dumps.
    pub fn stage(&self) -> Option<&FuOp> {
        self.stage.as_ref()
    }
}
