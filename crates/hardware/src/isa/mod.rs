//! Instruction set definition.
//!
//! This module defines the simulated machine's instruction set. It provides:
//! 1. **Opcode kinds:** The closed set of operations the machine executes.
//! 2. **Operand shapes:** Which registers each kind reads and writes, and
//!    whether it carries an immediate.
//! 3. **Functional-unit classes:** Which execution pipeline each kind uses.

pub mod instruction;

pub use instruction::{Instruction, Program};

/// Operation kinds understood by the machine.
///
/// The set is closed: the parser coerces anything else to [`Opcode::Nop`].
/// Operand shape and functional-unit class are total functions of the kind,
/// so the pipeline never inspects mnemonic text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Opcode {
    /// Store register to `mem[rs1 + imm]`; `rd` is the data source.
    Store,
    /// Store register to `mem[rs1 + rs2]`; `rd` is the data source.
    Str,
    /// Load `mem[rs1 + imm]` into `rd`.
    Load,
    /// Load `mem[rs1 + rs2]` into `rd`.
    Ldr,
    /// Move a literal into `rd`.
    Movc,
    /// Move `rs1` into `rd`.
    Mov,
    /// Integer addition.
    Add,
    /// Integer addition with a literal.
    Addl,
    /// Integer subtraction.
    Sub,
    /// Integer subtraction with a literal.
    Subl,
    /// Integer multiplication.
    Mul,
    /// Integer division.
    Div,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise exclusive OR.
    Exor,
    /// Branch to `pc + imm` when the zero flag is set.
    Bz,
    /// Branch to `pc + imm` when the zero flag is clear.
    Bnz,
    /// Unconditional jump to `rs1 + imm`.
    Jump,
    /// Stop fetching and end the run once retired.
    Halt,
    /// No operation.
    #[default]
    Nop,
}

/// Execution pipeline classes.
///
/// Memory operations are classed as [`FuClass::Int`]: their effective address
/// is computed on the integer pipeline, and the access itself is driven from
/// the load/store queue rather than the issue queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FuClass {
    /// Two-stage integer pipeline (arithmetic, moves, address generation).
    Int,
    /// Three-stage multiply pipeline.
    Mul,
    /// Single-stage branch pipeline.
    Branch,
}

impl Opcode {
    /// The mnemonic as it appears in program text and trace output.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Store => "STORE",
            Self::Str => "STR",
            Self::Load => "LOAD",
            Self::Ldr => "LDR",
            Self::Movc => "MOVC",
            Self::Mov => "MOV",
            Self::Add => "ADD",
            Self::Addl => "ADDL",
            Self::Sub => "SUB",
            Self::Subl => "SUBL",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Exor => "EX-OR",
            Self::Bz => "BZ",
            Self::Bnz => "BNZ",
            Self::Jump => "JUMP",
            Self::Halt => "HALT",
            Self::Nop => "NOP",
        }
    }

    /// Does this kind read `rs1`?
    pub fn reads_rs1(self) -> bool {
        !matches!(
            self,
            Self::Movc | Self::Bz | Self::Bnz | Self::Halt | Self::Nop
        )
    }

    /// Does this kind read `rs2`?
    pub fn reads_rs2(self) -> bool {
        matches!(
            self,
            Self::Str
                | Self::Ldr
                | Self::Add
                | Self::Sub
                | Self::Mul
                | Self::Div
                | Self::And
                | Self::Or
                | Self::Exor
        )
    }

    /// Does this kind read `rd` as a data source (store data)?
    pub fn reads_store_data(self) -> bool {
        matches!(self, Self::Store | Self::Str)
    }

    /// Does this kind write an architectural destination register?
    pub fn writes_rd(self) -> bool {
        matches!(
            self,
            Self::Load
                | Self::Ldr
                | Self::Movc
                | Self::Mov
                | Self::Add
                | Self::Addl
                | Self::Sub
                | Self::Subl
                | Self::Mul
                | Self::Div
                | Self::And
                | Self::Or
                | Self::Exor
        )
    }

    /// Does this kind carry an immediate operand?
    pub fn has_imm(self) -> bool {
        matches!(
            self,
            Self::Store
                | Self::Load
                | Self::Movc
                | Self::Addl
                | Self::Subl
                | Self::Bz
                | Self::Bnz
                | Self::Jump
        )
    }

    /// Is this a memory operation (enters the load/store queue)?
    pub fn is_mem(self) -> bool {
        matches!(self, Self::Store | Self::Str | Self::Load | Self::Ldr)
    }

    /// Is this a store variant?
    pub fn is_store(self) -> bool {
        matches!(self, Self::Store | Self::Str)
    }

    /// Is this a control-transfer operation?
    pub fn is_branch(self) -> bool {
        matches!(self, Self::Bz | Self::Bnz | Self::Jump)
    }

    /// Does execution of this kind update the arithmetic flags?
    ///
    /// BZ/BNZ read the flag state, so they must not overtake an in-flight
    /// instruction of one of these kinds.
    pub fn writes_flags(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Addl | Self::Sub | Self::Subl | Self::Mul | Self::Div
        )
    }

    /// Execution pipeline this kind issues to, if any.
    ///
    /// `HALT` and `NOP` never issue: they enter the reorder buffer already
    /// marked ready.
    pub fn fu_class(self) -> Option<FuClass> {
        match self {
            Self::Mul => Some(FuClass::Mul),
            Self::Bz | Self::Bnz | Self::Jump => Some(FuClass::Branch),
            Self::Halt | Self::Nop => None,
            _ => Some(FuClass::Int),
        }
    }
}
