//! Error and diagnostic definitions.
//!
//! Two severities exist in the simulator:
//! 1. **[`SimError`]** — fatal; only program load can fail this way.
//! 2. **[`Fault`]** — non-fatal runtime diagnostics. A fault is reported to
//!    stderr at the point of detection, the offending operation is
//!    suppressed, and the pipeline continues.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal simulator errors.
#[derive(Debug, Error)]
pub enum SimError {
    /// The program file could not be read.
    #[error("unable to read program file {path:?}: {source}")]
    ProgramRead {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The program file contained no instructions.
    #[error("program file {path:?} contains no instructions")]
    EmptyProgram {
        /// Path of the empty file.
        path: PathBuf,
    },
}

/// Non-fatal runtime diagnostics.
///
/// Variants carry the values needed to reproduce the original report text:
/// addresses for segmentation faults, the pc for arithmetic faults, and the
/// offending text for parse-time coercions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// A memory read outside `0..=4095`. The read returns zero.
    #[error("Segmentation fault for accessing memory location :: {0}")]
    MemoryLoad(i32),

    /// A memory write outside `0..=4095`. The write is suppressed.
    #[error("Segmentation fault for writing memory location :: {0}")]
    MemoryStore(i32),

    /// A register index outside the architectural file. The access reads zero.
    #[error("Segmentation fault for Register location :: {0}")]
    RegisterIndex(usize),

    /// Division by zero; the result is forced to zero.
    #[error("Division By Zero Returning Value Zero at pc({0})")]
    DivideByZero(u32),

    /// A branch target that is misaligned or outside code memory; the branch
    /// acts as not-taken.
    #[error("Instruction {kind} Invalid Relative Address {target}")]
    InvalidBranchTarget {
        /// Mnemonic of the branch.
        kind: &'static str,
        /// The rejected target address.
        target: i64,
    },

    /// An unrecognized mnemonic in program text, coerced to NOP.
    #[error("Invalid Instruction Found! Replacing {0} with NOP Instruction")]
    UnknownOpcode(String),
}

impl Fault {
    /// Writes the diagnostic to stderr.
    pub fn report(&self) {
        eprintln!("{self}");
    }
}
