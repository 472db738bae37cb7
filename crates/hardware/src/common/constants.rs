//! Machine-wide constants.
//!
//! These are the fixed architectural parameters of the simulated machine.
//! Structure sizes can be overridden through [`crate::config::Config`]; the
//! values here are the hardware defaults.

/// Address of the first instruction.
pub const PC_BASE: u32 = 4000;

/// Size of one instruction in bytes.
pub const INSTRUCTION_BYTES: u32 = 4;

/// Number of architectural integer registers.
pub const REGISTER_COUNT: usize = 32;

/// Number of words in data memory.
pub const DATA_MEMORY_WORDS: usize = 4096;

/// Issue queue capacity.
pub const IQ_SIZE: usize = 8;

/// Load/store queue capacity.
pub const LSQ_SIZE: usize = 6;

/// Reorder buffer capacity.
pub const ROB_SIZE: usize = 12;

/// Number of rename (physical tag) slots.
pub const RENAME_SLOTS: usize = 24;

/// Cycles a memory access occupies the MEM unit.
pub const MEM_LATENCY: u8 = 3;

/// Number of leading memory words included in the state dump.
pub const MEMORY_DUMP_WORDS: usize = 100;
