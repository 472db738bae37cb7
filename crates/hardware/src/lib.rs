//! Cycle-accurate out-of-order pipeline simulator library.
//!
//! This crate implements a functional, cycle-accurate simulator of a
//! pipelined, out-of-order, register-renamed machine running a small
//! RISC-like instruction set. It provides:
//! 1. **ISA:** The closed opcode set, operand shapes, and code memory.
//! 2. **Architectural state:** Register file with in-flight writer counts,
//!    flags, and a flat word-addressed data memory.
//! 3. **Out-of-order engine:** Rename table, reorder buffer, issue queue,
//!    load/store queue, fixed-latency functional units, writeback
//!    broadcast, and in-order commit with mispredict recovery.
//! 4. **Simulation:** Program parser, `Simulator` run loop, per-cycle
//!    trace, and statistics.

/// Common types and constants (errors, machine parameters).
pub mod common;
/// Simulator configuration (defaults and hierarchical structures).
pub mod config;
/// Machine core: architectural state, pipeline, functional units.
pub mod core;
/// Instruction set (opcodes, operand shapes, code memory).
pub mod isa;
/// Simulation: program parser and run loop.
pub mod sim;
/// Run statistics collection and reporting.
pub mod stats;
/// Per-cycle trace and state dumps.
pub mod trace;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// The simulated machine; one `tick()` advances every component once.
pub use crate::core::Machine;
/// Top-level simulator; owns the machine and drives the run loop.
pub use crate::sim::simulator::Simulator;
