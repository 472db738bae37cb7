//! Simulation: program loading and the run loop.

pub mod parser;
pub mod simulator;

pub use simulator::{RunMode, RunOutcome, Simulator};
