//! Simulator: owns the machine and drives the run loop.
//!
//! The cycle count passed to [`Simulator::run`] is the absolute clock
//! target: repeated invocations (interactive mode) continue the same run
//! until the requested clock value, a HALT retires, or the pipeline drains
//! past the end of code.

use std::path::Path;
use std::str::FromStr;

use crate::common::error::SimError;
use crate::config::Config;
use crate::core::Machine;
use crate::sim::parser;
use crate::trace;

/// What to show for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Per-cycle trace only.
    Simulate,
    /// Per-cycle trace plus the final architectural state and statistics.
    Display,
}

impl FromStr for RunMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simulate" => Ok(Self::Simulate),
            "display" => Ok(Self::Display),
            _ => Err(()),
        }
    }
}

/// Why a run returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// A HALT retired.
    Halted,
    /// The requested clock value was reached.
    CyclesExhausted,
    /// Fetch passed the end of code and the pipeline drained.
    Drained,
}

/// Top-level simulator: machine plus run control.
#[derive(Debug)]
pub struct Simulator {
    /// The simulated machine.
    pub machine: Machine,
}

impl Simulator {
    /// Loads a program file and builds the machine.
    pub fn load(path: &Path, config: &Config) -> Result<Self, SimError> {
        let program = parser::load_program(path)?;
        trace::print_program(&program);
        Ok(Self {
            machine: Machine::new(program, config),
        })
    }

    /// Runs until the machine clock reaches `num_cycles`, a HALT retires,
    /// or the pipeline drains.
    pub fn run(&mut self, mode: RunMode, num_cycles: u64) -> RunOutcome {
        let mut outcome = RunOutcome::CyclesExhausted;
        while self.machine.clock < num_cycles {
            self.machine.tick();
            if self.machine.halted {
                outcome = RunOutcome::Halted;
                break;
            }
            trace::print_cycle(&self.machine);
            if self.machine.drained() {
                outcome = RunOutcome::Drained;
                break;
            }
        }

        if mode == RunMode::Display {
            trace::print_state(&self.machine);
            self.machine.stats.print();
        }
        outcome
    }
}
