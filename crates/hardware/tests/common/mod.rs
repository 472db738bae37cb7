//! Shared harness for integration tests: assemble a program from text
//! lines, run the machine, and inspect architectural state.

use oosim_core::isa::Program;
use oosim_core::sim::parser;
use oosim_core::{Config, Machine};

pub struct TestContext {
    pub machine: Machine,
}

impl TestContext {
    /// Assembles `lines` with the default configuration.
    pub fn assemble(lines: &[&str]) -> Self {
        Self::with_config(lines, &Config::default())
    }

    /// Assembles `lines` with a custom configuration.
    pub fn with_config(lines: &[&str], config: &Config) -> Self {
        let insts = lines.iter().filter_map(|l| parser::parse_line(l)).collect();
        Self {
            machine: Machine::new(Program::new(insts), config),
        }
    }

    /// Runs until a HALT retires or the pipeline drains past end of code.
    /// Panics if neither happens within a generous cycle budget.
    pub fn run_to_halt(&mut self) -> u64 {
        for _ in 0..10_000 {
            if self.machine.halted || self.machine.drained() {
                return self.machine.clock;
            }
            self.machine.tick();
            self.check_occupancy();
        }
        panic!("machine neither halted nor drained within 10000 cycles");
    }

    /// Structure occupancy never exceeds capacity, after every cycle.
    fn check_occupancy(&self) {
        let m = &self.machine;
        assert!(m.iq.len() <= m.iq.capacity());
        assert!(m.lsq.len() <= m.lsq.capacity());
        assert!(m.rob.len() <= m.rob.capacity());
        assert!(m.rename.len() <= m.rename.capacity());
    }

    pub fn reg(&self, idx: usize) -> i32 {
        self.machine.regs.read(idx)
    }

    pub fn mem(&self, addr: usize) -> i32 {
        self.machine.dmem.word(addr)
    }
}
