//! Run statistics collection and reporting.
//!
//! Tracks retire counts, control-flow events, stalls, and faults for a run.
//! Printed after a `display` run.

/// Statistics for one simulation run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimStats {
    /// Clock cycles elapsed.
    pub cycles: u64,
    /// Instructions retired (including NOP and HALT).
    pub retired: u64,
    /// Loads retired.
    pub loads: u64,
    /// Stores retired.
    pub stores: u64,
    /// Branch and jump instructions retired.
    pub branches: u64,
    /// Control transfers resolved taken at execute.
    pub branches_taken: u64,
    /// Full pipeline squashes triggered at commit.
    pub squashes: u64,
    /// Cycles the front end spent stalled on a structural hazard.
    pub stall_cycles: u64,
    /// Non-fatal faults reported (segfaults, divide-by-zero, bad targets).
    pub faults: u64,
}

impl SimStats {
    /// Prints the statistics summary to stdout.
    pub fn print(&self) {
        println!("\n============ SIMULATION STATISTICS ============");
        println!("Cycles              : {}", self.cycles);
        println!("Instructions retired: {}", self.retired);
        if self.cycles > 0 {
            let ipc = self.retired as f64 / self.cycles as f64;
            println!("IPC                 : {ipc:.3}");
        }
        println!("Loads / Stores      : {} / {}", self.loads, self.stores);
        println!(
            "Branches (taken)    : {} ({})",
            self.branches, self.branches_taken
        );
        println!("Squashes            : {}", self.squashes);
        println!("Front-end stalls    : {}", self.stall_cycles);
        println!("Faults              : {}", self.faults);
    }
}
