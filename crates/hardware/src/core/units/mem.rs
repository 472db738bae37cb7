//! Memory access unit: three-cycle, single in-flight.
//!
//! Accepts the runnable head of the load/store queue. The first two cycles
//! elapse; the access itself happens on the third, after which the result is
//! broadcast and the queue slot is freed by the caller.

use crate::common::constants::MEM_LATENCY;
use crate::core::arch::DataMemory;
use crate::core::pipeline::broadcast::Broadcast;
use crate::core::pipeline::lsq::LsqEntry;
use crate::stats::SimStats;

/// The memory functional unit.
#[derive(Debug, Default)]
pub struct MemFu {
    op: Option<LsqEntry>,
    cycle: u8,
}

impl MemFu {
    /// Creates an idle unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// The unit holds no access.
    pub fn is_idle(&self) -> bool {
        self.op.is_none()
    }

    /// Starts an access for the given queue entry.
    pub fn inject(&mut self, entry: LsqEntry) {
        self.op = Some(entry);
        self.cycle = 0;
    }

    /// Advances the access by one cycle. On the final cycle the access is
    /// performed and its completion returned; the caller frees the queue
    /// head.
    pub fn execute(&mut self, dmem: &mut DataMemory, stats: &mut SimStats) -> Option<Broadcast> {
        let op = self.op.as_ref()?;
        self.cycle += 1;
        if self.cycle < MEM_LATENCY {
            return None;
        }

        let addr = op.addr.unwrap_or(0);
        let result = if op.inst.kind.is_store() {
            if let Err(fault) = dmem.store(addr, op.data.value) {
                fault.report();
                stats.faults += 1;
            }
            Broadcast::StoreDone { pc: op.pc }
        } else {
            let value = match dmem.load(addr) {
                Ok(v) => v,
                Err(fault) => {
                    fault.report();
                    stats.faults += 1;
                    0
                }
            };
            match op.dest_tag {
                Some(tag) => Broadcast::Result {
                    pc: op.pc,
                    tag,
                    value,
                },
                None => Broadcast::StoreDone { pc: op.pc },
            }
        };

        self.op = None;
        self.cycle = 0;
        Some(result)
    }

    /// Discards the in-flight access. Used by squash.
    pub fn flush(&mut self) {
        self.op = None;
        self.cycle = 0;
    }

    /// The in-flight access and its elapsed cycles, for state dumps.
    pub fn in_flight(&self) -> Option<(&LsqEntry, u8)> {
        self.op.as_ref().map(|op| (op, self.cycle))
    }
}
