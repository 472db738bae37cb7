//! The machine: owned state and the per-cycle tick.
//!
//! The entire simulated machine is one owned object; one [`Machine::tick`]
//! advances every component once. Within a tick the steps run
//! leaves-first so that simulated parallelism stays consistent:
//!
//! 1. commit, so freed resources are visible to this cycle's dispatch;
//! 2. issue from the issue queue and the load/store queue head;
//! 3. execute every functional-unit stage;
//! 4. dispatch from decode into ROB/IQ/LSQ;
//! 5. advance the fetch latch into decode;
//! 6. decode (rename and operand read);
//! 7. fetch;
//! 8. writeback broadcast from the exit stages;
//! 9. shift the functional-unit pipelines.
//!
//! Writeback runs after execute, so operands consumed at issue are those of
//! the previous cycle's broadcast; commit runs before dispatch, so a
//! retiring slot is visibly free to the same cycle's dispatch.

use crate::common::constants::PC_BASE;
use crate::config::Config;
use crate::core::arch::{DataMemory, Flags, RegFile};
use crate::core::pipeline::broadcast::{self, Broadcast};
use crate::core::pipeline::commit::{self, CommitOutcome};
use crate::core::pipeline::frontend::Frontend;
use crate::core::pipeline::iq::{IqEntry, IssueQueue};
use crate::core::pipeline::lsq::LoadStoreQueue;
use crate::core::pipeline::rename::RenameTable;
use crate::core::pipeline::rob::Rob;
use crate::core::units::{BranchFu, FuOp, IntFu, MemFu, MulFu};
use crate::isa::{FuClass, Program};
use crate::stats::SimStats;

/// The complete simulated machine.
#[derive(Debug)]
pub struct Machine {
    /// Clock cycles elapsed.
    pub clock: u64,
    /// Program counter of the next fetch.
    pub pc: u32,
    /// Architectural register file with in-flight writer counts.
    pub regs: RegFile,
    /// Flag register.
    pub flags: Flags,
    /// Data memory.
    pub dmem: DataMemory,
    /// Code memory.
    pub program: Program,
    /// Fetch and decode latches.
    pub frontend: Frontend,
    /// Rename table.
    pub rename: RenameTable,
    /// Reorder buffer.
    pub rob: Rob,
    /// Issue queue.
    pub iq: IssueQueue,
    /// Load/store queue.
    pub lsq: LoadStoreQueue,
    /// Integer pipeline.
    pub int_fu: IntFu,
    /// Multiply pipeline.
    pub mul_fu: MulFu,
    /// Branch pipeline.
    pub branch_fu: BranchFu,
    /// Memory access unit.
    pub mem_fu: MemFu,
    /// Run statistics.
    pub stats: SimStats,
    /// Gate per-stage stderr diagnostics.
    pub trace: bool,
    /// A HALT has retired.
    pub halted: bool,
    broadcasts: Vec<Broadcast>,
}

impl Machine {
    /// Builds a machine for `program` with the given configuration.
    pub fn new(program: Program, config: &Config) -> Self {
        Self {
            clock: 0,
            pc: PC_BASE,
            regs: RegFile::new(),
            flags: Flags::default(),
            dmem: DataMemory::new(config.memory.data_words),
            program,
            frontend: Frontend::new(),
            rename: RenameTable::new(config.pipeline.rename_slots),
            rob: Rob::new(config.pipeline.rob_size),
            iq: IssueQueue::new(config.pipeline.iq_size),
            lsq: LoadStoreQueue::new(config.pipeline.lsq_size),
            int_fu: IntFu::new(),
            mul_fu: MulFu::new(),
            branch_fu: BranchFu::new(),
            mem_fu: MemFu::new(),
            stats: SimStats::default(),
            trace: config.general.trace,
            halted: false,
            broadcasts: Vec::with_capacity(4),
        }
    }

    /// Advances the machine by one clock cycle.
    pub fn tick(&mut self) {
        if self.halted {
            return;
        }
        self.clock += 1;
        self.stats.cycles += 1;

        match commit::commit_stage(
            &mut self.rob,
            &mut self.rename,
            &mut self.regs,
            &mut self.stats,
        ) {
            CommitOutcome::Halted => {
                if self.trace {
                    eprintln!("CM  cycle={} HALT retired", self.clock);
                }
                self.halted = true;
                return;
            }
            CommitOutcome::Squash { target } => {
                if self.trace {
                    eprintln!("CM  cycle={} SQUASH -> pc({target})", self.clock);
                }
                self.squash_to(target);
            }
            CommitOutcome::Idle | CommitOutcome::Retired => {}
        }

        self.issue();
        self.execute();

        self.frontend
            .dispatch(&mut self.rob, &mut self.iq, &mut self.lsq, &mut self.stats);
        self.frontend.advance();
        self.frontend.decode(
            &mut self.rename,
            &self.rob,
            &self.regs,
            &mut self.flags,
            &mut self.stats,
        );
        self.frontend.fetch(&mut self.pc, &self.program);

        let pending = std::mem::take(&mut self.broadcasts);
        for b in pending {
            broadcast::apply(
                b,
                &mut self.rob,
                &mut self.iq,
                &mut self.lsq,
                self.frontend.decode.as_mut(),
            );
        }

        self.int_fu.shift();
        self.mul_fu.shift();
        self.branch_fu.shift();

        self.iq.tick_ages();
        self.lsq.tick_ages();
    }

    /// True when nothing remains in flight and fetch has passed the last
    /// instruction: the run can only idle from here.
    pub fn drained(&self) -> bool {
        self.frontend.drained()
            && self.rob.is_empty()
            && self.iq.is_empty()
            && self.lsq.is_empty()
            && self.int_fu.is_idle()
            && self.mul_fu.is_idle()
            && self.branch_fu.can_accept()
            && self.mem_fu.is_idle()
    }

    fn issue(&mut self) {
        if self.int_fu.can_accept()
            && let Some(e) = self.iq.select(FuClass::Int, &self.rob)
        {
            if self.trace {
                eprintln!("IS  cycle={} pc({}) -> INT", self.clock, e.pc);
            }
            self.int_fu.inject(Self::fu_op(&e));
        }
        if self.mul_fu.can_accept()
            && let Some(e) = self.iq.select(FuClass::Mul, &self.rob)
        {
            if self.trace {
                eprintln!("IS  cycle={} pc({}) -> MUL", self.clock, e.pc);
            }
            self.mul_fu.inject(Self::fu_op(&e));
        }
        if self.branch_fu.can_accept()
            && let Some(e) = self.iq.select(FuClass::Branch, &self.rob)
        {
            if self.trace {
                eprintln!("IS  cycle={} pc({}) -> BRANCH", self.clock, e.pc);
            }
            self.branch_fu.inject(Self::fu_op(&e));
        }
        if self.mem_fu.is_idle()
            && let Some(entry) = self.lsq.issue_head()
        {
            if self.trace {
                eprintln!("IS  cycle={} pc({}) -> MEM", self.clock, entry.pc);
            }
            self.mem_fu.inject(entry);
        }
    }

    fn execute(&mut self) {
        if let Some(b) = self
            .int_fu
            .execute(&mut self.regs, &mut self.flags, &mut self.stats)
        {
            self.broadcasts.push(b);
        }
        if let Some(b) = self.mul_fu.execute(&mut self.regs, &mut self.flags) {
            self.broadcasts.push(b);
        }
        if let Some(b) = self
            .branch_fu
            .execute(&self.flags, self.program.len(), &mut self.stats)
        {
            if let Broadcast::Branch {
                taken: true,
                target,
                ..
            } = b
            {
                self.stats.branches_taken += 1;
                // Same-cycle front-end squash: the latches hold wrong-path
                // instructions; a tag already allocated in decode is freed.
                if let Some(dropped) = self.frontend.redirect()
                    && let Some(tag) = dropped.dest_tag
                {
                    self.rename.release(tag, dropped.inst.rd);
                }
                self.pc = target;
                self.frontend.branch_stall = 1;
                if self.trace {
                    eprintln!("BR  cycle={} taken -> pc({target})", self.clock);
                }
            }
            self.broadcasts.push(b);
        }
        if let Some(b) = self.mem_fu.execute(&mut self.dmem, &mut self.stats) {
            self.lsq.complete_head();
            self.broadcasts.push(b);
        }
    }

    /// Full mispredict recovery: discard all in-flight state and restart
    /// fetch at `target`.
    fn squash_to(&mut self, target: u32) {
        self.rename.flush();
        self.rob.flush();
        self.iq.flush();
        self.lsq.flush();
        self.int_fu.flush();
        self.mul_fu.flush();
        self.branch_fu.flush();
        self.mem_fu.flush();
        self.frontend.flush();
        self.regs.reset_pending();
        self.broadcasts.clear();
        self.pc = target;
        self.frontend.branch_stall = 1;
    }

    fn fu_op(e: &IqEntry) -> FuOp {
        FuOp {
            inst: e.inst,
            pc: e.pc,
            dest_tag: e.dest_tag,
            src1: e.src1.value,
            src2: e.src2.value,
            store_data: e.store_src.value,
            lsq_index: e.lsq_index,
        }
    }
}
