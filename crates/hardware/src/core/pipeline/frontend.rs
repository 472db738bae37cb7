//! Front end: fetch and decode/rename/dispatch.
//!
//! Two one-entry latches connect code memory to the out-of-order backend:
//! 1. **Fetch** copies the instruction at `pc` into its latch and advances
//!    the pc, stopping at the end-of-code sentinel. While a HALT sits in
//!    decode it fetches exactly one further instruction and then holds.
//! 2. **Decode** renames sources onto the physical name space (reading the
//!    register file when no in-flight writer exists), allocates a
//!    destination tag, and marks the entry ready for dispatch.
//! 3. **Dispatch** builds the reorder-buffer entry (plus issue-queue and
//!    load/store-queue entries) atomically; if any structure is full the
//!    front end stalls and retries next cycle.

use crate::core::arch::{Flags, RegFile};
use crate::core::pipeline::iq::{IqEntry, IssueQueue};
use crate::core::pipeline::latches::{DecodeEntry, FetchEntry, Operand};
use crate::core::pipeline::lsq::{LoadStoreQueue, LsqEntry};
use crate::core::pipeline::rename::RenameTable;
use crate::core::pipeline::rob::{Rob, RobEntry};
use crate::isa::{Opcode, Program};
use crate::stats::SimStats;

/// Front-end latches and fetch control state.
#[derive(Debug, Default)]
pub struct Frontend {
    /// Fetch latch contents.
    pub fetch: Option<FetchEntry>,
    /// Decode latch contents.
    pub decode: Option<DecodeEntry>,
    /// Fetch held this cycle (any cause), for the trace.
    pub fetch_stalled: bool,
    /// Decode held on a structural hazard, for the trace and retry.
    pub decode_stalled: bool,
    /// A HALT has been decoded; fetch holds until commit or squash.
    pub halt_seen: bool,
    /// The single shadow fetch after HALT has happened.
    pub halt_shadow_done: bool,
    /// Remaining fetch-stall cycles after a redirect.
    pub branch_stall: u8,
    /// Fetch ran past the last instruction.
    pub end_of_code: bool,
}

impl Frontend {
    /// Creates an empty front end.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the fetch latch into the empty decode latch.
    pub fn advance(&mut self) {
        if self.halt_seen || self.decode.is_some() {
            return;
        }
        if let Some(f) = self.fetch.take() {
            self.decode = Some(DecodeEntry {
                pc: f.pc,
                inst: f.inst,
                dest_tag: None,
                src1: Operand::unused(),
                src2: Operand::unused(),
                store_src: Operand::unused(),
                renamed: false,
            });
        }
    }

    /// Decode/rename: resolves source operands and allocates the
    /// destination tag. On rename-pool exhaustion the stage stalls and the
    /// whole step retries next cycle.
    pub fn decode(
        &mut self,
        rename: &mut RenameTable,
        rob: &Rob,
        regs: &RegFile,
        flags: &mut Flags,
        stats: &mut SimStats,
    ) {
        let Some(entry) = self.decode.as_mut() else {
            return;
        };
        if entry.renamed {
            return;
        }
        let inst = entry.inst;

        // Source rename happens before the destination is mapped, so an
        // instruction reading its own destination sees the previous
        // producer.
        entry.src1 = if inst.kind.reads_rs1() {
            resolve_operand(inst.rs1, rename, rob, regs)
        } else {
            Operand::unused()
        };
        entry.src2 = if inst.kind.reads_rs2() {
            resolve_operand(inst.rs2, rename, rob, regs)
        } else {
            Operand::unused()
        };
        entry.store_src = if inst.kind.reads_store_data() {
            resolve_operand(inst.rd, rename, rob, regs)
        } else {
            Operand::unused()
        };

        if inst.kind.writes_rd() {
            match rename.allocate(inst.rd) {
                Some(tag) => entry.dest_tag = Some(tag),
                None => {
                    self.decode_stalled = true;
                    stats.stall_cycles += 1;
                    return;
                }
            }
        }

        if inst.kind == Opcode::Halt {
            flags.interrupt = true;
            self.halt_seen = true;
        }

        entry.renamed = true;
        self.decode_stalled = false;
    }

    /// Dispatch: allocates ROB/IQ/LSQ entries atomically. Nothing is
    /// inserted unless every required structure has room.
    pub fn dispatch(
        &mut self,
        rob: &mut Rob,
        iq: &mut IssueQueue,
        lsq: &mut LoadStoreQueue,
        stats: &mut SimStats,
    ) {
        let Some(entry) = self.decode else {
            return;
        };
        if !entry.renamed {
            return;
        }
        let inst = entry.inst;
        let kind = inst.kind;

        let needs_iq = kind.fu_class().is_some();
        let needs_lsq = kind.is_mem();
        if rob.is_full() || (needs_iq && iq.is_full()) || (needs_lsq && lsq.is_full()) {
            self.decode_stalled = true;
            stats.stall_cycles += 1;
            return;
        }

        let mut lsq_index = None;
        if needs_lsq {
            lsq_index = lsq.push(LsqEntry {
                inst,
                pc: entry.pc,
                dest_tag: entry.dest_tag,
                data: if kind.is_store() {
                    entry.store_src
                } else {
                    Operand::unused()
                },
                addr: None,
                age: 0,
                in_mem: false,
            });
        }

        if needs_iq {
            let _ = iq.insert(IqEntry {
                inst,
                pc: entry.pc,
                dest_tag: entry.dest_tag,
                src1: entry.src1,
                src2: entry.src2,
                store_src: entry.store_src,
                lsq_index,
                age: 0,
            });
        }

        let _ = rob.allocate(RobEntry {
            kind,
            pc: entry.pc,
            dest_arch: inst.rd,
            dest_tag: entry.dest_tag,
            value: 0,
            ready: matches!(kind, Opcode::Halt | Opcode::Nop),
            taken: false,
            valid: false,
        });

        self.decode = None;
        self.decode_stalled = false;
    }

    /// Fetch: copies the instruction at `pc` into the latch and advances.
    pub fn fetch(&mut self, pc: &mut u32, program: &Program) {
        self.fetch_stalled = false;

        if self.branch_stall > 0 {
            self.branch_stall -= 1;
            self.fetch_stalled = true;
            return;
        }

        if self.halt_seen {
            if !self.halt_shadow_done && self.fetch.is_none() {
                if let Some(inst) = program.fetch(*pc) {
                    self.fetch = Some(FetchEntry { pc: *pc, inst: *inst });
                }
                self.halt_shadow_done = true;
            }
            self.fetch_stalled = true;
            return;
        }

        if self.end_of_code {
            return;
        }

        if self.fetch.is_some() {
            // Decode has not consumed the latch; hold.
            self.fetch_stalled = true;
            return;
        }

        match program.fetch(*pc) {
            Some(inst) => {
                self.fetch = Some(FetchEntry { pc: *pc, inst: *inst });
                *pc += crate::common::constants::INSTRUCTION_BYTES;
            }
            None => self.end_of_code = true,
        }
    }

    /// Same-cycle squash after a taken branch at execute: both latches are
    /// discarded. Returns the dropped decode entry so the caller can free a
    /// tag it may have allocated.
    pub fn redirect(&mut self) -> Option<DecodeEntry> {
        self.fetch = None;
        self.halt_seen = false;
        self.halt_shadow_done = false;
        self.end_of_code = false;
        self.decode_stalled = false;
        self.decode.take()
    }

    /// Full squash at commit-time recovery.
    pub fn flush(&mut self) {
        let _ = self.redirect();
    }

    /// True when both latches are empty and fetch has reached end of code.
    pub fn drained(&self) -> bool {
        self.end_of_code && self.fetch.is_none() && self.decode.is_none()
    }
}

/// Resolves one architectural source register.
///
/// A live rename mapping wins; if its producer has already completed, the
/// value is bypassed from the reorder buffer (the broadcast for that tag has
/// already happened). Without a mapping the architectural register file
/// holds the value.
fn resolve_operand(arch: usize, rename: &RenameTable, rob: &Rob, regs: &RegFile) -> Operand {
    match rename.current(arch) {
        Some(tag) => match rob.ready_value(tag) {
            Some(value) => Operand {
                reg: arch,
                tag: Some(tag),
                value,
                ready: true,
            },
            None => Operand::pending(arch, tag),
        },
        None => Operand::ready(arch, regs.read(arch)),
    }
}
