//! Writeback broadcast.
//!
//! At the end of each cycle the exit stages of the functional units each
//! present one result. A broadcast updates every structure that may be
//! waiting on it: the reorder buffer (by program counter), the issue queue
//! and load/store queue (by destination tag), and the decode latch (so a
//! just-decoded instruction dispatches without an extra bubble).
//!
//! Ordering among the broadcasts of one cycle is irrelevant: each targets a
//! unique tag, since tags are single-assignment until retired.

use crate::core::pipeline::iq::IssueQueue;
use crate::core::pipeline::latches::DecodeEntry;
use crate::core::pipeline::lsq::LoadStoreQueue;
use crate::core::pipeline::rename::Tag;
use crate::core::pipeline::rob::Rob;

/// One result presented by a functional-unit exit stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Broadcast {
    /// A register-writing result (integer, multiply, or load data).
    Result {
        /// Program counter of the producing instruction.
        pc: u32,
        /// Destination tag being published.
        tag: Tag,
        /// The produced value.
        value: i32,
    },
    /// An effective address computed for a memory operation; carries the
    /// store data resolved at issue for store variants.
    MemAddr {
        /// Program counter of the memory instruction.
        pc: u32,
        /// Load/store queue slot to update.
        lsq_index: usize,
        /// The computed effective address.
        addr: i32,
        /// Store data, when the producing instruction is a store.
        store_data: Option<i32>,
    },
    /// A resolved control transfer.
    Branch {
        /// Program counter of the branch.
        pc: u32,
        /// Whether the branch was taken at execute.
        taken: bool,
        /// The resolved target address.
        target: u32,
    },
    /// A store that has completed its memory access.
    StoreDone {
        /// Program counter of the store.
        pc: u32,
    },
}

/// Applies one broadcast to every waiting structure.
pub fn apply(
    b: Broadcast,
    rob: &mut Rob,
    iq: &mut IssueQueue,
    lsq: &mut LoadStoreQueue,
    decode: Option<&mut DecodeEntry>,
) {
    match b {
        Broadcast::Result { pc, tag, value } => {
            rob.complete(pc, value);
            iq.wake(tag, value);
            lsq.wake(tag, value);
            if let Some(d) = decode {
                d.wake(tag, value);
            }
        }
        Broadcast::MemAddr {
            pc,
            lsq_index,
            addr,
            store_data,
        } => {
            lsq.set_address(lsq_index, pc, addr, store_data);
        }
        Broadcast::Branch { pc, taken, target } => {
            rob.resolve_branch(pc, taken, target);
        }
        Broadcast::StoreDone { pc } => {
            rob.complete(pc, 0);
        }
    }
}
