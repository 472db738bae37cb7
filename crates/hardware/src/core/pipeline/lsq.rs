//! Load/store queue: memory ordering in dispatch order.
//!
//! Six entries by default, a ring ordered by dispatch time. Memory
//! operations wait here for two separate conditions:
//! 1. **Address valid** — the integer pipeline has computed the effective
//!    address and injected it via writeback.
//! 2. **Data ready** — store variants only; the store-data register has been
//!    resolved or broadcast.
//!
//! Issue into the MEM unit is head-first: nothing behind the head is
//! considered, so accesses reach memory in program order.

use crate::core::pipeline::latches::Operand;
use crate::core::pipeline::rename::Tag;
use crate::isa::Instruction;

/// An occupied load/store queue slot.
#[derive(Debug, Clone, Copy)]
pub struct LsqEntry {
    /// The instruction.
    pub inst: Instruction,
    /// Program counter.
    pub pc: u32,
    /// Destination tag (load variants).
    pub dest_tag: Option<Tag>,
    /// Store-data operand (store variants; `ready` is the data-ready bit).
    pub data: Operand,
    /// Effective address once computed.
    pub addr: Option<i32>,
    /// Cycles spent waiting.
    pub age: u32,
    /// The entry has been handed to the MEM unit.
    pub in_mem: bool,
}

impl LsqEntry {
    /// The head-issue condition: address valid, and data ready for stores.
    pub fn runnable(&self) -> bool {
        self.addr.is_some() && (!self.inst.kind.is_store() || self.data.ready)
    }
}

/// The load/store queue.
#[derive(Debug)]
pub struct LoadStoreQueue {
    entries: Vec<Option<LsqEntry>>,
    head: usize,
    tail: usize,
    len: usize,
}

impl LoadStoreQueue {
    /// Creates a queue with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![None; capacity],
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Capacity of the queue.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when no slot is free.
    pub fn is_full(&self) -> bool {
        self.len == self.entries.len()
    }

    /// Appends an entry at the tail, returning its slot index for the issue
    /// queue back-pointer. Returns `None` when full.
    pub fn push(&mut self, entry: LsqEntry) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        let idx = self.tail;
        self.entries[idx] = Some(entry);
        self.tail = (self.tail + 1) % self.entries.len();
        self.len += 1;
        Some(idx)
    }

    /// Writeback injection from the integer pipeline: records the effective
    /// address (and store data carried with the address computation). The
    /// program counter must match the slot; pc is unique among in-flight
    /// instructions.
    pub fn set_address(&mut self, idx: usize, pc: u32, addr: i32, store_data: Option<i32>) {
        if let Some(Some(e)) = self.entries.get_mut(idx) {
            if e.pc != pc {
                return;
            }
            e.addr = Some(addr);
            if let Some(data) = store_data {
                e.data.value = data;
                e.data.ready = true;
            }
        }
    }

    /// Broadcast wakeup for store data still pending in the queue.
    pub fn wake(&mut self, tag: Tag, value: i32) {
        for e in self.entries.iter_mut().flatten() {
            if e.inst.kind.is_store() {
                let _ = e.data.wake(tag, value);
            }
        }
    }

    /// Hands the head to the MEM unit when it is runnable and not already
    /// in flight. The slot stays occupied until [`Self::complete_head`].
    pub fn issue_head(&mut self) -> Option<LsqEntry> {
        let head = self.entries[self.head].as_mut()?;
        if head.in_mem || !head.runnable() {
            return None;
        }
        head.in_mem = true;
        Some(*head)
    }

    /// Frees the head slot once the MEM unit finishes its access.
    pub fn complete_head(&mut self) {
        if self.len == 0 {
            return;
        }
        self.entries[self.head] = None;
        self.head = (self.head + 1) % self.entries.len();
        self.len -= 1;
    }

    /// Advances every occupied slot's residency counter.
    pub fn tick_ages(&mut self) {
        for e in self.entries.iter_mut().flatten() {
            e.age += 1;
        }
    }

    /// Discards every entry. Used by squash.
    pub fn flush(&mut self) {
        self.entries.fill(None);
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }

    /// Raw slot view for state dumps.
    pub fn slot(&self, idx: usize) -> Option<&LsqEntry> {
        self.entries.get(idx).and_then(Option::as_ref)
    }
}
