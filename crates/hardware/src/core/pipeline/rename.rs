//! Register rename table.
//!
//! A fixed pool of physical tag slots plus a per-register map of the newest
//! live mapping. It provides:
//! 1. **Allocation:** A destination write takes a free slot at dispatch.
//! 2. **Lookup:** A source read resolves to the newest live tag for its
//!    architectural register, or to the register file when none exists.
//! 3. **Release:** Commit frees the owning slot; the newest-mapping map is
//!    only cleared when it still points at the released tag (WAW handling).

use crate::common::constants::REGISTER_COUNT;

/// A physical tag: an index into the rename pool naming one in-flight
/// definition of a destination register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tag(pub usize);

/// The rename table.
#[derive(Debug, Clone)]
pub struct RenameTable {
    /// Slot -> architectural register it names; `None` = free.
    slots: Vec<Option<usize>>,
    /// Architectural register -> newest live tag.
    newest: [Option<Tag>; REGISTER_COUNT],
}

impl RenameTable {
    /// Creates a rename table with `slots` free tag slots.
    pub fn new(slots: usize) -> Self {
        Self {
            slots: vec![None; slots],
            newest: [None; REGISTER_COUNT],
        }
    }

    /// Number of tag slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live mappings.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// True when no mapping is live.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// True when no slot is free.
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Allocates a slot for a new definition of `arch`. Returns `None` when
    /// the pool is exhausted (the front end must stall).
    pub fn allocate(&mut self, arch: usize) -> Option<Tag> {
        let free = self.slots.iter().position(Option::is_none)?;
        self.slots[free] = Some(arch);
        let tag = Tag(free);
        if arch < REGISTER_COUNT {
            self.newest[arch] = Some(tag);
        }
        Some(tag)
    }

    /// The newest live tag naming `arch`, or `None` when the value is in the
    /// architectural register file.
    pub fn current(&self, arch: usize) -> Option<Tag> {
        if arch < REGISTER_COUNT {
            self.newest[arch]
        } else {
            None
        }
    }

    /// Releases `tag` at commit. The newest-mapping entry for `arch` is
    /// cleared only if it still points at `tag`; a newer rename of the same
    /// register must keep its mapping.
    pub fn release(&mut self, tag: Tag, arch: usize) {
        if let Some(slot) = self.slots.get_mut(tag.0) {
            *slot = None;
        }
        if arch < REGISTER_COUNT && self.newest[arch] == Some(tag) {
            self.newest[arch] = None;
        }
    }

    /// The architectural register a slot currently names, for state dumps.
    pub fn slot(&self, idx: usize) -> Option<usize> {
        self.slots.get(idx).copied().flatten()
    }

    /// Clears every mapping. Used by squash.
    pub fn flush(&mut self) {
        self.slots.fill(None);
        self.newest = [None; REGISTER_COUNT];
    }
}
