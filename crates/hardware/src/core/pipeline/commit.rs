//! Commit: retire the reorder buffer head in program order.
//!
//! At most one instruction retires per cycle. Retiring a register writer
//! applies the value to the architectural file, decrements its in-flight
//! writer count, and releases its rename slot. A store changed memory when
//! its access completed, so commit changes nothing. A control transfer
//! recorded taken triggers a full squash: the caller discards all in-flight
//! state and resumes at the address this stage returns.

use crate::core::arch::RegFile;
use crate::core::pipeline::rename::RenameTable;
use crate::core::pipeline::rob::Rob;
use crate::isa::Opcode;
use crate::stats::SimStats;

/// Result of one commit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing retired (empty ROB or head not ready).
    Idle,
    /// One instruction retired normally.
    Retired,
    /// A HALT retired; the run is over.
    Halted,
    /// A taken control transfer retired; squash everything and resume at
    /// the given address.
    Squash {
        /// Address to restart fetch from.
        target: u32,
    },
}

/// Attempts to retire the ROB head.
///
/// A control transfer recorded taken resumes at the target resolved at
/// execute. The condition was evaluated after every older flag producer had
/// executed, so it is not re-checked here; the squash exists to discard
/// younger instructions that dispatched down the fall-through path before
/// the branch resolved.
pub fn commit_stage(
    rob: &mut Rob,
    rename: &mut RenameTable,
    regs: &mut RegFile,
    stats: &mut SimStats,
) -> CommitOutcome {
    match rob.peek_head() {
        Some(head) if head.ready => {}
        _ => return CommitOutcome::Idle,
    }
    let Some(entry) = rob.commit_head() else {
        return CommitOutcome::Idle;
    };
    stats.retired += 1;

    let kind = entry.kind;
    if kind.writes_rd() {
        regs.write(entry.dest_arch, entry.value);
        regs.clear_pending(entry.dest_arch);
        if let Some(tag) = entry.dest_tag {
            rename.release(tag, entry.dest_arch);
        }
        if kind.is_mem() {
            stats.loads += 1;
        }
        return CommitOutcome::Retired;
    }

    match kind {
        Opcode::Store | Opcode::Str => {
            stats.stores += 1;
            CommitOutcome::Retired
        }
        Opcode::Bz | Opcode::Bnz | Opcode::Jump => {
            stats.branches += 1;
            if entry.taken {
                stats.squashes += 1;
                CommitOutcome::Squash {
                    target: entry.value as u32,
                }
            } else {
                CommitOutcome::Retired
            }
        }
        Opcode::Halt => CommitOutcome::Halted,
        _ => CommitOutcome::Retired,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::rob::RobEntry;

    fn setup() -> (Rob, RenameTable, RegFile, SimStats) {
        (
            Rob::new(12),
            RenameTable::new(24),
            RegFile::new(),
            SimStats::default(),
        )
    }

    #[test]
    fn retiring_writer_updates_architectural_state() {
        let (mut rob, mut rename, mut regs, mut stats) = setup();
        let tag = rename.allocate(3).unwrap();
        regs.mark_pending(3);

        rob.allocate(RobEntry {
            kind: Opcode::Add,
            pc: 4000,
            dest_arch: 3,
            dest_tag: Some(tag),
            ..RobEntry::default()
        });
        rob.complete(4000, 12);

        let outcome = commit_stage(&mut rob, &mut rename, &mut regs, &mut stats);
        assert_eq!(outcome, CommitOutcome::Retired);
        assert_eq!(regs.read(3), 12);
        assert_eq!(regs.pending_writers(3), 0);
        assert_eq!(rename.current(3), None);
        assert_eq!(stats.retired, 1);
    }

    #[test]
    fn head_not_ready_blocks() {
        let (mut rob, mut rename, mut regs, mut stats) = setup();
        rob.allocate(RobEntry {
            kind: Opcode::Add,
            pc: 4000,
            ..RobEntry::default()
        });

        let outcome = commit_stage(&mut rob, &mut rename, &mut regs, &mut stats);
        assert_eq!(outcome, CommitOutcome::Idle);
        assert_eq!(rob.len(), 1);
    }

    #[test]
    fn waw_release_keeps_newer_mapping() {
        let (mut rob, mut rename, mut regs, mut stats) = setup();
        let old = rename.allocate(1).unwrap();
        let new = rename.allocate(1).unwrap();

        rob.allocate(RobEntry {
            kind: Opcode::Movc,
            pc: 4000,
            dest_arch: 1,
            dest_tag: Some(old),
            ..RobEntry::default()
        });
        rob.complete(4000, 5);

        commit_stage(&mut rob, &mut rename, &mut regs, &mut stats);
        assert_eq!(rename.current(1), Some(new));
        assert_eq!(rename.slot(old.0), None);
    }

    #[test]
    fn taken_branch_squashes_to_target() {
        let (mut rob, mut rename, mut regs, mut stats) = setup();
        rob.allocate(RobEntry {
            kind: Opcode::Bz,
            pc: 4008,
            ..RobEntry::default()
        });
        rob.resolve_branch(4008, true, 4016);

        let outcome = commit_stage(&mut rob, &mut rename, &mut regs, &mut stats);
        assert_eq!(outcome, CommitOutcome::Squash { target: 4016 });
        assert_eq!(stats.squashes, 1);
    }

    #[test]
    fn taken_jump_squashes_like_a_branch() {
        let (mut rob, mut rename, mut regs, mut stats) = setup();
        rob.allocate(RobEntry {
            kind: Opcode::Jump,
            pc: 4004,
            ..RobEntry::default()
        });
        rob.resolve_branch(4004, true, 4020);

        let outcome = commit_stage(&mut rob, &mut rename, &mut regs, &mut stats);
        assert_eq!(outcome, CommitOutcome::Squash { target: 4020 });
    }

    #[test]
    fn not_taken_branch_retires_quietly() {
        let (mut rob, mut rename, mut regs, mut stats) = setup();
        rob.allocate(RobEntry {
            kind: Opcode::Bnz,
            pc: 4008,
            ..RobEntry::default()
        });
        rob.resolve_branch(4008, false, 4020);

        let outcome = commit_stage(&mut rob, &mut rename, &mut regs, &mut stats);
        assert_eq!(outcome, CommitOutcome::Retired);
        assert_eq!(stats.squashes, 0);
    }

    #[test]
    fn halt_ends_the_run() {
        let (mut rob, mut rename, mut regs, mut stats) = setup();
        rob.allocate(RobEntry {
            kind: Opcode::Halt,
            pc: 4004,
            ready: true,
            ..RobEntry::default()
        });

        let outcome = commit_stage(&mut rob, &mut rename, &mut regs, &mut stats);
        assert_eq!(outcome, CommitOutcome::Halted);
    }

    #[test]
    fn store_commit_changes_no_register() {
        let (mut rob, mut rename, mut regs, mut stats) = setup();
        rob.allocate(RobEntry {
            kind: Opcode::Store,
            pc: 4000,
            dest_arch: 1,
            ..RobEntry::default()
        });
        rob.complete(4000, 0);
        regs.write(1, 42);

        let outcome = commit_stage(&mut rob, &mut rename, &mut regs, &mut stats);
        assert_eq!(outcome, CommitOutcome::Retired);
        assert_eq!(regs.read(1), 42);
        assert_eq!(stats.stores, 1);
    }
}
