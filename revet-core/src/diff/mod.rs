//! Diff collection for revet
//!
//! This module provides git repository detection, baseline resolution,
//! and changeset collection. It is the only part of the pipeline that
//! touches version-control state.

mod changeset;
mod repo;

pub use changeset::{
    Baseline, ChangeKind, ChangeSet, DiffCollector, FileChange, Hunk, HunkLine, LineOrigin,
};
pub use repo::GitRepo;
