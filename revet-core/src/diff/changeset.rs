//! ChangeSet collection from git diffs
//!
//! The collector turns a baseline comparison into an ordered, in-memory
//! ChangeSet. All version-control I/O happens here, before evaluation
//! begins; the rest of the pipeline only sees plain data.

use std::path::PathBuf;

use git2::{Delta, DiffOptions, Patch};
use serde::Serialize;
use tracing::debug;

use crate::{Error, Result};

use super::repo::GitRepo;

/// What to compare the working tree (or a second revision) against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Baseline {
    /// Compare HEAD to the working tree (uncommitted changes)
    WorkingTree,
    /// Compare a branch, tag, or revision to the working tree
    Reference(String),
    /// Compare two revisions, `from..to`
    Range {
        /// The older side of the comparison
        from: String,
        /// The newer side of the comparison
        to: String,
    },
}

impl Baseline {
    /// Parse a baseline identifier as given on the command line.
    ///
    /// `working-tree` (or `worktree`) compares HEAD to the working
    /// tree; `A..B` compares two revisions; anything else is treated as
    /// a reference compared to the working tree.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();

        if input.is_empty()
            || input.eq_ignore_ascii_case("working-tree")
            || input.eq_ignore_ascii_case("worktree")
        {
            return Baseline::WorkingTree;
        }

        if let Some((from, to)) = input.split_once("..") {
            let from = from.trim();
            // Tolerate the three-dot form
            let to = to.trim().trim_start_matches('.');
            if !from.is_empty() && !to.is_empty() {
                return Baseline::Range {
                    from: from.to_string(),
                    to: to.to_string(),
                };
            }
        }

        Baseline::Reference(input.to_string())
    }
}

impl std::fmt::Display for Baseline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Baseline::WorkingTree => write!(f, "working-tree"),
            Baseline::Reference(r) => write!(f, "{}", r),
            Baseline::Range { from, to } => write!(f, "{}..{}", from, to),
        }
    }
}

/// How a file changed relative to the baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// File does not exist in the baseline
    Added,
    /// File exists on both sides with different content
    Modified,
    /// File exists only in the baseline
    Deleted,
}

/// Origin of a single hunk line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOrigin {
    /// Line added on the new side
    Added,
    /// Line removed from the old side
    Removed,
    /// Unchanged context line
    Context,
}

/// One line inside a hunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HunkLine {
    /// Whether the line was added, removed, or is context
    pub origin: LineOrigin,
    /// Line number in the new file; `None` for removed lines
    pub number: Option<u32>,
    /// Line content without the trailing newline
    pub content: String,
}

/// A contiguous run of changed lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// First line of the hunk in the old file
    pub old_start: u32,
    /// Number of old-file lines the hunk spans
    pub old_lines: u32,
    /// First line of the hunk in the new file
    pub new_start: u32,
    /// Number of new-file lines the hunk spans
    pub new_lines: u32,
    /// The hunk's lines in file order
    pub lines: Vec<HunkLine>,
}

impl Hunk {
    /// Added lines with their new-file line numbers
    pub fn added_lines(&self) -> impl Iterator<Item = (u32, &str)> {
        self.lines.iter().filter_map(|l| match l.origin {
            LineOrigin::Added => l.number.map(|n| (n, l.content.as_str())),
            _ => None,
        })
    }
}

/// All hunks for one changed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Path relative to the repository root
    pub path: PathBuf,
    /// How the file changed
    pub kind: ChangeKind,
    /// Hunks in file order
    pub hunks: Vec<Hunk>,
}

/// The ordered collection of file changes under review
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// File changes, ordered by path
    pub files: Vec<FileChange>,
}

impl ChangeSet {
    /// Build a changeset from file changes, normalizing the order
    pub fn new(mut files: Vec<FileChange>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self { files }
    }

    /// Whether the changeset contains no file changes
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of changed files
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Total number of hunks across all files
    pub fn hunk_count(&self) -> usize {
        self.files.iter().map(|f| f.hunks.len()).sum()
    }
}

/// Collects a [`ChangeSet`] from a repository for a given baseline
#[derive(Debug)]
pub struct DiffCollector<'r> {
    repo: &'r GitRepo,
}

impl<'r> DiffCollector<'r> {
    /// Create a collector for the given repository
    pub fn new(repo: &'r GitRepo) -> Self {
        Self { repo }
    }

    /// Produce the changeset for a baseline.
    ///
    /// Fails with [`Error::BaselineNotFound`] when the baseline does
    /// not resolve and [`Error::EmptyChangeSet`] when the comparison
    /// yields no changes. Read-only: the repository is never modified.
    pub fn collect(&self, baseline: &Baseline) -> Result<ChangeSet> {
        let repo = self.repo.inner();

        let mut opts = DiffOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .show_untracked_content(true)
            .context_lines(3);

        let diff = match baseline {
            Baseline::WorkingTree => {
                let tree = self.repo.head_tree()?;
                repo.diff_tree_to_workdir_with_index(tree.as_ref(), Some(&mut opts))
            }
            Baseline::Reference(reference) => {
                let tree = self.repo.resolve_tree(reference)?;
                repo.diff_tree_to_workdir_with_index(Some(&tree), Some(&mut opts))
            }
            Baseline::Range { from, to } => {
                let old = self.repo.resolve_tree(from)?;
                let new = self.repo.resolve_tree(to)?;
                repo.diff_tree_to_tree(Some(&old), Some(&new), Some(&mut opts))
            }
        }
        .map_err(|e| Error::Git(format!("Failed to compute diff for {}: {}", baseline, e)))?;

        let changeset = changeset_from_diff(&diff)?;

        debug!(
            baseline = %baseline,
            files = changeset.file_count(),
            hunks = changeset.hunk_count(),
            "Collected changeset"
        );

        if changeset.is_empty() {
            return Err(Error::EmptyChangeSet);
        }

        Ok(changeset)
    }
}

fn changeset_from_diff(diff: &git2::Diff<'_>) -> Result<ChangeSet> {
    let mut files = Vec::new();

    for (idx, delta) in diff.deltas().enumerate() {
        let kind = match delta.status() {
            Delta::Added | Delta::Untracked | Delta::Copied => ChangeKind::Added,
            Delta::Deleted => ChangeKind::Deleted,
            _ => ChangeKind::Modified,
        };

        let path = delta
            .new_file()
            .path()
            .or_else(|| delta.old_file().path())
            .ok_or_else(|| Error::Git("Diff delta has no path".to_string()))?
            .to_path_buf();

        let mut hunks = Vec::new();
        let patch = Patch::from_diff(diff, idx)
            .map_err(|e| Error::Git(format!("Failed to read patch for {}: {}", path.display(), e)))?;

        // Binary files produce no patch; they are recorded with no hunks.
        if let Some(patch) = patch {
            for h in 0..patch.num_hunks() {
                let (hunk, line_count) = patch
                    .hunk(h)
                    .map_err(|e| Error::Git(format!("Failed to read hunk: {}", e)))?;

                let mut lines = Vec::with_capacity(line_count);
                for l in 0..line_count {
                    let line = patch
                        .line_in_hunk(h, l)
                        .map_err(|e| Error::Git(format!("Failed to read hunk line: {}", e)))?;

                    let origin = match line.origin() {
                        '+' => LineOrigin::Added,
                        '-' => LineOrigin::Removed,
                        ' ' => LineOrigin::Context,
                        // End-of-file markers and similar bookkeeping lines
                        _ => continue,
                    };
                    let number = match origin {
                        LineOrigin::Removed => None,
                        _ => line.new_lineno(),
                    };
                    let content = String::from_utf8_lossy(line.content())
                        .trim_end_matches(['\n', '\r'])
                        .to_string();

                    lines.push(HunkLine {
                        origin,
                        number,
                        content,
                    });
                }

                hunks.push(Hunk {
                    old_start: hunk.old_start(),
                    old_lines: hunk.old_lines(),
                    new_start: hunk.new_start(),
                    new_lines: hunk.new_lines(),
                    lines,
                });
            }
        }

        files.push(FileChange { path, kind, hunks });
    }

    Ok(ChangeSet::new(files))
}
