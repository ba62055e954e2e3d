#![forbid(unsafe_code)]

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;

use crate::core::divergence::Divergence;
use crate::core::worktree::WorktreeRecord;

/// Per-worktree git queries the status table needs. Every method degrades to
/// a default value instead of failing.
pub trait WorktreeProbe {
    fn divergence(&self, branch: &str, default_branch: &str) -> Divergence;
    fn modified_count(&self, worktree: &Path) -> usize;
    fn last_commit(&self, worktree: &Path) -> LastCommit;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastCommit {
    pub relative: String,
    pub timestamp: i64,
}

impl Default for LastCommit {
    fn default() -> Self {
        Self {
            relative: "unknown".to_owned(),
            timestamp: 0,
        }
    }
}

/// One rendered line of the status table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowData {
    pub worktree: WorktreeRecord,
    pub window_open: bool,
    pub modified: usize,
    pub divergence: Divergence,
    pub last_commit: LastCommit,
    pub is_current: bool,
}

impl RowData {
    #[must_use]
    pub fn modified_label(&self) -> String {
        match self.modified {
            0 => "clean".to_owned(),
            1 => "1 file".to_owned(),
            n => format!("{n} files"),
        }
    }
}

/// Builds status rows, most recently committed worktree first.
///
/// `current` is the worktree containing the caller's working directory, if
/// any. Rows whose last-commit query failed carry timestamp 0 and sort last.
#[must_use]
pub fn build_rows(
    probe: &impl WorktreeProbe,
    worktrees: &[WorktreeRecord],
    open_windows: &[String],
    default_branch: &str,
    current: Option<&WorktreeRecord>,
) -> Vec<RowData> {
    let open: HashSet<&str> = open_windows.iter().map(String::as_str).collect();

    let mut rows: Vec<RowData> = worktrees
        .iter()
        .map(|wt| RowData {
            window_open: open.contains(wt.leaf().as_str()),
            modified: probe.modified_count(&wt.path),
            divergence: probe.divergence(&wt.branch, default_branch),
            last_commit: probe.last_commit(&wt.path),
            is_current: current.is_some_and(|c| c.path == wt.path),
            worktree: wt.clone(),
        })
        .collect();

    rows.sort_by(|a, b| b.last_commit.timestamp.cmp(&a.last_commit.timestamp));
    rows
}

/// The worktree whose directory contains `cwd`. When worktrees nest, the
/// deepest one wins.
#[must_use]
pub fn current_worktree<'a>(
    worktrees: &'a [WorktreeRecord],
    cwd: &Path,
) -> Option<&'a WorktreeRecord> {
    worktrees
        .iter()
        .filter(|wt| wt.contains(cwd))
        .max_by_key(|wt| wt.path.components().count())
}
