#![forbid(unsafe_code)]

use std::collections::HashSet;

use crate::core::worktree::WorktreeRecord;

/// Open windows that no longer point at a worktree.
///
/// A window is orphaned when its name is neither reserved nor the leaf of a
/// current worktree. Order follows `open_windows`.
#[must_use]
pub fn orphans(
    open_windows: &[String],
    worktrees: &[WorktreeRecord],
    reserved: &[String],
) -> Vec<String> {
    let leaves: HashSet<String> = worktrees.iter().map(WorktreeRecord::leaf).collect();
    open_windows
        .iter()
        .filter(|w| !reserved.contains(w) && !leaves.contains(w.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn finds_windows_without_worktrees() {
        let open = strings(&["auth", "dash", "stale"]);
        let worktrees = vec![WorktreeRecord::new("/repo/.worktrees/feature/auth", "b", "c")];
        let reserved = strings(&["dash"]);
        assert_eq!(orphans(&open, &worktrees, &reserved), strings(&["stale"]));
    }

    #[test]
    fn no_worktrees_orphans_everything_but_reserved() {
        let open = strings(&["a", "dash", "b"]);
        assert_eq!(orphans(&open, &[], &strings(&["dash"])), strings(&["a", "b"]));
        assert!(orphans(&[], &[], &[]).is_empty());
    }

    #[test]
    fn matches_leaf_not_full_name() {
        let open = strings(&["feature/auth"]);
        let worktrees = vec![WorktreeRecord::new("/repo/.worktrees/feature/auth", "b", "c")];
        assert_eq!(orphans(&open, &worktrees, &[]), strings(&["feature/auth"]));
    }
}
