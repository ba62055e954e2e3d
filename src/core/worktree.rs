#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::git::Git;

/// Directory under the repository root that holds managed worktrees.
pub const WORKTREES_DIR: &str = ".worktrees";

/// A git worktree located under `<repo>/.worktrees/`.
///
/// `name` and `leaf` are derived from `path` on every call and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeRecord {
    pub path: PathBuf,
    pub branch: String,
    pub commit: String,
}

impl WorktreeRecord {
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        branch: impl Into<String>,
        commit: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            branch: branch.into(),
            commit: commit.into(),
        }
    }

    /// Path segments after the `.worktrees` marker joined with `/`
    /// (`feature/auth`). Falls back to the leaf when the marker is absent.
    #[must_use]
    pub fn name(&self) -> String {
        let parts: Vec<String> = self
            .path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        match parts.iter().position(|p| p == WORKTREES_DIR) {
            Some(idx) if idx + 1 < parts.len() => parts[idx + 1..].join("/"),
            _ => self.leaf(),
        }
    }

    /// Final path segment. Used as the tmux window name.
    #[must_use]
    pub fn leaf(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// True when `dir` is this worktree's path or lies below it.
    #[must_use]
    pub fn contains(&self, dir: &Path) -> bool {
        dir.starts_with(&self.path)
    }
}

impl Serialize for WorktreeRecord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct as _;
        let mut s = serializer.serialize_struct("WorktreeRecord", 5)?;
        s.serialize_field("name", &self.name())?;
        s.serialize_field("leaf", &self.leaf())?;
        s.serialize_field("path", &self.path.to_string_lossy())?;
        s.serialize_field("branch", &self.branch)?;
        s.serialize_field("commit", &self.commit)?;
        s.end()
    }
}

/// Lists worktrees under `<repo_root>/.worktrees/` in git's own order.
///
/// Any failure of the underlying query yields an empty list.
#[must_use]
pub fn list_worktrees(git: &Git) -> Vec<WorktreeRecord> {
    match git.list_worktrees_porcelain() {
        Ok(out) => worktrees_from_porcelain(&out, git.repo_root()),
        Err(e) => {
            tracing::warn!("git worktree list failed: {e}");
            Vec::new()
        }
    }
}

/// Filters raw porcelain entries down to worktrees under `.worktrees/`,
/// skipping the main worktree.
#[must_use]
pub fn worktrees_from_porcelain(out: &str, repo_root: &Path) -> Vec<WorktreeRecord> {
    let worktrees_dir = repo_root.join(WORKTREES_DIR);
    parse_worktree_porcelain(out)
        .into_iter()
        .filter_map(|entry| {
            let path = PathBuf::from(&entry.path);
            if path == repo_root {
                return None;
            }
            match path.strip_prefix(&worktrees_dir) {
                Ok(rel) if !rel.as_os_str().is_empty() => {}
                _ => return None,
            }
            Some(WorktreeRecord {
                path,
                branch: entry.branch,
                commit: entry.head,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PorcelainEntry {
    path: String,
    branch: String,
    head: String,
}

/// Parses `git worktree list --porcelain`: blank-line separated records of
/// `key value` lines. Records without a `worktree` line are dropped and
/// unknown keys are ignored.
fn parse_worktree_porcelain(out: &str) -> Vec<PorcelainEntry> {
    let mut entries = Vec::new();

    let mut cur_path: Option<String> = None;
    let mut cur_branch = String::new();
    let mut cur_head = String::new();

    let mut flush = |path: &mut Option<String>, branch: &mut String, head: &mut String| {
        if let Some(p) = path.take() {
            entries.push(PorcelainEntry {
                path: p,
                branch: std::mem::take(branch),
                head: std::mem::take(head),
            });
        }
        branch.clear();
        head.clear();
    };

    for line in out.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            flush(&mut cur_path, &mut cur_branch, &mut cur_head);
        } else if let Some(path) = line.strip_prefix("worktree ") {
            flush(&mut cur_path, &mut cur_branch, &mut cur_head);
            cur_path = Some(path.to_owned());
        } else if let Some(branch) = line.strip_prefix("branch ") {
            branch
                .trim()
                .trim_start_matches("refs/heads/")
                .clone_into(&mut cur_branch);
        } else if let Some(head) = line.strip_prefix("HEAD ") {
            head.trim().clone_into(&mut cur_head);
        }
    }
    flush(&mut cur_path, &mut cur_branch, &mut cur_head);

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    const PORCELAIN: &str = r#"worktree /repo
HEAD 1111111111111111111111111111111111111111
branch refs/heads/main

worktree /repo/.worktrees/feature/auth
HEAD 2222222222222222222222222222222222222222
branch refs/heads/feature/auth

worktree /repo/.worktrees/detached
HEAD 3333333333333333333333333333333333333333
detached

worktree /elsewhere/checkout
HEAD 4444444444444444444444444444444444444444
branch refs/heads/elsewhere

worktree /repo/.worktrees-old/stale
HEAD 5555555555555555555555555555555555555555
branch refs/heads/stale
"#;

    #[test]
    fn parses_worktree_list_porcelain() {
        let entries = parse_worktree_porcelain(PORCELAIN);
        assert_eq!(entries.len(), 5);
        assert_eq!(
            entries[0],
            PorcelainEntry {
                path: "/repo".to_owned(),
                branch: "main".to_owned(),
                head: "1111111111111111111111111111111111111111".to_owned(),
            }
        );
        assert_eq!(entries[1].branch, "feature/auth");
        assert_eq!(entries[2].branch, "");
    }

    #[test]
    fn drops_records_without_a_path_and_ignores_unknown_keys() {
        let out = "HEAD abc\nbranch refs/heads/orphan\n\nworktree /repo/.worktrees/x\nlocked\nprunable gitdir file points to non-existent location\nbranch refs/heads/x\n";
        let entries = parse_worktree_porcelain(out);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "/repo/.worktrees/x");
        assert_eq!(entries[0].branch, "x");
        assert_eq!(entries[0].head, "");
    }

    #[test]
    fn keeps_only_worktrees_under_the_worktrees_dir() {
        let records = worktrees_from_porcelain(PORCELAIN, Path::new("/repo"));
        let names: Vec<String> = records.iter().map(WorktreeRecord::name).collect();
        assert_eq!(names, vec!["feature/auth", "detached"]);
        assert_eq!(records[0].branch, "feature/auth");
        assert_eq!(records[0].commit, "2222222222222222222222222222222222222222");
    }

    #[test]
    fn derives_name_and_leaf_from_path() {
        let wt = WorktreeRecord::new("/repo/.worktrees/feature/auth", "b", "c");
        assert_eq!(wt.name(), "feature/auth");
        assert_eq!(wt.leaf(), "auth");

        let wt = WorktreeRecord::new("/repo/.worktrees/refactor-models", "b", "c");
        assert_eq!(wt.name(), "refactor-models");
        assert_eq!(wt.leaf(), "refactor-models");

        let wt = WorktreeRecord::new("/repo/some-other-path", "b", "c");
        assert_eq!(wt.name(), "some-other-path");
        assert_eq!(wt.leaf(), "some-other-path");
    }

    #[test]
    fn containment_is_by_path_component() {
        let wt = WorktreeRecord::new("/repo/.worktrees/auth", "b", "c");
        assert!(wt.contains(Path::new("/repo/.worktrees/auth")));
        assert!(wt.contains(Path::new("/repo/.worktrees/auth/src/lib")));
        assert!(!wt.contains(Path::new("/repo/.worktrees/auth-v2")));
    }
}
