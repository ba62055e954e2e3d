#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::core::divergence::Divergence;
use crate::core::status::{LastCommit, WorktreeProbe};
use crate::error::WtmuxError;

#[derive(Debug, Clone)]
pub struct Git {
    repo_root: PathBuf,
}

impl Git {
    /// Resolves the main repository root from the current directory, even
    /// when invoked from inside a linked worktree.
    pub fn discover() -> Result<Self, WtmuxError> {
        let cwd = std::env::current_dir()
            .map_err(|e| WtmuxError::Other(format!("failed to get cwd: {e}")))?;
        Self::discover_from(&cwd)
    }

    pub fn discover_from(dir: &Path) -> Result<Self, WtmuxError> {
        let out = git_command(dir, &["rev-parse", "--git-common-dir"])?;
        if !out.status.success() {
            return Err(WtmuxError::NotInGitRepo);
        }
        let common = PathBuf::from(String::from_utf8_lossy(&out.stdout).trim());
        let common = if common.is_absolute() {
            common
        } else {
            dir.join(common)
        };
        let common = common.canonicalize().map_err(|e| WtmuxError::IoPath {
            path: common.clone(),
            source: e,
        })?;
        let repo_root = common
            .parent()
            .ok_or(WtmuxError::NotInGitRepo)?
            .to_path_buf();
        Ok(Self { repo_root })
    }

    #[must_use]
    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// Directory name of the repository root, used as the default tmux
    /// session name.
    #[must_use]
    pub fn repo_name(&self) -> String {
        self.repo_root
            .file_name()
            .map_or_else(|| "repo".to_owned(), |s| s.to_string_lossy().into_owned())
    }

    pub fn list_worktrees_porcelain(&self) -> Result<String, WtmuxError> {
        self.run(&["worktree", "list", "--porcelain"])
    }

    /// First candidate with a local branch ref, or the first candidate when
    /// none resolve.
    #[must_use]
    pub fn default_branch(&self, candidates: &[String]) -> String {
        for branch in candidates {
            let refname = format!("refs/heads/{branch}");
            if let Ok(out) = self.run_raw(&["rev-parse", "--verify", "--quiet", &refname])
                && out.status.success()
            {
                return branch.clone();
            }
        }
        candidates
            .first()
            .cloned()
            .unwrap_or_else(|| "main".to_owned())
    }

    /// Ahead/behind counts of `branch` relative to `default_branch`, using the
    /// three-dot range so diverged histories are measured from the merge base.
    #[must_use]
    pub fn divergence(&self, branch: &str, default_branch: &str) -> Divergence {
        if branch.is_empty() {
            return Divergence::default();
        }
        let range = format!("{default_branch}...{branch}");
        match self.run(&["rev-list", "--left-right", "--count", &range]) {
            Ok(out) => Divergence::from_left_right(&out).unwrap_or_default(),
            Err(e) => {
                tracing::debug!("divergence unavailable for {branch}: {e}");
                Divergence::default()
            }
        }
    }

    /// Number of modified, staged or untracked entries in a worktree.
    #[must_use]
    pub fn modified_count(&self, worktree: &Path) -> usize {
        match self.run_in_dir(worktree, &["status", "--porcelain"]) {
            Ok(out) => out.lines().filter(|l| !l.trim().is_empty()).count(),
            Err(e) => {
                tracing::debug!("status unavailable for {}: {e}", worktree.display());
                0
            }
        }
    }

    #[must_use]
    pub fn last_commit(&self, worktree: &Path) -> LastCommit {
        match self.run_in_dir(worktree, &["log", "-1", "--format=%cr%x00%ct"]) {
            Ok(out) => parse_last_commit(&out),
            Err(e) => {
                tracing::debug!("last commit unavailable for {}: {e}", worktree.display());
                LastCommit::default()
            }
        }
    }

    pub fn run(&self, args: &[&str]) -> Result<String, WtmuxError> {
        self.run_in_dir(&self.repo_root, args)
    }

    pub fn run_raw(&self, args: &[&str]) -> Result<Output, WtmuxError> {
        git_command(&self.repo_root, args)
    }

    pub fn run_in_dir(&self, dir: &Path, args: &[&str]) -> Result<String, WtmuxError> {
        let out = git_command(dir, args)?;
        if out.status.success() {
            Ok(String::from_utf8_lossy(&out.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&out.stderr);
            Err(WtmuxError::Other(format!(
                "git {}: {}",
                args.join(" "),
                stderr.trim()
            )))
        }
    }
}

impl WorktreeProbe for Git {
    fn divergence(&self, branch: &str, default_branch: &str) -> Divergence {
        Git::divergence(self, branch, default_branch)
    }

    fn modified_count(&self, worktree: &Path) -> usize {
        Git::modified_count(self, worktree)
    }

    fn last_commit(&self, worktree: &Path) -> LastCommit {
        Git::last_commit(self, worktree)
    }
}

fn git_command(dir: &Path, args: &[&str]) -> Result<Output, WtmuxError> {
    tracing::debug!("git {} (in {})", args.join(" "), dir.display());
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => WtmuxError::GitNotFound,
            _ => WtmuxError::Other(format!("failed to run git: {e}")),
        })
}

/// Parses `<relative>\0<unix-seconds>`. An empty log (no commits yet) or a
/// malformed timestamp falls back to the defaults.
fn parse_last_commit(out: &str) -> LastCommit {
    let out = out.trim_end_matches(['\n', '\r']);
    let Some((relative, ts)) = out.split_once('\0') else {
        return LastCommit::default();
    };
    let relative = relative.trim();
    LastCommit {
        relative: if relative.is_empty() {
            LastCommit::default().relative
        } else {
            relative.to_owned()
        },
        timestamp: ts.trim().parse().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_last_commit_output() {
        let lc = parse_last_commit("2 hours ago\u{0}1700000000\n");
        assert_eq!(lc.relative, "2 hours ago");
        assert_eq!(lc.timestamp, 1_700_000_000);

        assert_eq!(parse_last_commit(""), LastCommit::default());

        let lc = parse_last_commit("3 days ago\u{0}garbage");
        assert_eq!(lc.relative, "3 days ago");
        assert_eq!(lc.timestamp, 0);
    }
}
