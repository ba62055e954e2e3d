#![forbid(unsafe_code)]

use std::path::PathBuf;

use crate::config::Config;
use crate::core::git::Git;
use crate::core::status::{self, build_rows};
use crate::core::worktree::{WorktreeRecord, list_worktrees};
use crate::error::WtmuxError;
use crate::mux::Mux as _;
use crate::mux::navigate::sync_orphaned_windows;
use crate::mux::tmux::TmuxMux;
use crate::output::status::StatusView;

/// Per-invocation handles: config, the main repository, tmux and the session
/// that holds this repository's windows. Nothing here is cached; every
/// accessor re-queries git and tmux.
#[derive(Debug, Clone)]
pub struct RepoContext {
    pub cfg: Config,
    pub git: Git,
    pub mux: TmuxMux,
    pub session: String,
}

impl RepoContext {
    pub fn new(cfg: Config) -> Result<Self, WtmuxError> {
        let git = Git::discover()?;
        let mux =
            TmuxMux::new(cfg.mux.tmux_command.clone()).with_socket(cfg.mux.tmux_socket.trim());
        let session = cfg.mux.session_for(&git.repo_name());
        tracing::debug!(
            "repo root {}, session {session}",
            git.repo_root().display()
        );
        Ok(Self {
            cfg,
            git,
            mux,
            session,
        })
    }

    /// Fresh worktree inventory, with orphaned windows closed first.
    #[must_use]
    pub fn worktrees(&self) -> Vec<WorktreeRecord> {
        let worktrees = list_worktrees(&self.git);
        sync_orphaned_windows(
            &self.mux,
            &self.session,
            &worktrees,
            &self.cfg.mux.reserved_windows,
        );
        worktrees
    }

    #[must_use]
    pub fn status_view(&self) -> StatusView {
        let worktrees = self.worktrees();
        let open_windows = self.mux.list_windows(&self.session);
        let default_branch = self
            .git
            .default_branch(&self.cfg.default_branch_candidates());
        let cwd = current_dir();
        let current = cwd
            .as_deref()
            .and_then(|cwd| status::current_worktree(&worktrees, cwd));
        let rows = build_rows(
            &self.git,
            &worktrees,
            &open_windows,
            &default_branch,
            current,
        );
        StatusView {
            repo_name: self.git.repo_name(),
            session: self.session.clone(),
            default_branch,
            rows,
        }
    }
}

/// Canonical cwd so it compares with the resolved paths git reports.
fn current_dir() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    Some(cwd.canonicalize().unwrap_or(cwd))
}
