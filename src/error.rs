#![forbid(unsafe_code)]

use std::path::PathBuf;

use thiserror::Error;

use crate::core::worktree::WorktreeRecord;

#[derive(Debug, Error)]
pub enum WtmuxError {
    #[error("not inside a git repository")]
    NotInGitRepo,

    #[error("git is required but was not found in PATH")]
    GitNotFound,

    #[error("tmux is required but was not found in PATH")]
    TmuxNotFound,

    #[error("not inside a tmux session (wtmux manages tmux windows, run this from within tmux)")]
    NotInsideTmux,

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid config key '{0}'")]
    InvalidConfigKey(String),

    #[error("invalid config value for '{key}': {msg}")]
    InvalidConfigValue { key: String, msg: String },

    #[error("no worktree matching '{query}'")]
    WorktreeNotFound {
        query: String,
        available: Vec<WorktreeRecord>,
    },

    #[error("ambiguous name '{query}' matches {} worktrees", matches.len())]
    AmbiguousWorktree {
        query: String,
        matches: Vec<WorktreeRecord>,
    },

    #[error("multiple worktrees share the leaf name '{leaf}'")]
    LeafCollision {
        leaf: String,
        worktrees: Vec<WorktreeRecord>,
    },

    #[error("io error at {path}: {source}")]
    IoPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}
