#![forbid(unsafe_code)]

pub mod divergence;
pub mod git;
pub mod reconcile;
pub mod resolve;
pub mod status;
pub mod worktree;
