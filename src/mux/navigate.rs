#![forbid(unsafe_code)]

use crate::core::reconcile;
use crate::core::resolve::ensure_unique_leaf;
use crate::core::worktree::WorktreeRecord;
use crate::error::WtmuxError;
use crate::mux::Mux;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    CreatedSession,
    CreatedWindow,
    Reused,
}

/// Kills windows whose worktree is gone. Returns the names that were closed.
///
/// Worktrees can disappear between invocations, so this runs before every
/// command. A failed kill is reported and skipped.
pub fn sync_orphaned_windows(
    mux: &dyn Mux,
    session: &str,
    worktrees: &[WorktreeRecord],
    reserved: &[String],
) -> Vec<String> {
    if !mux.session_exists(session) {
        return Vec::new();
    }
    let open = mux.list_windows(session);
    let mut closed = Vec::new();
    for window in reconcile::orphans(&open, worktrees, reserved) {
        match mux.kill_window(session, &window) {
            Ok(()) => {
                eprintln!("  Cleaned up orphaned window: {window}");
                closed.push(window);
            }
            Err(e) => {
                tracing::warn!("failed to close orphaned window {window}: {e}");
                eprintln!("  Failed to clean up orphaned window {window}: {e}");
            }
        }
    }
    closed
}

/// Creates or reuses the window for `target` and switches the client to it.
///
/// Nothing is created or switched when another worktree shares the leaf.
pub fn open_worktree(
    mux: &dyn Mux,
    session: &str,
    target: &WorktreeRecord,
    worktrees: &[WorktreeRecord],
) -> Result<OpenOutcome, WtmuxError> {
    ensure_unique_leaf(target, worktrees)?;
    let window = target.leaf();

    let outcome = if !mux.session_exists(session) {
        mux.create_session(session, &window, &target.path)?;
        OpenOutcome::CreatedSession
    } else if !mux.window_exists(session, &window) {
        mux.create_window(session, &window, &target.path)?;
        OpenOutcome::CreatedWindow
    } else {
        OpenOutcome::Reused
    };

    mux.switch_to(session, &window)?;
    Ok(outcome)
}

/// Kills `target`'s window. Returns `false` when no window was open.
pub fn close_worktree(
    mux: &dyn Mux,
    session: &str,
    target: &WorktreeRecord,
    worktrees: &[WorktreeRecord],
) -> Result<bool, WtmuxError> {
    ensure_unique_leaf(target, worktrees)?;
    let window = target.leaf();
    if !mux.window_exists(session, &window) {
        return Ok(false);
    }
    mux.kill_window(session, &window)?;
    Ok(true)
}
