#![forbid(unsafe_code)]

pub mod navigate;
pub mod tmux;

use std::path::Path;

use crate::error::WtmuxError;

/// Terminal multiplexer seam. Queries degrade to `false` / empty; mutations
/// report failures.
pub trait Mux {
    /// Whether this process runs inside an interactive multiplexer client.
    fn is_inside(&self) -> bool;
    fn session_exists(&self, session: &str) -> bool;
    fn list_windows(&self, session: &str) -> Vec<String>;

    fn create_session(&self, session: &str, window: &str, start_dir: &Path)
    -> Result<(), WtmuxError>;
    fn create_window(&self, session: &str, window: &str, start_dir: &Path)
    -> Result<(), WtmuxError>;
    fn switch_to(&self, session: &str, window: &str) -> Result<(), WtmuxError>;
    fn kill_window(&self, session: &str, window: &str) -> Result<(), WtmuxError>;

    fn window_exists(&self, session: &str, window: &str) -> bool {
        self.list_windows(session).iter().any(|w| w == window)
    }
}
