#![forbid(unsafe_code)]

pub mod dashboard;

use std::io::{self, IsTerminal as _, Write as _};

use crossterm::cursor::MoveTo;
use crossterm::terminal::{Clear, ClearType};

use crate::error::WtmuxError;

#[must_use]
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Terminal width in columns, or 80 when stdout is not a terminal.
#[must_use]
pub fn terminal_width() -> usize {
    crossterm::terminal::size().map_or(80, |(cols, _)| usize::from(cols))
}

pub fn clear_screen() -> Result<(), WtmuxError> {
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))
        .map_err(|e| WtmuxError::Other(format!("failed to clear screen: {e}")))
}

/// Replaces the screen contents with a fully rendered frame.
pub fn present(frame: &str) -> Result<(), WtmuxError> {
    let mut stdout = io::stdout().lock();
    crossterm::queue!(stdout, Clear(ClearType::All), MoveTo(0, 0))
        .and_then(|()| stdout.write_all(frame.as_bytes()))
        .and_then(|()| stdout.flush())
        .map_err(|e| WtmuxError::Other(format!("failed to draw frame: {e}")))
}
