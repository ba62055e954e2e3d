#![forbid(unsafe_code)]

use std::fmt;

use serde::Serialize;

/// Commit divergence between a worktree branch and the default branch,
/// counted from their merge base.
///
/// Displays as `even`, `↑3`, `↓2` or `↑3 ↓2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Divergence {
    pub ahead: u32,
    pub behind: u32,
}

impl Divergence {
    #[must_use]
    pub fn new(ahead: u32, behind: u32) -> Self {
        Self { ahead, behind }
    }

    #[must_use]
    pub fn is_even(self) -> bool {
        self.ahead == 0 && self.behind == 0
    }

    /// Parses `git rev-list --left-right --count <default>...<branch>`.
    /// The left column counts commits only on the default branch (behind),
    /// the right column commits only on the worktree branch (ahead).
    #[must_use]
    pub fn from_left_right(out: &str) -> Option<Self> {
        let mut cols = out.split_whitespace();
        let behind = cols.next()?.parse().ok()?;
        let ahead = cols.next()?.parse().ok()?;
        if cols.next().is_some() {
            return None;
        }
        Some(Self { ahead, behind })
    }
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_even() {
            return f.write_str("even");
        }
        match (self.ahead, self.behind) {
            (a, 0) => write!(f, "↑{a}"),
            (0, b) => write!(f, "↓{b}"),
            (a, b) => write!(f, "↑{a} ↓{b}"),
        }
    }
}
