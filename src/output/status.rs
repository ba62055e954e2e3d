#![forbid(unsafe_code)]

use std::io;

use crate::config::{self, UiConfig};
use crate::core::status::RowData;
use crate::output::table::{Align, Table};

/// Everything one render of the status table needs, captured in one pass.
#[derive(Debug, Clone)]
pub struct StatusView {
    pub repo_name: String,
    pub session: String,
    pub default_branch: String,
    pub rows: Vec<RowData>,
}

impl StatusView {
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.rows.iter().filter(|r| r.window_open).count()
    }

    pub fn write_text(&self, mut out: impl io::Write, ui: &UiConfig) -> io::Result<()> {
        if self.rows.is_empty() {
            writeln!(out, "  No worktrees found under .worktrees/")?;
            writeln!(out)?;
            writeln!(
                out,
                "  Create one with: git worktree add .worktrees/<name> -b <branch>"
            )?;
            return Ok(());
        }

        let marks = Marks::new(ui.icons);
        let mut t = Table::new([
            String::new(),
            "NAME".to_owned(),
            "BRANCH".to_owned(),
            "TMUX".to_owned(),
            "MODIFIED".to_owned(),
            format!("VS {}", self.default_branch.to_uppercase()),
            "LAST COMMIT".to_owned(),
            "PATH".to_owned(),
        ])
        .align(3, Align::Center)
        .indent(1);

        for r in &self.rows {
            let path = if ui.tilde_home {
                config::tilde_path(&r.worktree.path)
            } else {
                r.worktree.path.display().to_string()
            };
            t.row([
                if r.is_current { marks.current } else { "" }.to_owned(),
                r.worktree.name(),
                r.worktree.branch.clone(),
                if r.window_open { marks.open } else { marks.closed }.to_owned(),
                r.modified_label(),
                r.divergence.to_string(),
                r.last_commit.relative.clone(),
                path,
            ]);
        }
        t.write_to(&mut out)?;

        writeln!(out)?;
        writeln!(
            out,
            "  {} = tmux window open    {} = no tmux window    {} = current worktree",
            marks.open, marks.closed, marks.current
        )?;
        writeln!(
            out,
            "  Session: {} ({} worktrees, {} open)",
            self.session,
            self.rows.len(),
            self.open_count()
        )?;
        Ok(())
    }

    pub fn write_json(&self, mut out: impl io::Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut out, &self.rows)?;
        writeln!(out)
    }

    pub fn write_csv(&self) -> io::Result<()> {
        let mut t = Table::new([
            "name",
            "branch",
            "path",
            "tmux",
            "modified",
            "ahead",
            "behind",
            "last_commit",
            "last_commit_ts",
            "current",
        ]);
        for r in &self.rows {
            t.row([
                r.worktree.name(),
                r.worktree.branch.clone(),
                r.worktree.path.to_string_lossy().to_string(),
                r.window_open.to_string(),
                r.modified.to_string(),
                r.divergence.ahead.to_string(),
                r.divergence.behind.to_string(),
                r.last_commit.relative.clone(),
                r.last_commit.timestamp.to_string(),
                r.is_current.to_string(),
            ]);
        }
        t.write_csv()
    }
}

struct Marks {
    open: &'static str,
    closed: &'static str,
    current: &'static str,
}

impl Marks {
    fn new(icons: bool) -> Self {
        if icons {
            Self {
                open: "●",
                closed: "○",
                current: "▸",
            }
        } else {
            Self {
                open: "o",
                closed: "-",
                current: "*",
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::divergence::Divergence;
    use crate::core::status::LastCommit;
    use crate::core::worktree::WorktreeRecord;

    fn row(name: &str, open: bool, current: bool) -> RowData {
        RowData {
            worktree: WorktreeRecord::new(format!("/repo/.worktrees/{name}"), name, "abc"),
            window_open: open,
            modified: 2,
            divergence: Divergence::new(1, 0),
            last_commit: LastCommit {
                relative: "5 minutes ago".to_owned(),
                timestamp: 1,
            },
            is_current: current,
        }
    }

    fn view(rows: Vec<RowData>) -> StatusView {
        StatusView {
            repo_name: "repo".to_owned(),
            session: "repo".to_owned(),
            default_branch: "main".to_owned(),
            rows,
        }
    }

    fn text(v: &StatusView, icons: bool) -> String {
        let ui = UiConfig {
            icons,
            tilde_home: false,
        };
        let mut buf = Vec::new();
        v.write_text(&mut buf, &ui).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn renders_rows_with_marks() {
        let v = view(vec![row("feature/auth", true, true), row("fix/bug", false, false)]);
        let out = text(&v, true);
        let auth = out.lines().find(|l| l.contains("feature/auth")).unwrap();
        assert!(auth.contains('▸'));
        assert!(auth.contains('●'));
        assert!(auth.contains("2 files"));
        assert!(auth.contains("↑1"));
        let bug = out.lines().find(|l| l.contains("fix/bug")).unwrap();
        assert!(bug.contains('○'));
        assert!(!bug.contains('▸'));
        assert!(out.contains("VS MAIN"));
        assert!(out.contains("Session: repo (2 worktrees, 1 open)"));
    }

    #[test]
    fn renders_plain_marks_without_icons() {
        let v = view(vec![row("auth", true, false)]);
        let out = text(&v, false);
        assert!(!out.contains('●'));
        assert!(out.contains("o = tmux window open"));
    }

    #[test]
    fn empty_inventory_prints_hint() {
        let out = text(&view(Vec::new()), true);
        assert!(out.contains("No worktrees found under .worktrees/"));
    }

    #[test]
    fn json_output_includes_derived_names() {
        let v = view(vec![row("feature/auth", false, false)]);
        let mut buf = Vec::new();
        v.write_json(&mut buf).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed[0]["worktree"]["name"], "feature/auth");
        assert_eq!(parsed[0]["worktree"]["leaf"], "auth");
        assert_eq!(parsed[0]["divergence"]["ahead"], 1);
    }
}
