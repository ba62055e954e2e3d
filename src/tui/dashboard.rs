#![forbid(unsafe_code)]

use std::time::Duration;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::time::MissedTickBehavior;

use crate::cli::context::RepoContext;
use crate::config::UiConfig;
use crate::output::status::StatusView;
use crate::tui;

/// Redraws the status table every `interval` until Ctrl+C, then clears the
/// screen. When stdout is not a terminal, frames are appended instead.
pub async fn run(ctx: &RepoContext, interval: Duration) -> anyhow::Result<()> {
    let interactive = tui::is_tty();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ctrl_c = std::pin::pin!(tokio::signal::ctrl_c());

    loop {
        tokio::select! {
            res = &mut ctrl_c => {
                if interactive {
                    tui::clear_screen()?;
                }
                res?;
                return Ok(());
            }
            _ = ticker.tick() => {
                let view = ctx.status_view();
                let frame = render_frame(&view, &ctx.cfg.ui, interval, tui::terminal_width())?;
                if interactive {
                    tui::present(&frame)?;
                } else {
                    println!("{frame}");
                }
            }
        }
    }
}

fn render_frame(
    view: &StatusView,
    ui: &UiConfig,
    interval: Duration,
    width: usize,
) -> std::io::Result<String> {
    use std::io::Write as _;

    let header = format!(
        " {}: worktree dashboard (refreshes every {}s)",
        view.repo_name,
        interval.as_secs()
    );
    let rule = "─".repeat((header.chars().count() + 2).min(width));
    let updated = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_owned());

    let mut buf = Vec::new();
    writeln!(buf, "{header}")?;
    writeln!(buf, "{rule}")?;
    writeln!(buf)?;
    view.write_text(&mut buf, ui)?;
    writeln!(buf)?;
    writeln!(buf, "  Updated: {updated}    [Press Ctrl+C to exit]")?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_has_header_rule_and_body() {
        let view = StatusView {
            repo_name: "repo".to_owned(),
            session: "repo".to_owned(),
            default_branch: "main".to_owned(),
            rows: Vec::new(),
        };
        let frame =
            render_frame(&view, &UiConfig::default(), Duration::from_secs(5), 10).unwrap();
        let lines: Vec<&str> = frame.lines().collect();
        assert_eq!(lines[0], " repo: worktree dashboard (refreshes every 5s)");
        assert_eq!(lines[1], "─".repeat(10));
        assert!(frame.contains("No worktrees found"));
        assert!(frame.contains("Ctrl+C"));
    }
}
