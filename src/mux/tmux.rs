#![forbid(unsafe_code)]

use std::path::Path;
use std::process::{Command, Output, Stdio};

use crate::error::WtmuxError;
use crate::mux::Mux;

#[derive(Debug, Clone)]
pub struct TmuxMux {
    pub tmux_command: String,
    /// Server socket name passed as `-L`; `None` uses the default server.
    pub socket: Option<String>,
}

/// A window as tmux lists it. The id (`@N`) is the only unambiguous target:
/// names may contain `.` or `:`, which tmux reads as target separators.
#[derive(Debug, Clone, PartialEq, Eq)]
struct WindowEntry {
    id: String,
    name: String,
}

impl TmuxMux {
    #[must_use]
    pub fn new(tmux_command: String) -> Self {
        Self {
            tmux_command,
            socket: None,
        }
    }

    #[must_use]
    pub fn with_socket(mut self, socket: impl Into<String>) -> Self {
        self.socket = Some(socket.into()).filter(|s| !s.is_empty());
        self
    }

    fn output(&self, args: &[&str]) -> Result<Output, WtmuxError> {
        tracing::debug!("{} {}", self.tmux_command, args.join(" "));
        let mut cmd = Command::new(&self.tmux_command);
        if let Some(socket) = &self.socket {
            cmd.arg("-L").arg(socket);
        }
        cmd.args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => WtmuxError::TmuxNotFound,
                _ => WtmuxError::Other(format!("failed to run tmux: {e}")),
            })
    }

    fn run(&self, args: &[&str]) -> Result<(), WtmuxError> {
        let out = self.output(args)?;
        if out.status.success() {
            Ok(())
        } else {
            Err(WtmuxError::Other(format!(
                "tmux {} failed with exit code {code}: {stderr}",
                args.first().copied().unwrap_or_default(),
                code = out.status.code().unwrap_or(1),
                stderr = String::from_utf8_lossy(&out.stderr).trim()
            )))
        }
    }

    fn windows(&self, session: &str) -> Vec<WindowEntry> {
        if !self.session_exists(session) {
            return Vec::new();
        }
        match self.output(&[
            "list-windows",
            "-t",
            &session_target(session),
            "-F",
            "#{window_id} #{window_name}",
        ]) {
            Ok(out) if out.status.success() => {
                parse_window_entries(&String::from_utf8_lossy(&out.stdout))
            }
            Ok(_) | Err(_) => Vec::new(),
        }
    }

    /// `=session:@id` for the first window called `window`.
    fn window_target(&self, session: &str, window: &str) -> Result<String, WtmuxError> {
        self.windows(session)
            .into_iter()
            .find(|w| w.name == window)
            .map(|w| format!("{}:{}", session_target(session), w.id))
            .ok_or_else(|| {
                WtmuxError::Other(format!(
                    "tmux window '{window}' not found in session '{}'",
                    clean_session_name(session)
                ))
            })
    }
}

impl Mux for TmuxMux {
    fn is_inside(&self) -> bool {
        std::env::var_os("TMUX").is_some_and(|v| !v.is_empty())
    }

    fn session_exists(&self, session: &str) -> bool {
        self.output(&["has-session", "-t", &session_target(session)])
            .is_ok_and(|out| out.status.success())
    }

    fn list_windows(&self, session: &str) -> Vec<String> {
        self.windows(session).into_iter().map(|w| w.name).collect()
    }

    fn create_session(
        &self,
        session: &str,
        window: &str,
        start_dir: &Path,
    ) -> Result<(), WtmuxError> {
        let dir = start_dir.to_string_lossy();
        let name = clean_session_name(session);
        self.run(&["new-session", "-d", "-s", &name, "-n", window, "-c", &dir])
    }

    fn create_window(
        &self,
        session: &str,
        window: &str,
        start_dir: &Path,
    ) -> Result<(), WtmuxError> {
        let dir = start_dir.to_string_lossy();
        // Trailing ':' targets the session and lets tmux pick the next index.
        let target = format!("{}:", session_target(session));
        self.run(&["new-window", "-d", "-t", &target, "-n", window, "-c", &dir])
    }

    fn switch_to(&self, session: &str, window: &str) -> Result<(), WtmuxError> {
        let target = self.window_target(session, window)?;
        self.run(&["switch-client", "-t", &target])
    }

    fn kill_window(&self, session: &str, window: &str) -> Result<(), WtmuxError> {
        let target = self.window_target(session, window)?;
        self.run(&["kill-window", "-t", &target])
    }
}

/// The name tmux actually gives a session: `.` and `:` become `_`.
#[must_use]
pub fn clean_session_name(session: &str) -> String {
    session.replace(['.', ':'], "_")
}

/// `=name` makes tmux match the session exactly instead of by prefix.
fn session_target(session: &str) -> String {
    format!("={}", clean_session_name(session))
}

/// Parses `#{window_id} #{window_name}` lines. Names may contain spaces.
fn parse_window_entries(out: &str) -> Vec<WindowEntry> {
    out.lines()
        .filter_map(|line| {
            let (id, name) = line.split_once(' ')?;
            let name = name.trim();
            (id.starts_with('@') && !name.is_empty()).then(|| WindowEntry {
                id: id.to_owned(),
                name: name.to_owned(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_window_entries() {
        let out = "@1 auth\n@4 release-1.2\n\n@7 my notes \ngarbage\n";
        let entries = parse_window_entries(out);
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[1],
            WindowEntry {
                id: "@4".to_owned(),
                name: "release-1.2".to_owned()
            }
        );
        assert_eq!(entries[2].name, "my notes");
        assert!(parse_window_entries("").is_empty());
    }

    #[test]
    fn session_names_are_cleaned_like_tmux() {
        assert_eq!(clean_session_name("my.app"), "my_app");
        assert_eq!(clean_session_name("a:b.c"), "a_b_c");
        assert_eq!(clean_session_name("repo"), "repo");
        assert_eq!(session_target("my.app"), "=my_app");
    }

    #[test]
    fn socket_is_optional() {
        let mux = TmuxMux::new("tmux".to_owned());
        assert_eq!(mux.socket, None);
        assert_eq!(mux.clone().with_socket("").socket, None);
        assert_eq!(mux.with_socket("test").socket.as_deref(), Some("test"));
    }

    #[test]
    fn missing_binary_degrades_queries() {
        let mux = TmuxMux::new("wtmux-no-such-tmux-binary".to_owned());
        assert!(!mux.session_exists("repo"));
        assert!(mux.list_windows("repo").is_empty());
        assert!(matches!(
            mux.create_window("repo", "auth", Path::new("/")),
            Err(WtmuxError::TmuxNotFound)
        ));
    }
}
