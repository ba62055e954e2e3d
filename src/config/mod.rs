#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};

use crate::error::WtmuxError;
use crate::mux::tmux::clean_session_name;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub git: GitConfig,
    pub mux: MuxConfig,
    pub status: StatusConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GitConfig {
    /// Checked in order; the first existing local branch is the default.
    pub default_branches: Vec<String>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            default_branches: vec!["main".to_owned(), "master".to_owned()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MuxConfig {
    pub tmux_command: String,
    /// Private tmux server (`tmux -L`). Empty means the default server.
    pub tmux_socket: String,
    /// Empty means the repository directory name.
    pub session_name: String,
    /// Windows never treated as orphans.
    pub reserved_windows: Vec<String>,
}

impl Default for MuxConfig {
    fn default() -> Self {
        Self {
            tmux_command: "tmux".to_owned(),
            tmux_socket: String::new(),
            session_name: String::new(),
            reserved_windows: vec!["dash".to_owned()],
        }
    }
}

impl MuxConfig {
    #[must_use]
    pub fn session_for(&self, repo_name: &str) -> String {
        let name = self.session_name.trim();
        let name = if name.is_empty() { repo_name } else { name };
        clean_session_name(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatusConfig {
    pub refresh_interval_secs: u64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub icons: bool,
    pub tilde_home: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            icons: true,
            tilde_home: true,
        }
    }
}

/// Environment variable that points at an alternate config file.
pub const CONFIG_ENV: &str = "WTMUX_CONFIG";

/// `$WTMUX_CONFIG`, else `~/.config/wtmux/config.toml`. On Windows the
/// platform config dir is used unless the Unix-style file already exists.
pub fn config_file() -> anyhow::Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }

    let home = home_dir().context("failed to determine home directory")?;
    let unix = home.join(".config").join("wtmux").join("config.toml");
    if !cfg!(windows) || unix.exists() {
        return Ok(unix);
    }

    let proj = ProjectDirs::from("com", "wtmux", "wtmux")
        .context("failed to determine platform config directory")?;
    Ok(proj.config_dir().join("config.toml"))
}

fn home_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

/// Shortens a path under the home directory to `~/...`.
#[must_use]
pub fn tilde_path(path: &Path) -> String {
    match home_dir().and_then(|home| path.strip_prefix(home).ok().map(Path::to_path_buf)) {
        Some(rest) if rest.as_os_str().is_empty() => "~".to_owned(),
        Some(rest) => Path::new("~").join(rest).display().to_string(),
        None => path.display().to_string(),
    }
}

pub fn load() -> anyhow::Result<Config> {
    load_at(&config_file()?)
}

pub fn list_resolved_toml() -> anyhow::Result<String> {
    let cfg = load()?;
    Ok(toml::to_string_pretty(&cfg)?)
}

pub fn get_value_string(key: &str) -> anyhow::Result<Option<String>> {
    get_value_string_at_path(&config_file()?, key)
}

pub fn set_value_string(key: &str, value: &str) -> anyhow::Result<()> {
    set_value_string_at_path(&config_file()?, key, value)
}

/// Raw file contents, or `None` when the file does not exist yet.
fn read_raw(path: &Path) -> anyhow::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(WtmuxError::IoPath {
            path: path.to_path_buf(),
            source: e,
        }
        .into()),
    }
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<Config> {
    let cfg: Config =
        toml::from_str(raw).with_context(|| format!("invalid config in {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_at(path: &Path) -> anyhow::Result<Config> {
    match read_raw(path)? {
        Some(raw) => parse_config(&raw, path),
        None => Ok(Config::default()),
    }
}

pub fn get_value_string_at_path(path: &Path, key: &str) -> anyhow::Result<Option<String>> {
    let cfg = load_at(path)?;
    Ok(lookup_value(&cfg, key.trim()).map(format_value_for_stdout))
}

/// Sets one key in place, keeping the rest of the file (comments included)
/// untouched. The file is only written when the result is still valid.
pub fn set_value_string_at_path(path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let raw = read_raw(path)?.unwrap_or_default();
    parse_config(&raw, path)?;
    let mut doc = raw
        .parse::<toml_edit::DocumentMut>()
        .with_context(|| format!("invalid TOML in {}", path.display()))?;

    let key = key.trim();
    apply_set(&mut doc, key, parse_value_for_key(key, value)?)?;

    let updated = doc.to_string();
    parse_config(&updated, path)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| WtmuxError::IoPath {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, updated).map_err(|e| WtmuxError::IoPath {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

impl Config {
    pub fn validate(&self) -> Result<(), WtmuxError> {
        if self.git.default_branches.iter().all(|b| b.trim().is_empty()) {
            return Err(WtmuxError::Config(
                "git.default_branches must name at least one branch".to_owned(),
            ));
        }
        if self.mux.tmux_command.trim().is_empty() {
            return Err(WtmuxError::Config(
                "mux.tmux_command must not be empty".to_owned(),
            ));
        }
        if self.status.refresh_interval_secs == 0 {
            return Err(WtmuxError::Config(
                "status.refresh_interval_secs must be >= 1".to_owned(),
            ));
        }
        Ok(())
    }

    /// Default-branch candidates with blanks removed.
    #[must_use]
    pub fn default_branch_candidates(&self) -> Vec<String> {
        self.git
            .default_branches
            .iter()
            .map(|b| b.trim())
            .filter(|b| !b.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyType {
    Bool,
    Int,
    String,
    List,
}

fn key_type(key: &str) -> Option<KeyType> {
    Some(match key {
        "mux.tmux_command" | "mux.tmux_socket" | "mux.session_name" => KeyType::String,
        "ui.icons" | "ui.tilde_home" => KeyType::Bool,
        "status.refresh_interval_secs" => KeyType::Int,
        "git.default_branches" | "mux.reserved_windows" => KeyType::List,
        _ => return None,
    })
}

fn parse_value_for_key(key: &str, value: &str) -> anyhow::Result<toml_edit::Item> {
    let key_type = key_type(key).ok_or_else(|| WtmuxError::InvalidConfigKey(key.to_owned()))?;
    let invalid = |msg: String| WtmuxError::InvalidConfigValue {
        key: key.to_owned(),
        msg,
    };
    let item = match key_type {
        KeyType::Bool => toml_edit::value(parse_bool(value).map_err(invalid)?),
        KeyType::Int => toml_edit::value(parse_int(value).map_err(invalid)?),
        KeyType::String => toml_edit::value(value),
        KeyType::List => {
            let mut arr = toml_edit::Array::new();
            for item in parse_list(value) {
                arr.push(item);
            }
            toml_edit::value(arr)
        }
    };
    Ok(item)
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(format!("expected true|false, got '{other}'")),
    }
}

fn parse_int(s: &str) -> Result<i64, String> {
    s.trim()
        .parse::<i64>()
        .map_err(|e| format!("expected integer, got '{s}': {e}"))
}

/// Comma-separated list; blank entries are dropped.
fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Keys are always `section.field`, which `key_type` has already checked.
fn apply_set(
    doc: &mut toml_edit::DocumentMut,
    key: &str,
    value: toml_edit::Item,
) -> Result<(), WtmuxError> {
    let (section, field) = key
        .split_once('.')
        .ok_or_else(|| WtmuxError::InvalidConfigKey(key.to_owned()))?;
    let table = doc
        .entry(section)
        .or_insert_with(toml_edit::table)
        .as_table_mut()
        .ok_or_else(|| WtmuxError::Config(format!("cannot set {key}: '{section}' is not a table")))?;
    table.insert(field, value);
    Ok(())
}

fn lookup_value(cfg: &Config, key: &str) -> Option<serde_json::Value> {
    let (section, field) = key.split_once('.')?;
    let mut root = serde_json::to_value(cfg).ok()?;
    root.get_mut(section)?.get_mut(field).map(serde_json::Value::take)
}

fn format_value_for_stdout(v: serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s,
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(format_value_for_stdout)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
