#![forbid(unsafe_code)]

pub mod context;

use std::process::ExitCode;
use std::time::Duration;

use clap::{CommandFactory as _, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config;
use crate::core::resolve::resolve;
use crate::core::worktree::WorktreeRecord;
use crate::error::WtmuxError;
use crate::mux::Mux as _;
use crate::mux::navigate::{self, OpenOutcome};
use crate::tui;

use self::context::RepoContext;

const ABOUT: &str = "A tmux-based viewer for git worktrees";

const LONG_ABOUT: &str = "\
A tmux-based viewer for git worktrees.

wtmux gives you quick terminal access to the worktrees under a repository's
.worktrees/ directory through dedicated tmux windows, one per worktree, in a
per-repository tmux session.

wtmux is a viewer: it never creates, removes or modifies worktrees. It opens
tmux windows pointing at existing worktrees and closes windows whose
worktrees are gone.";

#[derive(Debug, Parser)]
#[command(name = "wtmux", version, about = ABOUT, long_about = LONG_ABOUT)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List worktrees with tmux and git status
    #[command(alias = "ls")]
    List(ListArgs),
    /// Switch to a worktree's tmux window, creating it if needed
    #[command(alias = "cd")]
    Open(NameArgs),
    /// Close a worktree's tmux window
    Close(NameArgs),
    /// Live-updating status dashboard
    Dash(DashArgs),
    Config(ConfigArgs),
    Completion(CompletionArgs),
    Version,
}

#[derive(Debug, Default, Parser)]
pub struct ListArgs {
    /// Output in JSON format
    #[arg(long = "json", conflicts_with = "csv")]
    pub json: bool,
    /// Output as CSV
    #[arg(long = "csv")]
    pub csv: bool,
}

#[derive(Debug, Parser)]
pub struct NameArgs {
    /// Worktree name: full path under .worktrees/, leaf name, or a unique substring
    pub name: String,
}

#[derive(Debug, Parser)]
pub struct DashArgs {
    /// Refresh interval in seconds (defaults to status.refresh_interval_secs)
    #[arg(short = 'i', long = "interval")]
    pub interval_seconds: Option<u64>,
}

#[derive(Debug, Parser)]
pub struct CompletionArgs {
    pub shell: clap_complete::Shell,
}

#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub cmd: ConfigCmd,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCmd {
    List,
    Set(ConfigSetArgs),
    Get(ConfigGetArgs),
}

#[derive(Debug, Parser)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Parser)]
pub struct ConfigGetArgs {
    pub key: String,
}

pub async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            ExitCode::from(1)
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("WTMUX_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.cmd {
        None => cmd_list(&ListArgs::default()),
        Some(Commands::List(args)) => cmd_list(&args),
        Some(Commands::Open(args)) => cmd_open(&args),
        Some(Commands::Close(args)) => cmd_close(&args),
        Some(Commands::Dash(args)) => cmd_dash(&args).await,
        Some(Commands::Completion(args)) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "wtmux", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Config(args)) => match args.cmd {
            ConfigCmd::List => {
                print!("{}", config::list_resolved_toml()?);
                Ok(ExitCode::SUCCESS)
            }
            ConfigCmd::Set(set) => {
                config::set_value_string(&set.key, &set.value)?;
                println!("Set {} = {}", set.key, set.value);
                Ok(ExitCode::SUCCESS)
            }
            ConfigCmd::Get(get) => match config::get_value_string(&get.key)? {
                Some(v) => {
                    println!("{v}");
                    Ok(ExitCode::SUCCESS)
                }
                None => anyhow::bail!(
                    "configuration key '{}' not found - use 'wtmux config list' to see available keys",
                    get.key
                ),
            },
        },
        Some(Commands::Version) => Ok(cmd_version()),
    }
}

fn load_context() -> anyhow::Result<RepoContext> {
    let cfg = config::load()?;
    Ok(RepoContext::new(cfg)?)
}

fn cmd_list(args: &ListArgs) -> anyhow::Result<ExitCode> {
    let ctx = load_context()?;
    let view = ctx.status_view();

    if args.json {
        view.write_json(std::io::stdout().lock())?;
    } else if args.csv {
        view.write_csv()?;
    } else {
        if !view.rows.is_empty() {
            println!("Worktrees in {}:\n", view.repo_name);
        }
        view.write_text(std::io::stdout().lock(), &ctx.cfg.ui)?;
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_open(args: &NameArgs) -> anyhow::Result<ExitCode> {
    let ctx = load_context()?;
    if !ctx.mux.is_inside() {
        return Err(WtmuxError::NotInsideTmux.into());
    }

    let worktrees = ctx.worktrees();
    let target = resolve(&args.name, &worktrees)?;
    let outcome = navigate::open_worktree(&ctx.mux, &ctx.session, target, &worktrees)?;

    let note = match outcome {
        OpenOutcome::CreatedSession => ", new session",
        OpenOutcome::CreatedWindow => ", new window",
        OpenOutcome::Reused => "",
    };
    println!("→ {} (session: {}{note})", target.name(), ctx.session);
    Ok(ExitCode::SUCCESS)
}

fn cmd_close(args: &NameArgs) -> anyhow::Result<ExitCode> {
    let ctx = load_context()?;
    let worktrees = ctx.worktrees();
    let target = resolve(&args.name, &worktrees)?;

    if navigate::close_worktree(&ctx.mux, &ctx.session, target, &worktrees)? {
        println!("Closed window '{}' ({})", target.leaf(), target.name());
    } else {
        println!("No open window for {}", target.name());
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_dash(args: &DashArgs) -> anyhow::Result<ExitCode> {
    let ctx = load_context()?;
    let secs = args
        .interval_seconds
        .unwrap_or(ctx.cfg.status.refresh_interval_secs)
        .max(1);
    tui::dashboard::run(&ctx, Duration::from_secs(secs)).await?;
    Ok(ExitCode::SUCCESS)
}

fn cmd_version() -> ExitCode {
    println!("wtmux version {}", env!("CARGO_PKG_VERSION"));
    println!("  rust: {}", rustc_version_runtime::version());
    println!(
        "  os/arch: {}/{}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    ExitCode::SUCCESS
}

/// Prints an error to stderr, listing candidates for resolution failures.
fn report_error(err: &anyhow::Error) {
    for line in error_lines(err) {
        eprintln!("{line}");
    }
}

fn error_lines(err: &anyhow::Error) -> Vec<String> {
    let names = |wts: &[WorktreeRecord]| -> Vec<String> {
        wts.iter().map(|w| format!("  {}", w.name())).collect()
    };

    match err.downcast_ref::<WtmuxError>() {
        Some(WtmuxError::AmbiguousWorktree { query, matches }) => {
            let mut lines = vec![format!(
                "Ambiguous name '{query}' matches multiple worktrees:"
            )];
            lines.extend(names(matches));
            lines.push("Be more specific (e.g., use the full path).".to_owned());
            lines
        }
        Some(WtmuxError::WorktreeNotFound { query, available }) => {
            let mut lines = vec![format!("No worktree matching '{query}'.")];
            if available.is_empty() {
                lines.push("No worktrees found under .worktrees/".to_owned());
            } else {
                lines.push("Available worktrees:".to_owned());
                lines.extend(names(available));
            }
            lines
        }
        Some(WtmuxError::LeafCollision { leaf, worktrees }) => {
            let mut lines = vec![format!(
                "Error: Multiple worktrees share the leaf name '{leaf}':"
            )];
            lines.extend(names(worktrees));
            lines.push("Rename one worktree directory to make leaf names unique.".to_owned());
            lines
        }
        _ => vec![format!("Error: {err:#}")],
    }
}
