//! Command-line surface: global overrides (home directories, state dir,
//! shell-integration mode, verbosity) plus one subcommand per operation.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sessionctl", version, about = "Find, trim, export, and resume Claude Code / Codex session logs")]
pub struct Cli {
    /// Overrides where Claude Code's session logs are read from.
    #[arg(long, global = true)]
    pub claude_home: Option<PathBuf>,
    /// Overrides where Codex's session logs are read from (Codex has no
    /// environment-variable equivalent, unlike Claude Code's
    /// `CLAUDE_CONFIG_DIR`, so this flag is the only override).
    #[arg(long, global = true)]
    pub codex_home: Option<PathBuf>,
    /// Overrides the persistent state directory (config, search index).
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,
    /// Emit a launcher command on stdout instead of execing directly, for
    /// a shell function wrapper to `eval` (needed for `resume`/`continue`
    /// to actually change the calling shell's state).
    #[arg(long, global = true)]
    pub shell: bool,
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentArg {
    Claude,
    Codex,
}

impl From<AgentArg> for sessionctl_types::Agent {
    fn from(value: AgentArg) -> Self {
        match value {
            AgentArg::Claude => sessionctl_types::Agent::ClaudeCode,
            AgentArg::Codex => sessionctl_types::Agent::Codex,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List sessions across both agents.
    Find(FindArgs),
    /// List only Claude Code sessions.
    FindClaude(FindArgs),
    /// List only Codex sessions.
    FindCodex(FindArgs),
    /// List only original (never trimmed or continued) sessions.
    FindOriginal(FindArgs),
    /// List only derived (trimmed or continued) sessions.
    FindDerived(FindArgs),
    /// Deterministically trim a session.
    Trim(TrimArgs),
    /// LLM-guided smart trim.
    SmartTrim(SmartTrimArgs),
    /// Clone a session with no trims applied.
    Clone(SessionRefArgs),
    /// Export one or more sessions to formatted text.
    Export(ExportArgs),
    /// Spawn a fresh session that continues a prior lineage.
    Continue(ContinueArgs),
    /// Resume a session interactively.
    Resume(SessionRefArgs),
    /// Full-text search over the index.
    Search(SearchArgs),
    /// Build or rebuild the search index.
    Index(IndexArgs),
    /// Repair a session's identity fields after a manual file rename.
    Repair(SessionRefArgs),
    /// Delete a session file.
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct SessionRefArgs {
    /// Session id, partial id, or path. Omit to use the latest session in
    /// the current project.
    pub session: Option<String>,
}

#[derive(Args, Debug)]
pub struct FindArgs {
    /// Case-folded keywords, ANDed together, matched against raw session text.
    pub keywords: Vec<String>,
    #[arg(long)]
    pub limit: Option<usize>,
    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrimModeArg {
    ToolResultsOnly,
    TrimFirstAssistant,
    TrimAllExceptLast,
}

#[derive(Args, Debug)]
pub struct TrimArgs {
    pub session: Option<String>,
    #[arg(long, default_value_t = 200)]
    pub char_threshold: usize,
    #[arg(long, value_enum, default_value_t = TrimModeArg::ToolResultsOnly)]
    pub mode: TrimModeArg,
    /// `trim-first-assistant` only: how many leading assistant messages to replace.
    #[arg(long, default_value_t = 1)]
    pub count: usize,
    /// `trim-all-except-last` only: how many trailing assistant messages to keep.
    #[arg(long, default_value_t = 1)]
    pub keep: usize,
    /// Restrict trimming to these tool names; repeat to add more. Omit to
    /// target every tool.
    #[arg(long = "tool")]
    pub tool_names: Vec<String>,
}

#[derive(Args, Debug)]
pub struct SmartTrimArgs {
    pub session: Option<String>,
    #[arg(long)]
    pub instructions: Option<String>,
    #[arg(long, value_enum)]
    pub agent: Option<AgentArg>,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    pub session: Option<String>,
    /// Export every session discovered rather than just one.
    #[arg(long)]
    pub all: bool,
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ContinueArgs {
    pub session: Option<String>,
    #[arg(long)]
    pub instructions: Option<String>,
    #[arg(long, value_enum)]
    pub agent: Option<AgentArg>,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    pub query: Option<String>,
    #[arg(long)]
    pub project: Option<String>,
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct IndexArgs {
    #[arg(long)]
    pub rebuild: bool,
    pub from_exports: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    pub session: Option<String>,
    #[arg(short = 'y', long)]
    pub yes: bool,
}
