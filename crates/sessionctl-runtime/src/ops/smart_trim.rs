//! Wires the smart-trim engine operation to a live subprocess runner,
//! picking the non-interactive command line per agent.

use anyhow::Result;
use sessionctl_analysis::TokioCommandRunner;
use sessionctl_engine::{smart_trim_session, SmartTrimOptions, SmartTrimResult};
use sessionctl_types::Agent;
use std::path::Path;

fn default_command(agent: Agent) -> Vec<String> {
    match agent {
        Agent::ClaudeCode => vec!["claude".to_string(), "-p".to_string()],
        Agent::Codex => vec!["codex".to_string(), "exec".to_string()],
    }
}

pub async fn smart_trim(path: &Path, agent: Agent, custom_instructions: Option<String>) -> Result<SmartTrimResult> {
    let options = SmartTrimOptions { command: default_command(agent), custom_instructions, ..Default::default() };
    let runner = TokioCommandRunner;
    Ok(smart_trim_session(path, &options, &runner).await?)
}
