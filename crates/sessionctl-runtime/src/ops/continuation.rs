//! Continuation orchestrator (spec §4.4): resolve a session's lineage,
//! spawn a brand new session through the user's own login shell, seed it
//! with a summary of the prior conversation, and stamp the continuation
//! link onto disk so lineage walks can find their way back.

use crate::context::RuntimeContext;
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use sessionctl_analysis::CommandRunner;
use sessionctl_engine::identity::write_derived_session;
use sessionctl_engine::{self as engine};
use sessionctl_types::{Agent, ContinueMetadata, SessionFilter, SessionOrder, SessionRecord};
use std::time::Duration;

pub struct ContinuationOptions {
    pub shell: String,
    pub custom_instructions: Option<String>,
    pub timeout: Duration,
}

impl Default for ContinuationOptions {
    fn default() -> Self {
        Self {
            shell: std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string()),
            custom_instructions: None,
            timeout: Duration::from_secs(180),
        }
    }
}

pub struct ContinuationOutcome {
    pub new_session: SessionRecord,
    pub summary_prompt: String,
}

/// The summarization prompt's shape varies with how many ancestors are
/// being folded in, and always prioritizes any custom instructions the
/// caller supplied over the default framing. Every variant names the
/// session file(s) directly, directs the agent to explore them with
/// parallel sub-agents rather than reading them itself, and closes by
/// asking it to state its understanding back before doing new work.
pub fn build_summary_prompt(lineage: &[SessionRecord], custom_instructions: Option<&str>) -> String {
    let mut prompt = String::new();
    if lineage.len() <= 1 {
        let record = lineage.first();
        let path = record.map(|r| r.file_path.display().to_string()).unwrap_or_default();
        prompt.push_str(&format!(
            "There is a log of a past conversation with an AI agent in this JSONL session file: {path}\n\n\
             The file is in JSONL format (one JSON object per line). Each line represents a message in \
             the conversation with fields like 'type' (user/assistant), 'message.content', etc.\n\n\
             Strategically use PARALLEL SUB-AGENTS to explore {path} (which may be very long) so that you \
             have proper context to continue the task the agent was working on at the end of that session.\n\n\
             Do not read {path} yourself. To save your own context, use parallel sub-agents, exploring the \
             beginning, middle, and end of the session as needed.\n\n"
        ));
    } else {
        let file_list =
            lineage.iter().enumerate().map(|(idx, r)| format!("{}. {}", idx + 1, r.file_path.display())).collect::<Vec<_>>().join("\n");
        let newest = lineage.last().map(|r| r.file_path.display().to_string()).unwrap_or_default();
        prompt.push_str(&format!(
            "There is a chain of {} past conversations with an AI agent, continued across sessions as \
             context ran out. Here are the JSONL session files in chronological order (oldest first):\n\n{file_list}\n\n\
             Each file is in JSONL format (one JSON object per line). The last file ({newest}) is the most \
             recent session.\n\n\
             Strategically use PARALLEL SUB-AGENTS to explore these files so that you have proper context \
             to continue the task: the original requirements, how the work progressed across sessions, and \
             the current state.\n\n\
             Do not read these files yourself. To save your own context, use parallel sub-agents, exploring \
             the beginning of the first file and the end of each continuation.\n\n",
            lineage.len()
        ));
    }
    for (idx, record) in lineage.iter().enumerate() {
        prompt.push_str(&format!("Session {} ({}): {}\n", idx + 1, record.session_id, record.headline().unwrap_or("(no preview available)")));
    }
    if let Some(custom) = custom_instructions {
        prompt.push_str("\n=== USER INSTRUCTIONS (PRIORITIZE THESE) ===\n");
        prompt.push_str(custom);
        prompt.push('\n');
    }
    prompt.push_str("\nWhen done exploring, state your understanding of the most recent task back to me before doing any new work.\n");
    prompt
}

async fn run_via_login_shell(runner: &dyn CommandRunner, shell: &str, command_line: &str, timeout: Duration) -> Result<()> {
    let args = vec!["-i".to_string(), "-c".to_string(), command_line.to_string()];
    let fut = runner.run(shell, &args);
    let output =
        tokio::time::timeout(timeout, fut).await.context("agent CLI invocation timed out")?.context("failed to spawn login shell")?;
    if !output.success {
        return Err(anyhow!("agent CLI exited with an error: {}", output.stderr));
    }
    Ok(())
}

fn non_interactive_entrypoint(agent: Agent, model: Option<&str>, prompt: &str) -> String {
    let model_flag = model.map(|m| format!(" --model {m}")).unwrap_or_default();
    match agent {
        Agent::ClaudeCode => format!("claude -p{model_flag} {}", shell_quote(prompt)),
        Agent::Codex => format!("codex exec{model_flag} {}", shell_quote(prompt)),
    }
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// Finds the newest session created after `since` under the agent's store.
/// Used instead of scraping CLI stdout for a session id, since neither
/// agent CLI's output format is a contract this crate depends on.
fn newest_session_since(ctx: &RuntimeContext, agent: Agent, since: chrono::DateTime<Utc>) -> Result<SessionRecord> {
    let filter =
        SessionFilter { agent: Some(agent), modified_after: Some(since), order: Some(SessionOrder::RecentlyCreated), ..Default::default() };
    engine::discover(&ctx.store, &filter)?.into_iter().next().ok_or_else(|| anyhow!("no new session appeared after spawning the agent CLI"))
}

/// Spawns a brand new session for `agent`, seeds it with a summary of
/// `lineage`, and stamps the continuation link back to `lineage`'s most
/// recent session.
pub async fn continue_lineage(
    ctx: &RuntimeContext,
    runner: &dyn CommandRunner,
    agent: Agent,
    lineage: &[SessionRecord],
    options: &ContinuationOptions,
) -> Result<ContinuationOutcome> {
    let parent = lineage.last().ok_or_else(|| anyhow!("continuation requires at least one session in lineage"))?;
    let summary_prompt = build_summary_prompt(lineage, options.custom_instructions.as_deref());

    let since = Utc::now();
    let seed_command = non_interactive_entrypoint(agent, ctx.config.rollover_default_model.as_deref(), "Hello");
    run_via_login_shell(runner, &options.shell, &seed_command, options.timeout).await?;

    let new_record = newest_session_since(ctx, agent, since)?;

    let summarize_command = non_interactive_entrypoint(agent, ctx.config.rollover_analysis_model.as_deref(), &summary_prompt);
    run_via_login_shell(runner, &options.shell, &summarize_command, options.timeout).await?;

    let lines = std::fs::read_to_string(&new_record.file_path)?.lines().map(str::to_string).collect::<Vec<_>>();
    let metadata = ContinueMetadata {
        parent_session_id: parent.session_id.clone(),
        parent_session_file: parent.file_path.display().to_string(),
        continued_at: Utc::now().to_rfc3339(),
    };
    write_derived_session(&new_record.file_path, agent, &new_record.session_id, &lines, "continue_metadata", &metadata)?;

    let stamped = engine::classify(&new_record.file_path, Some(agent))?;
    Ok(ContinuationOutcome { new_session: stamped, summary_prompt })
}

/// Execs the agent CLI's resume subcommand through the user's login shell,
/// replacing the current process image so terminal control transfers
/// cleanly. Never returns on success.
#[cfg(unix)]
pub fn attach_interactive(shell: &str, agent: Agent, session_id: &str) -> Result<std::convert::Infallible> {
    use std::os::unix::process::CommandExt;

    let resume_command = match agent {
        Agent::ClaudeCode => format!("claude --resume {session_id}"),
        Agent::Codex => format!("codex resume {session_id}"),
    };
    let err = std::process::Command::new(shell).arg("-i").arg("-c").arg(resume_command).exec();
    Err(anyhow!("failed to exec into interactive session: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_session_lineage_uses_singular_framing() {
        let record = SessionRecord {
            session_id: "s1".to_string(),
            agent: Agent::ClaudeCode,
            file_path: "/tmp/s1.jsonl".into(),
            cwd: None,
            git_branch: None,
            created_at: Utc::now(),
            modified_at: Utc::now(),
            line_count: 1,
            first_user_message_preview: Some("fix the bug".to_string()),
            last_user_message_preview: Some("fix the bug".to_string()),
            derivation: sessionctl_types::Derivation::Original,
            is_sidechain: false,
            conversational_event_count: 1,
        };
        let prompt = build_summary_prompt(std::slice::from_ref(&record), None);
        assert!(prompt.contains("/tmp/s1.jsonl"));
        assert!(prompt.contains("PARALLEL SUB-AGENTS"));
        assert!(prompt.contains("Do not read"));
        assert!(prompt.contains("state your understanding"));
        assert!(prompt.contains("fix the bug"));
    }

    #[test]
    fn custom_instructions_are_appended_with_priority_marker() {
        let prompt = build_summary_prompt(&[], Some("focus on the auth module"));
        assert!(prompt.contains("=== USER INSTRUCTIONS (PRIORITIZE THESE) ==="));
        assert!(prompt.contains("focus on the auth module"));
    }
}
