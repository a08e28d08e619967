//! Identifier minting and output-path construction for derived sessions
//! (spec §4.3.1 rule 1, SPEC_FULL.md's Agent B rollout filename detail).

use chrono::{DateTime, Utc};
use sessionctl_types::Agent;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A fresh identifier in the agent's native convention. Both dialects use a
/// UUID v4 as the session identifier proper; only Agent B additionally
/// embeds a timestamp in the filename around it.
pub fn mint_session_id(_agent: Agent) -> String {
    Uuid::new_v4().to_string()
}

/// Where a derivation of `parent_path` with identifier `new_id` should be
/// written. Agent A sessions sit beside their parent in the same per-project
/// directory; Agent B sessions go under today's `<yyyy>/<mm>/<dd>` — not the
/// parent's date — beneath the same sessions root as the parent.
pub fn derived_file_path(agent: Agent, parent_path: &Path, new_id: &str, now: DateTime<Utc>) -> PathBuf {
    match agent {
        Agent::ClaudeCode => {
            let dir = parent_path.parent().map(Path::to_path_buf).unwrap_or_default();
            dir.join(format!("{new_id}.jsonl"))
        }
        Agent::Codex => {
            let root = codex_sessions_root(parent_path);
            let day_dir = root
                .join(now.format("%Y").to_string())
                .join(now.format("%m").to_string())
                .join(now.format("%d").to_string());
            let filename = format!("rollout-{}-{new_id}.jsonl", now.format("%Y-%m-%dT%H-%M-%S"));
            day_dir.join(filename)
        }
    }
}

/// Walk up from `<root>/<yyyy>/<mm>/<dd>/rollout-....jsonl` to `<root>`.
fn codex_sessions_root(session_file: &Path) -> PathBuf {
    session_file
        .parent() // dd
        .and_then(Path::parent) // mm
        .and_then(Path::parent) // yyyy
        .and_then(Path::parent) // sessions root
        .map(Path::to_path_buf)
        .unwrap_or_else(|| session_file.parent().map(Path::to_path_buf).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claude_derivation_sits_beside_parent() {
        let parent = Path::new("/home/u/.claude/projects/foo/old-id.jsonl");
        let out = derived_file_path(Agent::ClaudeCode, parent, "new-id", Utc::now());
        assert_eq!(out, Path::new("/home/u/.claude/projects/foo/new-id.jsonl"));
    }

    #[test]
    fn codex_derivation_uses_todays_date_under_parent_root() {
        let parent = Path::new("/home/u/.codex/sessions/2025/01/02/rollout-2025-01-02T00-00-00-old.jsonl");
        let now = DateTime::parse_from_rfc3339("2026-07-27T12:00:00Z").unwrap().with_timezone(&Utc);
        let out = derived_file_path(Agent::Codex, parent, "new-id", now);
        assert_eq!(
            out,
            Path::new("/home/u/.codex/sessions/2026/07/27/rollout-2026-07-27T12-00-00-new-id.jsonl")
        );
    }
}
