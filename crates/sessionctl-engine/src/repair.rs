//! Identity repair (spec §9, resolved per SPEC_FULL.md REDESIGN FLAGS):
//! force every embedded session-id field in a file back into agreement
//! with its filename. Idempotent, and scoped to the target file alone —
//! descendants' parent pointers are left untouched, since a parent's own
//! identity fields are the only thing `repair` is chartered to fix.

use crate::error::Result;
use crate::store::detect_agent;
use regex::Regex;
use sessionctl_providers::{rewrite_session_id, session_id_pointers};
use sessionctl_types::Agent;
use serde_json::Value;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct RepairReport {
    pub path: PathBuf,
    pub previous_session_id: String,
    pub corrected_session_id: String,
    pub fields_rewritten: usize,
    pub changed: bool,
}

pub fn repair_session(path: &Path) -> Result<RepairReport> {
    let agent = detect_agent(path);
    let expected_id = expected_session_id(agent, path);

    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let raw_lines: Vec<String> =
        reader.lines().map_while(|l| l.ok()).map(|l| l.trim().to_string()).filter(|l| !l.is_empty()).collect();

    let previous_session_id = raw_lines
        .first()
        .and_then(|l| serde_json::from_str::<Value>(l).ok())
        .and_then(|v| session_id_pointers(agent).iter().find_map(|p| v.pointer(p).and_then(Value::as_str).map(str::to_string)))
        .unwrap_or_else(|| expected_id.clone());

    let mut fields_rewritten = 0usize;
    let mut rendered_lines = Vec::with_capacity(raw_lines.len());
    for raw in &raw_lines {
        let Ok(mut value) = serde_json::from_str::<Value>(raw) else {
            rendered_lines.push(raw.clone());
            continue;
        };

        let mismatched = session_id_pointers(agent)
            .iter()
            .any(|pointer| value.pointer(pointer).and_then(Value::as_str).is_some_and(|id| id != expected_id));

        if mismatched {
            rewrite_session_id(agent, &mut value, &expected_id);
            fields_rewritten += 1;
        }
        rendered_lines.push(serde_json::to_string(&value)?);
    }

    let changed = fields_rewritten > 0;
    if changed {
        let mut file = std::fs::File::create(path)?;
        for line in &rendered_lines {
            writeln!(file, "{line}")?;
        }
    }

    Ok(RepairReport { path: path.to_path_buf(), previous_session_id, corrected_session_id: expected_id, fields_rewritten, changed })
}

/// The identity a file's filename says it should carry. Agent A files are
/// named `<id>.jsonl`; Agent B embeds the id as the trailing UUID of a
/// `rollout-<timestamp>-<uuid>.jsonl` stem.
fn expected_session_id(agent: Agent, path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    match agent {
        Agent::ClaudeCode => stem.to_string(),
        Agent::Codex => {
            let uuid_re = Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$").unwrap();
            uuid_re.find(stem).map(|m| m.as_str().to_string()).unwrap_or_else(|| stem.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_mismatched_session_id_to_match_filename() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("correct-id.jsonl");
        std::fs::write(
            &path,
            r#"{"type":"user","uuid":"u1","parentUuid":null,"sessionId":"stale-id","timestamp":"2026-01-01T00:00:00Z","isSidechain":false,"isMeta":false,"message":{"role":"user","content":"hi"}}
"#,
        )
        .unwrap();

        let report = repair_session(&path).unwrap();
        assert!(report.changed);
        assert_eq!(report.previous_session_id, "stale-id");
        assert_eq!(report.corrected_session_id, "correct-id");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("correct-id"));
        assert!(!contents.contains("stale-id"));
    }

    #[test]
    fn repair_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("correct-id.jsonl");
        std::fs::write(
            &path,
            r#"{"type":"user","uuid":"u1","parentUuid":null,"sessionId":"correct-id","timestamp":"2026-01-01T00:00:00Z","isSidechain":false,"isMeta":false,"message":{"role":"user","content":"hi"}}
"#,
        )
        .unwrap();

        let report = repair_session(&path).unwrap();
        assert!(!report.changed);
        assert_eq!(report.fields_rewritten, 0);
    }
}
