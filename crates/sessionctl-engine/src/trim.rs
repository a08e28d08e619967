//! Deterministic trim (spec §4.3.1): replace oversized tool results, and
//! optionally assistant messages, with fixed placeholder notices. A
//! derived file is written alongside the parent (or under today's Agent B
//! directory); the parent is never modified in place.

use crate::error::Result;
use crate::identity::write_derived_session;
use crate::naming::{derived_file_path, mint_session_id};
use crate::placeholders::{assistant_message_notice, truncation_notice};
use crate::store::{classify, detect_agent};
use chrono::Utc;
use sessionctl_providers::{classify_line, Classified, EventKind, ToolNameTracker};
use sessionctl_types::{Derivation, SessionRecord, TrimMetadata, TrimParams};
use serde_json::Value;
use std::collections::HashSet;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct TrimOptions {
    pub params: TrimParams,
}

#[derive(Debug, Clone)]
pub struct TrimOutcome {
    pub record: SessionRecord,
    pub tools_trimmed: usize,
    pub assistant_messages_trimmed: usize,
    pub bytes_removed: i64,
    pub estimated_tokens_saved: i64,
}

enum LineEntry {
    Classified(Classified),
    Raw(Value),
}

fn apply_notice(classified: &mut Classified, notice: &str) {
    let pointers: Vec<String> = classified.texts.iter().map(|f| f.pointer.clone()).collect();
    for pointer in pointers {
        if let Some(slot) = classified.value.pointer_mut(&pointer) {
            *slot = Value::String(notice.to_string());
        }
    }
}

fn tool_name_matches(tool_name: Option<&str>, targets: &[String]) -> bool {
    if targets.is_empty() {
        return true;
    }
    tool_name.is_some_and(|name| targets.iter().any(|t| t == name))
}

/// Replaces a tool result's content with its first `char_threshold`
/// characters followed by `notice`, unless that would not actually shrink
/// the content (spec §4.3.1 rule 4: "no negative savings"). The prefix goes
/// into the first text field; any further fields are cleared, since a
/// concatenated prefix can no longer be attributed to a single origin field.
fn apply_truncation(classified: &mut Classified, char_threshold: usize, notice: &str) -> bool {
    let original_len: usize = classified.texts.iter().map(|t| t.text.len()).sum();
    let concatenated: String = classified.texts.iter().map(|t| t.text.as_str()).collect();
    let prefix: String = concatenated.chars().take(char_threshold).collect();
    let replacement = format!("{prefix}{notice}");
    if replacement.len() >= original_len {
        return false;
    }

    let pointers: Vec<String> = classified.texts.iter().map(|f| f.pointer.clone()).collect();
    for (i, pointer) in pointers.into_iter().enumerate() {
        if let Some(slot) = classified.value.pointer_mut(&pointer) {
            *slot = Value::String(if i == 0 { replacement.clone() } else { String::new() });
        }
    }
    true
}

pub fn trim_session(path: &Path, options: &TrimOptions) -> Result<TrimOutcome> {
    let agent = detect_agent(path);
    let char_threshold = options.params.char_threshold();
    let tool_names = options.params.tool_names();

    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let mut tracker = ToolNameTracker::new();

    let mut entries: Vec<LineEntry> = Vec::new();
    for line in reader.lines().map_while(|l| l.ok()) {
        let raw = line.trim();
        if raw.is_empty() {
            continue;
        }
        match classify_line(agent, raw, &mut tracker) {
            Ok(classified) => entries.push(LineEntry::Classified(classified)),
            Err(_) => {
                if let Ok(value) = serde_json::from_str::<Value>(raw) {
                    entries.push(LineEntry::Raw(value));
                }
            }
        }
    }

    let assistant_indices: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, LineEntry::Classified(c) if c.kind == EventKind::Assistant))
        .map(|(i, _)| i)
        .collect();

    let assistant_targets: HashSet<usize> = match &options.params {
        TrimParams::ToolResultsOnly { .. } => HashSet::new(),
        TrimParams::TrimFirstAssistant { count, .. } => assistant_indices.iter().take(*count).copied().collect(),
        TrimParams::TrimAllExceptLast { keep, .. } => {
            let cut = assistant_indices.len().saturating_sub(*keep);
            assistant_indices.iter().take(cut).copied().collect()
        }
    };

    let mut tools_trimmed = 0usize;
    let mut assistant_messages_trimmed = 0usize;
    let mut bytes_removed: i64 = 0;
    let mut rendered_lines: Vec<String> = Vec::with_capacity(entries.len());

    for (idx, entry) in entries.into_iter().enumerate() {
        let mut classified = match entry {
            LineEntry::Classified(c) => c,
            LineEntry::Raw(value) => {
                rendered_lines.push(serde_json::to_string(&value)?);
                continue;
            }
        };

        let original = serde_json::to_string(&classified.value)?;
        let mut changed = false;

        if classified.kind == EventKind::ToolResult {
            let total_len = classified.text_len();
            if total_len >= char_threshold && tool_name_matches(classified.tool_name.as_deref(), tool_names) {
                let notice = truncation_notice(&path.display().to_string(), idx + 1);
                if apply_truncation(&mut classified, char_threshold, &notice) {
                    tools_trimmed += 1;
                    changed = true;
                }
            }
        } else if classified.kind == EventKind::Assistant && assistant_targets.contains(&idx) {
            let total_len = classified.text_len();
            if total_len >= char_threshold {
                let notice = assistant_message_notice(&path.display().to_string(), idx + 1);
                apply_notice(&mut classified, &notice);
                assistant_messages_trimmed += 1;
                changed = true;
            }
        }

        let rendered = serde_json::to_string(&classified.value)?;
        if changed {
            bytes_removed += original.len() as i64 - rendered.len() as i64;
        }
        rendered_lines.push(rendered);
    }

    let now = Utc::now();
    let new_id = mint_session_id(agent);
    let new_path = derived_file_path(agent, path, &new_id, now);
    let estimated_tokens_saved = (bytes_removed / 4).max(0);

    let trim_metadata = TrimMetadata {
        parent_file: path.to_string_lossy().to_string(),
        trimmed_at: now.to_rfc3339(),
        trim_params: Some(options.params.clone()),
        tools_trimmed,
        assistant_messages_trimmed,
        bytes_removed,
        estimated_tokens_saved,
    };

    write_derived_session(&new_path, agent, &new_id, &rendered_lines, "trim_metadata", &trim_metadata)?;

    let record = classify(&new_path, Some(agent))?;
    debug_assert!(matches!(record.derivation, Derivation::Trimmed(_)));
    Ok(TrimOutcome { record, tools_trimmed, assistant_messages_trimmed, bytes_removed, estimated_tokens_saved })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claude_line(uuid: &str, text: &str) -> String {
        format!(
            r#"{{"type":"user","uuid":"{uuid}","parentUuid":null,"sessionId":"orig","timestamp":"2026-01-01T00:00:00Z","cwd":"/tmp","isSidechain":false,"isMeta":false,"message":{{"role":"user","content":"{text}"}}}}"#
        )
    }

    fn claude_tool_result(uuid: &str, tool_use_id: &str, content: &str) -> String {
        format!(
            r#"{{"type":"user","uuid":"{uuid}","parentUuid":null,"sessionId":"orig","timestamp":"2026-01-01T00:00:01Z","isSidechain":false,"isMeta":false,"message":{{"role":"user","content":[{{"type":"tool_result","tool_use_id":"{tool_use_id}","content":"{content}"}}]}}}}"#
        )
    }

    fn claude_tool_use(uuid: &str, tool_use_id: &str, name: &str) -> String {
        format!(
            r#"{{"type":"assistant","uuid":"{uuid}","parentUuid":null,"sessionId":"orig","timestamp":"2026-01-01T00:00:02Z","isSidechain":false,"message":{{"id":"m1","role":"assistant","model":"x","content":[{{"type":"tool_use","id":"{tool_use_id}","name":"{name}","input":{{}}}}]}}}}"#
        )
    }

    #[test]
    fn replaces_oversized_tool_result_and_rewrites_identity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orig.jsonl");
        let big = "x".repeat(600);
        let lines = vec![claude_line("u1", "go"), claude_tool_use("u2", "call-1", "Bash"), claude_tool_result("u3", "call-1", &big)];
        std::fs::write(&path, lines.join("\n") + "\n").unwrap();

        let outcome =
            trim_session(&path, &TrimOptions { params: TrimParams::ToolResultsOnly { char_threshold: 500, tool_names: Vec::new() } })
                .unwrap();

        assert_eq!(outcome.tools_trimmed, 1);
        assert_eq!(outcome.assistant_messages_trimmed, 0);
        assert!(outcome.bytes_removed > 0);
        assert_ne!(outcome.record.session_id, "orig");

        let written = std::fs::read_to_string(&outcome.record.file_path).unwrap();
        let prefix = "x".repeat(500);
        assert!(written.contains(&prefix));
        assert!(written.contains("truncated by trim"));
        assert!(written.contains(&outcome.record.session_id));
        assert!(!written.contains(&big));
    }

    #[test]
    fn tool_name_outside_target_set_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orig.jsonl");
        let big = "x".repeat(600);
        let lines = vec![claude_line("u1", "go"), claude_tool_use("u2", "call-1", "Bash"), claude_tool_result("u3", "call-1", &big)];
        std::fs::write(&path, lines.join("\n") + "\n").unwrap();

        let outcome = trim_session(
            &path,
            &TrimOptions { params: TrimParams::ToolResultsOnly { char_threshold: 500, tool_names: vec!["Read".to_string()] } },
        )
        .unwrap();

        assert_eq!(outcome.tools_trimmed, 0);
        assert_eq!(outcome.bytes_removed, 0);
    }

    #[test]
    fn short_over_threshold_result_never_grows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orig.jsonl");
        // Just over the threshold: the notice text is longer than what a
        // truncated prefix would save, so the original must be kept as-is.
        let content = "y".repeat(21);
        let lines = vec![claude_line("u1", "go"), claude_tool_use("u2", "call-1", "Bash"), claude_tool_result("u3", "call-1", &content)];
        std::fs::write(&path, lines.join("\n") + "\n").unwrap();

        let outcome =
            trim_session(&path, &TrimOptions { params: TrimParams::ToolResultsOnly { char_threshold: 20, tool_names: Vec::new() } })
                .unwrap();

        assert_eq!(outcome.tools_trimmed, 0);
        assert_eq!(outcome.bytes_removed, 0);
        let written = std::fs::read_to_string(&outcome.record.file_path).unwrap();
        assert!(written.contains(&content));
    }

    #[test]
    fn small_tool_results_are_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orig.jsonl");
        let lines = vec![claude_line("u1", "go"), claude_tool_use("u2", "call-1", "Bash"), claude_tool_result("u3", "call-1", "ok")];
        std::fs::write(&path, lines.join("\n") + "\n").unwrap();

        let outcome =
            trim_session(&path, &TrimOptions { params: TrimParams::ToolResultsOnly { char_threshold: 500, tool_names: Vec::new() } })
                .unwrap();
        assert_eq!(outcome.tools_trimmed, 0);
        assert_eq!(outcome.bytes_removed, 0);
    }
}
