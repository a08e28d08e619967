use crate::Result;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::schema::{CodexRecord, EventMsgPayload, MessageContent, ResponseItemPayload};

#[derive(Debug, Default)]
pub struct CodexHeader {
    pub session_id: Option<String>,
    pub cwd: Option<String>,
    pub git_branch: Option<String>,
    pub timestamp: Option<String>,
    pub snippet: Option<String>,
}

/// Read the first ~20 records of a Codex session file. Handles both the
/// current `response_item`-wrapped dialect and the older dialect where
/// `message`/`function_call`/`reasoning` records appear unwrapped at the
/// top level.
pub fn extract_codex_header(path: &Path) -> Result<CodexHeader> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut header = CodexHeader::default();

    for line in reader.lines().take(20).map_while(|l| l.ok()) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Ok(record) = serde_json::from_str::<CodexRecord>(line) else {
            continue;
        };

        match &record {
            CodexRecord::SessionMeta(meta) => {
                if header.session_id.is_none() {
                    header.session_id = Some(meta.payload.id.clone());
                }
                if header.cwd.is_none() {
                    header.cwd = Some(meta.payload.cwd.clone());
                }
                if header.git_branch.is_none() {
                    header.git_branch = meta
                        .payload
                        .git
                        .as_ref()
                        .and_then(|g| g.branch.clone());
                }
                if header.timestamp.is_none() {
                    header.timestamp = Some(meta.timestamp.clone());
                }
            }
            CodexRecord::TurnContext(turn) => {
                if header.cwd.is_none() {
                    header.cwd = Some(turn.payload.cwd.clone());
                }
                if header.timestamp.is_none() {
                    header.timestamp = Some(turn.timestamp.clone());
                }
            }
            CodexRecord::EventMsg(event) => {
                if header.timestamp.is_none() {
                    header.timestamp = Some(event.timestamp.clone());
                }
                if header.snippet.is_none()
                    && let EventMsgPayload::UserMessage(msg) = &event.payload
                {
                    header.snippet = Some(sessionctl_types::truncate(&msg.message, 200));
                }
            }
            CodexRecord::ResponseItem(response) => {
                if header.timestamp.is_none() {
                    header.timestamp = Some(response.timestamp.clone());
                }
                extract_snippet_from_message_payload(&response.payload, &mut header.snippet);
            }
            // Old-format unwrapped records carry no session-level timestamp
            // of their own; only a snippet can come from them.
            CodexRecord::Message(msg) if header.snippet.is_none() => {
                for c in &msg.content {
                    let text = match c {
                        MessageContent::InputText { text } | MessageContent::OutputText { text } => {
                            Some(text)
                        }
                        MessageContent::Unknown => None,
                    };
                    if let Some(t) = text
                        && msg.role == "user"
                        && !t.contains("<environment_context>")
                    {
                        header.snippet = Some(sessionctl_types::truncate(t, 200));
                        break;
                    }
                }
            }
            _ => {}
        }

        if header.session_id.is_some()
            && header.cwd.is_some()
            && header.timestamp.is_some()
            && header.snippet.is_some()
        {
            break;
        }
    }

    Ok(header)
}

fn extract_snippet_from_message_payload(payload: &ResponseItemPayload, snippet: &mut Option<String>) {
    if snippet.is_some() {
        return;
    }
    let ResponseItemPayload::Message(msg) = payload else {
        return;
    };
    if msg.role != "user" {
        return;
    }
    for c in &msg.content {
        let text = match c {
            MessageContent::InputText { text } | MessageContent::OutputText { text } => Some(text),
            MessageContent::Unknown => None,
        };
        if let Some(t) = text
            && !t.contains("<environment_context>")
        {
            *snippet = Some(sessionctl_types::truncate(t, 200));
            return;
        }
    }
}

/// A Codex session file with two or fewer lines and no recognized event is
/// treated as incomplete (e.g. the CLI was killed before writing anything).
pub fn is_empty_codex_session(path: &Path) -> bool {
    let Ok(file) = std::fs::File::open(path) else {
        return true;
    };
    let reader = BufReader::new(file);

    let mut line_count = 0;
    let mut has_event = false;
    for line in reader.lines().take(20).map_while(|l| l.ok()) {
        line_count += 1;
        if let Ok(record) = serde_json::from_str::<CodexRecord>(&line)
            && !matches!(record, CodexRecord::Unknown)
        {
            has_event = true;
            break;
        }
    }
    line_count <= 2 && !has_event
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn extracts_header_from_new_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rollout-test.jsonl");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"{{"timestamp":"2026-01-01T00:00:00Z","type":"session_meta","payload":{{"id":"sess-1","timestamp":"2026-01-01T00:00:00Z","cwd":"/tmp/proj","originator":"codex_cli","cli_version":"1.0.0","source":"cli"}}}}"#
        )
        .unwrap();

        let header = extract_codex_header(&path).unwrap();
        assert_eq!(header.session_id.as_deref(), Some("sess-1"));
        assert_eq!(header.cwd.as_deref(), Some("/tmp/proj"));
    }

    #[test]
    fn extracts_snippet_from_old_format_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rollout-old.jsonl");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"{{"type":"message","role":"user","content":[{{"type":"input_text","text":"fix the bug"}}]}}"#
        )
        .unwrap();

        let header = extract_codex_header(&path).unwrap();
        assert_eq!(header.snippet.as_deref(), Some("fix the bug"));
    }
}
