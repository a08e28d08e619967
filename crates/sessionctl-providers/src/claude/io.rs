use crate::Result;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::schema::ClaudeRecord;

#[derive(Debug, Default)]
pub struct ClaudeHeader {
    pub session_id: Option<String>,
    pub cwd: Option<String>,
    pub git_branch: Option<String>,
    pub timestamp: Option<String>,
    pub snippet: Option<String>,
    pub is_sidechain: bool,
}

/// Read the first ~200 lines of a Claude Code session file to recover
/// enough identity fields to register the session without reconstructing
/// the full conversation.
///
/// Mirrors `trim_session.py`'s walk over `is_meta`/`parent_uuid` chains: a
/// meta message (and anything descending from one) is skipped when looking
/// for the headline snippet, since meta messages are synthetic
/// (slash-command expansions, etc.) rather than things the user actually
/// typed.
pub fn extract_claude_header(path: &Path) -> Result<ClaudeHeader> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut header = ClaudeHeader::default();
    let mut meta_message_ids = std::collections::HashSet::new();

    for line in reader.lines().take(200).map_while(|l| l.ok()) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Ok(record) = serde_json::from_str::<ClaudeRecord>(line) else {
            continue;
        };

        match &record {
            ClaudeRecord::FileHistorySnapshot(_) => {
                meta_message_ids.clear();
            }
            ClaudeRecord::User(user) => {
                if header.session_id.is_none() {
                    header.session_id = Some(user.session_id.clone());
                }
                if header.cwd.is_none() {
                    header.cwd = user.cwd.clone();
                }
                if header.git_branch.is_none() {
                    header.git_branch = user.git_branch.clone();
                }
                if header.timestamp.is_none() {
                    header.timestamp = Some(user.timestamp.clone());
                }

                if user.is_meta {
                    meta_message_ids.insert(user.uuid.clone());
                }
                let parent_is_meta = user
                    .parent_uuid
                    .as_ref()
                    .is_some_and(|p| meta_message_ids.contains(p));
                if parent_is_meta {
                    meta_message_ids.insert(user.uuid.clone());
                }

                if header.snippet.is_none() && !user.is_sidechain && !user.is_meta && !parent_is_meta {
                    header.snippet = user.message.content.iter().find_map(|c| match c {
                        super::schema::UserContent::Text { text } => {
                            Some(sessionctl_types::truncate(text, 200))
                        }
                        _ => None,
                    });
                }
                header.is_sidechain = user.is_sidechain;
            }
            ClaudeRecord::Assistant(asst) => {
                if header.session_id.is_none() {
                    header.session_id = Some(asst.session_id.clone());
                }
                if header.cwd.is_none() {
                    header.cwd = asst.cwd.clone();
                }
                if header.git_branch.is_none() {
                    header.git_branch = asst.git_branch.clone();
                }
                if header.timestamp.is_none() {
                    header.timestamp = Some(asst.timestamp.clone());
                }
            }
            ClaudeRecord::Unknown => {}
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

/// A Claude Code session file is considered empty/garbage if it has no
/// user or assistant records at all (e.g. a truncated write).
pub fn is_empty_claude_session(path: &Path) -> bool {
    let Ok(file) = std::fs::File::open(path) else {
        return true;
    };
    let reader = BufReader::new(file);
    for line in reader.lines().take(20).map_while(|l| l.ok()) {
        if let Ok(record) = serde_json::from_str::<ClaudeRecord>(&line)
            && matches!(record, ClaudeRecord::User(_) | ClaudeRecord::Assistant(_))
        {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn extracts_header_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"{{"type":"user","uuid":"u1","parentUuid":null,"sessionId":"abc-123","timestamp":"2026-01-01T00:00:00Z","cwd":"/tmp/proj","gitBranch":"main","isSidechain":false,"isMeta":false,"message":{{"role":"user","content":"hello there"}}}}"#
        )
        .unwrap();

        let header = extract_claude_header(&path).unwrap();
        assert_eq!(header.session_id.as_deref(), Some("abc-123"));
        assert_eq!(header.cwd.as_deref(), Some("/tmp/proj"));
        assert_eq!(header.snippet.as_deref(), Some("hello there"));
        assert!(!header.is_sidechain);
    }
}
