//! Clone (spec §4.3.4): "trim with no trims applied" — a derived copy with
//! a fresh identity and lineage pointer, but byte-for-byte identical
//! conversational content. Useful for branching a conversation without
//! mutating the original.

use crate::error::Result;
use crate::identity::write_derived_session;
use crate::naming::{derived_file_path, mint_session_id};
use crate::store::{classify, detect_agent};
use chrono::Utc;
use sessionctl_types::{SessionRecord, TrimMetadata};
use std::io::{BufRead, BufReader};
use std::path::Path;

pub fn clone_session(path: &Path) -> Result<SessionRecord> {
    let agent = detect_agent(path);

    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let lines: Vec<String> =
        reader.lines().map_while(|l| l.ok()).map(|l| l.trim().to_string()).filter(|l| !l.is_empty()).collect();

    let now = Utc::now();
    let new_id = mint_session_id(agent);
    let new_path = derived_file_path(agent, path, &new_id, now);

    let trim_metadata = TrimMetadata {
        parent_file: path.to_string_lossy().to_string(),
        trimmed_at: now.to_rfc3339(),
        trim_params: None,
        tools_trimmed: 0,
        assistant_messages_trimmed: 0,
        bytes_removed: 0,
        estimated_tokens_saved: 0,
    };

    write_derived_session(&new_path, agent, &new_id, &lines, "trim_metadata", &trim_metadata)?;

    classify(&new_path, Some(agent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_preserves_content_with_new_identity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orig.jsonl");
        std::fs::write(
            &path,
            r#"{"type":"user","uuid":"u1","parentUuid":null,"sessionId":"orig","timestamp":"2026-01-01T00:00:00Z","cwd":"/tmp","isSidechain":false,"isMeta":false,"message":{"role":"user","content":"hello"}}
"#,
        )
        .unwrap();

        let record = clone_session(&path).unwrap();
        assert_ne!(record.session_id, "orig");
        assert_eq!(record.line_count, 1);
        assert_eq!(record.first_user_message_preview.as_deref(), Some("hello"));
    }
}
