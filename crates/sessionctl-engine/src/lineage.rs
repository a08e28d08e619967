//! Lineage graph (spec §4.2): walking derivation edges forward and
//! backward. Trim and continuation both record a parent pointer in the
//! child file; nothing on disk indexes the reverse edge, so `descendants`
//! and `full_chain` require a store scan.

use crate::error::Result;
use crate::store::{classify, discover, StoreContext};
use sessionctl_types::{Derivation, SessionFilter, SessionRecord};
use std::collections::HashSet;
use std::path::PathBuf;

fn parent_path_of(record: &SessionRecord) -> Option<PathBuf> {
    record.parent_file().map(PathBuf::from)
}

/// Walk from `record` up to (but not including) the root, following
/// `trim_metadata`/`continue_metadata` parent pointers. Returns ancestors
/// nearest-first. Guards against cycles with a visited-path set: lineage is
/// meant to be a forest, but a hand-edited file could claim an ancestor
/// that loops back on itself.
pub fn ancestors(record: &SessionRecord) -> Result<Vec<SessionRecord>> {
    let mut chain = Vec::new();
    let mut visited: HashSet<PathBuf> = HashSet::new();
    visited.insert(record.file_path.clone());

    let mut current = record.clone();
    while let Some(parent_path) = parent_path_of(&current) {
        if !parent_path.is_file() || !visited.insert(parent_path.clone()) {
            break;
        }
        let parent = classify(&parent_path, None)?;
        chain.push(parent.clone());
        current = parent;
    }
    Ok(chain)
}

/// The root of `record`'s derivation chain: the first ancestor with
/// `Derivation::Original`, or `record` itself if it already is one.
pub fn original_of(record: &SessionRecord) -> Result<SessionRecord> {
    let chain = ancestors(record)?;
    Ok(chain.into_iter().last().unwrap_or_else(|| record.clone()))
}

/// Every session in the store whose derivation points directly at
/// `record`. Includes sidechains, since a sidechain can itself be trimmed.
pub fn descendants(ctx: &StoreContext, record: &SessionRecord) -> Result<Vec<SessionRecord>> {
    let filter = SessionFilter { include_sidechain: true, ..SessionFilter::default() };
    let all = discover(ctx, &filter)?;
    let target = record.file_path.to_string_lossy().into_owned();
    Ok(all.into_iter().filter(|candidate| candidate.parent_file() == Some(target.as_str())).collect())
}

/// One entry in a flattened lineage tree (`full_chain`): `depth` is
/// distance from the original, which sits at depth 0.
#[derive(Debug, Clone)]
pub struct ChainNode {
    pub record: SessionRecord,
    pub depth: usize,
}

/// The complete lineage reachable from `record`: its ancestors up to the
/// original, the original itself, and every descendant reachable from any
/// node in that chain, depth-first.
pub fn full_chain(ctx: &StoreContext, record: &SessionRecord) -> Result<Vec<ChainNode>> {
    let ancestor_chain = ancestors(record)?;
    let root = ancestor_chain.into_iter().last().unwrap_or_else(|| record.clone());

    let mut nodes = Vec::new();
    let mut visited = HashSet::new();
    walk_descendants(ctx, &root, 0, &mut nodes, &mut visited)?;
    Ok(nodes)
}

fn walk_descendants(
    ctx: &StoreContext,
    record: &SessionRecord,
    depth: usize,
    out: &mut Vec<ChainNode>,
    visited: &mut HashSet<String>,
) -> Result<()> {
    if !visited.insert(record.session_id.clone()) {
        return Ok(());
    }
    out.push(ChainNode { record: record.clone(), depth });
    for child in descendants(ctx, record)? {
        walk_descendants(ctx, &child, depth + 1, out, visited)?;
    }
    Ok(())
}

/// Only the `Continued` hops in `record`'s ancestry: where `ancestors`
/// follows every derivation edge, this isolates the "resumed from a prior
/// conversation" thread, stepping silently over any trims in between.
pub fn continuation_lineage(record: &SessionRecord) -> Result<Vec<SessionRecord>> {
    let mut chain = Vec::new();
    let mut visited: HashSet<PathBuf> = HashSet::new();
    visited.insert(record.file_path.clone());

    let mut current = record.clone();
    loop {
        let hop_is_continuation = matches!(current.derivation, Derivation::Continued(_));
        let Some(parent_path) = parent_path_of(&current) else {
            break;
        };
        if !parent_path.is_file() || !visited.insert(parent_path.clone()) {
            break;
        }
        let parent = classify(&parent_path, None)?;
        if hop_is_continuation {
            chain.push(parent.clone());
        }
        current = parent;
    }
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sessionctl_types::{Agent, ContinueMetadata, TrimMetadata};
    use chrono::Utc;

    fn base_record(id: &str, path: PathBuf, derivation: Derivation) -> SessionRecord {
        SessionRecord {
            session_id: id.to_string(),
            agent: Agent::ClaudeCode,
            file_path: path,
            cwd: None,
            git_branch: None,
            created_at: Utc::now(),
            modified_at: Utc::now(),
            line_count: 1,
            first_user_message_preview: Some("hi".to_string()),
            last_user_message_preview: Some("hi".to_string()),
            derivation,
            is_sidechain: false,
            conversational_event_count: 1,
        }
    }

    #[test]
    fn ancestors_empty_for_original() {
        let dir = tempfile::tempdir().unwrap();
        let record = base_record("a", dir.path().join("a.jsonl"), Derivation::Original);
        assert!(ancestors(&record).unwrap().is_empty());
    }

    #[test]
    fn ancestors_walks_trim_parent() {
        let dir = tempfile::tempdir().unwrap();
        let parent_path = dir.path().join("parent.jsonl");
        std::fs::write(
            &parent_path,
            r#"{"type":"user","uuid":"u1","parentUuid":null,"sessionId":"parent","timestamp":"2026-01-01T00:00:00Z","isSidechain":false,"isMeta":false,"message":{"role":"user","content":"hi"}}
"#,
        )
        .unwrap();

        let trim_meta = TrimMetadata {
            parent_file: parent_path.to_string_lossy().to_string(),
            trimmed_at: Utc::now().to_rfc3339(),
            trim_params: None,
            tools_trimmed: 0,
            assistant_messages_trimmed: 0,
            bytes_removed: 0,
            estimated_tokens_saved: 0,
        };
        let child = base_record("child", dir.path().join("child.jsonl"), Derivation::Trimmed(trim_meta));

        let chain = ancestors(&child).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].session_id, "parent");
    }

    #[test]
    fn continuation_lineage_skips_trim_hops() {
        let dir = tempfile::tempdir().unwrap();
        let parent_path = dir.path().join("parent.jsonl");
        std::fs::write(
            &parent_path,
            r#"{"type":"user","uuid":"u1","parentUuid":null,"sessionId":"parent","timestamp":"2026-01-01T00:00:00Z","isSidechain":false,"isMeta":false,"message":{"role":"user","content":"hi"}}
"#,
        )
        .unwrap();

        let trim_meta = TrimMetadata {
            parent_file: parent_path.to_string_lossy().to_string(),
            trimmed_at: Utc::now().to_rfc3339(),
            trim_params: None,
            tools_trimmed: 0,
            assistant_messages_trimmed: 0,
            bytes_removed: 0,
            estimated_tokens_saved: 0,
        };
        let child = base_record("child", dir.path().join("child.jsonl"), Derivation::Trimmed(trim_meta));
        assert!(continuation_lineage(&child).unwrap().is_empty());
    }

    #[test]
    fn continuation_lineage_includes_continued_hop() {
        let dir = tempfile::tempdir().unwrap();
        let parent_path = dir.path().join("parent.jsonl");
        std::fs::write(
            &parent_path,
            r#"{"type":"user","uuid":"u1","parentUuid":null,"sessionId":"parent","timestamp":"2026-01-01T00:00:00Z","isSidechain":false,"isMeta":false,"message":{"role":"user","content":"hi"}}
"#,
        )
        .unwrap();

        let continue_meta = ContinueMetadata {
            parent_session_id: "parent".to_string(),
            parent_session_file: parent_path.to_string_lossy().to_string(),
            continued_at: Utc::now().to_rfc3339(),
        };
        let child = base_record("child", dir.path().join("child.jsonl"), Derivation::Continued(continue_meta));

        let chain = continuation_lineage(&child).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].session_id, "parent");
    }
}
