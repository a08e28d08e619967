//! Shared identity-rewrite and derived-file-write plumbing used by trim,
//! smart-trim, and clone (spec §4.3 rule: filename stem, session id, and
//! every embedded session-id field agree after a derivation).

use crate::error::Result;
use sessionctl_providers::rewrite_session_id;
use sessionctl_types::Agent;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::path::Path;

/// Rewrite every embedded session-id field in `lines` to `new_id`, inject
/// `metadata` under `metadata_key` into the first line's top-level object,
/// and write the result to `path` (creating parent directories as needed).
pub fn write_derived_session<M: Serialize>(
    path: &Path,
    agent: Agent,
    new_id: &str,
    lines: &[String],
    metadata_key: &str,
    metadata: &M,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(path)?;
    for (idx, raw) in lines.iter().enumerate() {
        let mut value: Value = serde_json::from_str(raw)?;
        rewrite_session_id(agent, &mut value, new_id);
        if idx == 0 && let Value::Object(map) = &mut value {
            map.insert(metadata_key.to_string(), serde_json::to_value(metadata)?);
        }
        writeln!(file, "{}", serde_json::to_string(&value)?)?;
    }
    Ok(())
}
