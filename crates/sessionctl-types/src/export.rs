use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Savings reported by a trim/smart-trim derivation, surfaced in export
/// front matter as `trim_stats` when the exported session is a derived one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrimStats {
    pub tools_trimmed: usize,
    pub assistant_messages_trimmed: usize,
    pub bytes_removed: i64,
    pub estimated_tokens_saved: i64,
}

/// The YAML-style front matter prefixed to every exported session text
/// file (spec §4.6). Field order here is the field order written out,
/// which is load-bearing for export determinism (spec §8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontMatter {
    pub session_id: String,
    pub agent: String,
    pub file_path: PathBuf,
    pub project: Option<String>,
    pub branch: Option<String>,
    pub cwd: Option<String>,
    pub lines: Option<usize>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub derivation_type: Option<String>,
    pub parent_session_id: Option<String>,
    pub parent_session_file: Option<String>,
    pub original_session_id: Option<String>,
    pub trim_stats: Option<TrimStats>,
}
