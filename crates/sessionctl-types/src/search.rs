use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One document in the search index (spec §4.7). `content` carries the
/// full exported body and is the only field the full-text analyzer runs
/// over; every other field is stored verbatim for retrieval/filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDocument {
    pub session_id: String,
    pub agent: String,
    pub project: Option<String>,
    pub branch: Option<String>,
    pub cwd: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub modified: DateTime<Utc>,
    pub lines: usize,
    pub export_path: String,
    pub first_msg_role: Option<String>,
    pub first_msg_content: Option<String>,
    pub last_msg_role: Option<String>,
    pub last_msg_content: Option<String>,
    pub derivation_type: String,
    pub is_sidechain: bool,
    pub content: String,
}

/// One ranked hit, as returned by a query (spec §4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub document: SearchDocument,
    pub raw_score: f64,
    pub final_score: f64,
    pub snippet: String,
}
