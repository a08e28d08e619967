//! Connection management, document upsert, and the query operation.
//! Schema and query concerns are collapsed into one module since this
//! index has a single document shape rather than per-entity tables.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Error, Result};
use crate::ranking::recency_adjusted_score;
use crate::schema::init_schema;
use crate::snippet::build_snippet;
use sessionctl_types::{SearchDocument, SearchHit};

pub struct IndexDb {
    conn: Connection,
}

/// Parameters for a single query. An empty `query` means "most recently
/// modified", skipping full-text matching entirely.
#[derive(Debug, Clone)]
pub struct QueryParams {
    pub query: Option<String>,
    pub project: Option<String>,
    pub limit: usize,
    pub half_life_days: f64,
    pub now: DateTime<Utc>,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self { query: None, project: None, limit: 20, half_life_days: crate::ranking::DEFAULT_HALF_LIFE_DAYS, now: Utc::now() }
    }
}

impl IndexDb {
    pub fn open(path: &std::path::Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Replaces any existing document for this session id. FTS5 virtual
    /// tables have no primary key to upsert against, so this deletes the
    /// old row (if any) before inserting the new one.
    pub fn upsert(&mut self, doc: &SearchDocument) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM documents WHERE session_id = ?1", params![doc.session_id])?;
        tx.execute(
            "INSERT INTO documents (
                session_id, agent, project, branch, cwd, created, modified, lines,
                export_path, first_msg_role, first_msg_content, last_msg_role,
                last_msg_content, derivation_type, is_sidechain, content
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16)",
            params![
                doc.session_id,
                doc.agent,
                doc.project,
                doc.branch,
                doc.cwd,
                doc.created.map(|c| c.to_rfc3339()),
                doc.modified.to_rfc3339(),
                doc.lines as i64,
                doc.export_path,
                doc.first_msg_role,
                doc.first_msg_content,
                doc.last_msg_role,
                doc.last_msg_content,
                doc.derivation_type,
                doc.is_sidechain as i64,
                doc.content,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn remove(&mut self, session_id: &str) -> Result<()> {
        self.conn.execute("DELETE FROM documents WHERE session_id = ?1", params![session_id])?;
        Ok(())
    }

    pub fn all_session_ids(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT session_id FROM documents")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    pub fn contains(&self, session_id: &str) -> Result<bool> {
        let found: Option<i64> =
            self.conn.query_row("SELECT 1 FROM documents WHERE session_id = ?1", params![session_id], |row| row.get(0)).optional()?;
        Ok(found.is_some())
    }

    pub fn query(&self, params: &QueryParams) -> Result<Vec<SearchHit>> {
        match &params.query {
            None => self.query_recent(params),
            Some(q) if q.trim().is_empty() => self.query_recent(params),
            Some(q) => self.query_matched(q, params),
        }
    }

    fn query_recent(&self, params: &QueryParams) -> Result<Vec<SearchHit>> {
        let sql = "SELECT session_id, agent, project, branch, cwd, created, modified, lines,
                          export_path, first_msg_role, first_msg_content, last_msg_role,
                          last_msg_content, derivation_type, is_sidechain, content
                   FROM documents
                   WHERE (?1 IS NULL OR project = ?1)
                   ORDER BY modified DESC
                   LIMIT ?2";
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(rusqlite::params![params.project, params.limit as i64], row_to_document)?;

        let mut hits = Vec::new();
        for row in rows {
            let doc = row?;
            hits.push(SearchHit { raw_score: 0.0, final_score: 0.0, snippet: first_line_preview(&doc), document: doc });
        }
        Ok(hits)
    }

    fn query_matched(&self, query: &str, params: &QueryParams) -> Result<Vec<SearchHit>> {
        let fetch_n = (params.limit * 2).max(params.limit);
        let sql = "SELECT session_id, agent, project, branch, cwd, created, modified, lines,
                          export_path, first_msg_role, first_msg_content, last_msg_role,
                          last_msg_content, derivation_type, is_sidechain, content, bm25(documents) AS rank
                   FROM documents
                   WHERE documents MATCH ?1 AND (?2 IS NULL OR project = ?2)
                   ORDER BY rank
                   LIMIT ?3";
        let mut stmt = self.conn.prepare(sql).map_err(|err| Error::Query(err.to_string()))?;
        let rows = stmt.query_map(rusqlite::params![query, params.project, fetch_n as i64], |row| {
            let doc = row_to_document(row)?;
            let bm25_rank: f64 = row.get(16)?;
            Ok((doc, bm25_rank))
        })?;

        let mut hits = Vec::new();
        for row in rows {
            let (doc, bm25_rank) = row?;
            // rusqlite's bm25() follows SQLite's convention: lower is more
            // relevant. Negate so higher is better, matching every other
            // score in this module.
            let raw_score = -bm25_rank;
            let age_seconds = (params.now - doc.modified).num_seconds().max(0) as f64;
            let final_score = recency_adjusted_score(raw_score, age_seconds, params.half_life_days);
            let snippet = build_snippet(&doc.content, query);
            hits.push(SearchHit { document: doc, raw_score, final_score, snippet });
        }
        hits.sort_by(|a, b| b.final_score.partial_cmp(&a.final_score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(params.limit);
        Ok(hits)
    }
}

fn row_to_document(row: &rusqlite::Row) -> rusqlite::Result<SearchDocument> {
    let created: Option<String> = row.get(5)?;
    let modified: String = row.get(6)?;
    Ok(SearchDocument {
        session_id: row.get(0)?,
        agent: row.get(1)?,
        project: row.get(2)?,
        branch: row.get(3)?,
        cwd: row.get(4)?,
        created: created.and_then(|c| DateTime::parse_from_rfc3339(&c).ok()).map(|c| c.with_timezone(&Utc)),
        modified: DateTime::parse_from_rfc3339(&modified).map(|m| m.with_timezone(&Utc)).unwrap_or_else(|_| Utc::now()),
        lines: row.get::<_, i64>(7)? as usize,
        export_path: row.get(8)?,
        first_msg_role: row.get(9)?,
        first_msg_content: row.get(10)?,
        last_msg_role: row.get(11)?,
        last_msg_content: row.get(12)?,
        derivation_type: row.get(13)?,
        is_sidechain: row.get::<_, i64>(14)? != 0,
        content: row.get(15)?,
    })
}

fn first_line_preview(doc: &SearchDocument) -> String {
    doc.first_msg_content.clone().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_doc(session_id: &str, modified: DateTime<Utc>, content: &str) -> SearchDocument {
        SearchDocument {
            session_id: session_id.to_string(),
            agent: "claude-code".to_string(),
            project: Some("sessionctl".to_string()),
            branch: Some("main".to_string()),
            cwd: Some("/home/u/sessionctl".to_string()),
            created: Some(modified),
            modified,
            lines: 10,
            export_path: format!("/exports/{session_id}.txt"),
            first_msg_role: Some("user".to_string()),
            first_msg_content: Some("hello".to_string()),
            last_msg_role: Some("assistant".to_string()),
            last_msg_content: Some("done".to_string()),
            derivation_type: "original".to_string(),
            is_sidechain: false,
            content: content.to_string(),
        }
    }

    #[test]
    fn upsert_then_contains() {
        let mut db = IndexDb::open_in_memory().unwrap();
        let doc = sample_doc("s1", Utc::now(), "hello world");
        db.upsert(&doc).unwrap();
        assert!(db.contains("s1").unwrap());
    }

    #[test]
    fn upsert_replaces_rather_than_duplicates() {
        let mut db = IndexDb::open_in_memory().unwrap();
        db.upsert(&sample_doc("s1", Utc::now(), "first body")).unwrap();
        db.upsert(&sample_doc("s1", Utc::now(), "second body")).unwrap();

        let hits = db.query(&QueryParams { query: Some("second".to_string()), ..Default::default() }).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].document.content.contains("second body"));
    }

    #[test]
    fn empty_query_returns_most_recently_modified_first() {
        let mut db = IndexDb::open_in_memory().unwrap();
        let now = Utc::now();
        db.upsert(&sample_doc("old", now - Duration::days(10), "old session")).unwrap();
        db.upsert(&sample_doc("new", now, "new session")).unwrap();

        let hits = db.query(&QueryParams::default()).unwrap();
        assert_eq!(hits[0].document.session_id, "new");
    }

    #[test]
    fn full_text_match_finds_term_in_content() {
        let mut db = IndexDb::open_in_memory().unwrap();
        db.upsert(&sample_doc("a", Utc::now(), "discussing the rollout plan")).unwrap();
        db.upsert(&sample_doc("b", Utc::now(), "unrelated chatter")).unwrap();

        let hits = db.query(&QueryParams { query: Some("rollout".to_string()), ..Default::default() }).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.session_id, "a");
        assert!(hits[0].snippet.contains("rollout"));
    }

    #[test]
    fn project_filter_excludes_other_projects() {
        let mut db = IndexDb::open_in_memory().unwrap();
        let mut other = sample_doc("b", Utc::now(), "rollout notes");
        other.project = Some("other-repo".to_string());
        db.upsert(&sample_doc("a", Utc::now(), "rollout notes")).unwrap();
        db.upsert(&other).unwrap();

        let hits = db
            .query(&QueryParams { query: Some("rollout".to_string()), project: Some("sessionctl".to_string()), ..Default::default() })
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.session_id, "a");
    }

    #[test]
    fn recent_match_outranks_older_better_match_within_half_life() {
        let mut db = IndexDb::open_in_memory().unwrap();
        let now = Utc::now();
        // "rollout rollout rollout" gets a stronger bm25 score than a single
        // mention, but ages out past several half-lives.
        db.upsert(&sample_doc("stale", now - Duration::days(60), "rollout rollout rollout plan")).unwrap();
        db.upsert(&sample_doc("fresh", now, "a quick rollout mention")).unwrap();

        let hits = db.query(&QueryParams { query: Some("rollout".to_string()), ..Default::default() }).unwrap();
        assert_eq!(hits[0].document.session_id, "fresh");
    }
}
