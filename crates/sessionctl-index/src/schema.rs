use rusqlite::Connection;

use crate::error::Result;

// Bump when the table/virtual-table definitions below change shape; a
// mismatch wipes and recreates everything rather than migrating in place
// (the index is a disposable cache over the session store, never itself
// the source of truth).
pub const SCHEMA_VERSION: i32 = 1;

pub fn init_schema(conn: &Connection) -> Result<()> {
    let current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current_version != SCHEMA_VERSION {
        drop_all_tables(conn)?;
    }

    conn.execute_batch(
        r#"
        CREATE VIRTUAL TABLE IF NOT EXISTS documents USING fts5(
            session_id UNINDEXED,
            agent UNINDEXED,
            project UNINDEXED,
            branch UNINDEXED,
            cwd UNINDEXED,
            created UNINDEXED,
            modified UNINDEXED,
            lines UNINDEXED,
            export_path UNINDEXED,
            first_msg_role UNINDEXED,
            first_msg_content,
            last_msg_role UNINDEXED,
            last_msg_content,
            derivation_type UNINDEXED,
            is_sidechain UNINDEXED,
            content,
            tokenize = 'porter'
        );
        "#,
    )?;

    conn.execute(&format!("PRAGMA user_version = {SCHEMA_VERSION}"), [])?;

    Ok(())
}

fn drop_all_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch("DROP TABLE IF EXISTS documents;")?;
    Ok(())
}
