use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

pub fn open(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::error!("Failed to create history directory at {:?}: {}", parent, e);
                return Err(anyhow::anyhow!("Failed to create history directory: {}", e));
            }
        }
    }

    log::debug!("Opening history database at {:?}", db_path);
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open history database at {:?}", db_path))?;
    init(&conn)?;

    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init(&conn)?;
    Ok(conn)
}

fn init(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS upload_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            packed_name TEXT NOT NULL,
            provider TEXT NOT NULL,
            delete_token TEXT NOT NULL,
            file_name TEXT NOT NULL,
            image_data BLOB NOT NULL,
            created_at DATETIME NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_upload_history_packed_name
         ON upload_history (packed_name)",
        [],
    )?;

    Ok(())
}
