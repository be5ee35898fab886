use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::path::Path;
use std::sync::Mutex;

use super::database;

pub const HISTORY_SEPARATOR: char = '#';

/// Local record of finished uploads, keyed by a packed
/// `provider#token#file` identifier.
pub trait History: Send + Sync {
    fn pack_file_name(&self, provider: &str, delete_token: &str, file_name: &str) -> String {
        pack_file_name(provider, delete_token, file_name)
    }

    fn save(&self, image_data: &[u8], packed_name: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryFileName {
    pub provider: String,
    pub delete_token: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub packed_name: String,
    pub provider: String,
    pub delete_token: String,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

/// The separator is replaced with `_` inside each part so that every
/// packed name unpacks back into the same fields.
pub fn pack_file_name(provider: &str, delete_token: &str, file_name: &str) -> String {
    let mut packed = strip_separator(provider);
    if !delete_token.is_empty() {
        packed.push(HISTORY_SEPARATOR);
        packed.push_str(&strip_separator(delete_token));
    }
    packed.push(HISTORY_SEPARATOR);
    packed.push_str(&strip_separator(file_name));
    packed
}

fn strip_separator(part: &str) -> String {
    part.replace(HISTORY_SEPARATOR, "_")
}

pub fn unpack_file_name(packed_name: &str) -> HistoryFileName {
    // Entries listed from disk may still carry their directory
    let name = match packed_name.rfind('/') {
        Some(idx) => &packed_name[idx + 1..],
        None => packed_name,
    };

    // Anything past the second separator belongs to the file name
    let parts: Vec<&str> = name.splitn(3, HISTORY_SEPARATOR).collect();
    match parts.as_slice() {
        [provider, token, file] => HistoryFileName {
            provider: provider.to_string(),
            delete_token: token.to_string(),
            file_name: file.to_string(),
        },
        [provider, file] => HistoryFileName {
            provider: provider.to_string(),
            delete_token: String::new(),
            file_name: file.to_string(),
        },
        _ => HistoryFileName {
            provider: String::new(),
            delete_token: String::new(),
            file_name: parts.first().map(|s| s.to_string()).unwrap_or_default(),
        },
    }
}

pub struct SqliteHistory {
    conn: Mutex<Connection>,
    limit: usize, // 0 disables trimming
}

impl SqliteHistory {
    pub fn open(db_path: &Path, limit: usize) -> Result<Self> {
        let conn = database::open(db_path)?;
        Ok(Self {
            conn: Mutex::new(conn),
            limit,
        })
    }

    pub fn in_memory(limit: usize) -> Result<Self> {
        let conn = database::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
            limit,
        })
    }

    fn connection(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("History database lock poisoned"))
    }

    /// Entries newest first.
    pub fn list(&self) -> Result<Vec<HistoryEntry>> {
        let conn = self.connection()?;

        let mut stmt = conn.prepare(
            "SELECT id, packed_name, provider, delete_token, file_name, created_at
             FROM upload_history
             ORDER BY created_at DESC, id DESC",
        )?;

        let entry_iter = stmt.query_map([], |row| {
            Ok(HistoryEntry {
                id: row.get(0)?,
                packed_name: row.get(1)?,
                provider: row.get(2)?,
                delete_token: row.get(3)?,
                file_name: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;

        let mut entries = Vec::new();
        for entry in entry_iter {
            entries.push(entry?);
        }

        Ok(entries)
    }

    pub fn get(&self, packed_name: &str) -> Result<Option<HistoryEntry>> {
        let conn = self.connection()?;

        let entry = conn
            .query_row(
                "SELECT id, packed_name, provider, delete_token, file_name, created_at
                 FROM upload_history
                 WHERE packed_name = ?1
                 ORDER BY id DESC
                 LIMIT 1",
                params![packed_name],
                |row| {
                    Ok(HistoryEntry {
                        id: row.get(0)?,
                        packed_name: row.get(1)?,
                        provider: row.get(2)?,
                        delete_token: row.get(3)?,
                        file_name: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                },
            )
            .optional()?;

        Ok(entry)
    }

    pub fn load_image(&self, packed_name: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.connection()?;

        let data = conn
            .query_row(
                "SELECT image_data FROM upload_history
                 WHERE packed_name = ?1
                 ORDER BY id DESC
                 LIMIT 1",
                params![packed_name],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;

        Ok(data)
    }

    /// Returns the number of rows removed.
    pub fn remove(&self, packed_name: &str) -> Result<usize> {
        let conn = self.connection()?;

        let removed = conn.execute(
            "DELETE FROM upload_history WHERE packed_name = ?1",
            params![packed_name],
        )?;

        Ok(removed)
    }

    fn trim(&self, conn: &Connection) -> Result<()> {
        if self.limit == 0 {
            return Ok(());
        }

        let removed = conn.execute(
            "DELETE FROM upload_history
             WHERE id NOT IN (
                 SELECT id FROM upload_history
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?1
             )",
            params![self.limit as i64],
        )?;

        if removed > 0 {
            log::debug!("Trimmed {} old history entries", removed);
        }

        Ok(())
    }
}

impl History for SqliteHistory {
    fn save(&self, image_data: &[u8], packed_name: &str) -> Result<()> {
        let conn = self.connection()?;
        let unpacked = unpack_file_name(packed_name);

        conn.execute(
            "INSERT INTO upload_history
             (packed_name, provider, delete_token, file_name, image_data, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                packed_name,
                unpacked.provider,
                unpacked.delete_token,
                unpacked.file_name,
                image_data,
                Utc::now()
            ],
        )?;

        self.trim(&conn)?;
        log::info!("Saved {} to upload history", packed_name);

        Ok(())
    }
}
