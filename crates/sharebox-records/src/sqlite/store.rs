//! SQLite record store

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};

use super::schema::init_schema;
use crate::collection::Collection;
use crate::error::{RecordError, RecordResult};
use crate::query::Query;
use crate::store::{Record, RecordStore, assign_key, check_update_fields};

/// SQLite-backed record store
///
/// Records are stored as JSON bodies; exact-match queries are evaluated after
/// loading a collection in insertion order.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    /// Open or create a database at the given path
    pub fn open(path: impl AsRef<Path>) -> RecordResult<Self> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> RecordResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> RecordResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RecordError::Storage("connection lock poisoned".into()))
    }
}

fn load_body(
    conn: &Connection,
    collection: Collection,
    key: &str,
) -> RecordResult<Option<Record>> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body FROM records WHERE collection = ? AND record_key = ?",
            (collection.as_str(), key),
            |row| row.get(0),
        )
        .optional()?;

    match body {
        Some(body) => Ok(Some(serde_json::from_str(&body)?)),
        None => Ok(None),
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn insert(&self, collection: Collection, record: Record) -> RecordResult<Record> {
        let (key, record) = assign_key(record)?;
        let body = serde_json::to_string(&record)?;

        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO records (collection, record_key, body) VALUES (?, ?, ?)",
            (collection.as_str(), &key, &body),
        )?;

        if inserted == 0 {
            return Err(RecordError::AlreadyExists { collection, key });
        }
        Ok(record)
    }

    async fn get(&self, collection: Collection, key: &str) -> RecordResult<Option<Record>> {
        let conn = self.lock()?;
        load_body(&conn, collection, key)
    }

    async fn fetch(&self, collection: Collection, query: &Query) -> RecordResult<Vec<Record>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT body FROM records WHERE collection = ? ORDER BY seq")?;

        let bodies = stmt
            .query_map([collection.as_str()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::new();
        for body in bodies {
            let record: Record = serde_json::from_str(&body)?;
            if query.matches(&record) {
                records.push(record);
            }
        }
        Ok(records)
    }

    async fn update(&self, collection: Collection, key: &str, fields: Record) -> RecordResult<()> {
        check_update_fields(key, &fields)?;

        let conn = self.lock()?;
        let mut record = load_body(&conn, collection, key)?.ok_or_else(|| RecordError::NotFound {
            collection,
            key: key.to_string(),
        })?;
        record.extend(fields);

        conn.execute(
            "UPDATE records SET body = ? WHERE collection = ? AND record_key = ?",
            (serde_json::to_string(&record)?, collection.as_str(), key),
        )?;
        Ok(())
    }

    async fn delete(&self, collection: Collection, key: &str) -> RecordResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM records WHERE collection = ? AND record_key = ?",
            (collection.as_str(), key),
        )?;
        Ok(())
    }
}
