//! Client-local key/value storage behind an injectable trait.
//!
//! The cache layer is written against `KvStore` rather than a concrete
//! store, so hosts can swap in their own persistence and tests can use
//! `MemoryStore`. Store-unavailable conditions (disk full, locked database)
//! degrade to a miss/no-op rather than propagating; the widget must remain
//! usable without persistence.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

/// A plain-string key/value store.
///
/// Implementations never surface errors: a failed read is a miss, a failed
/// write returns `false`.
pub trait KvStore: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> bool;
    fn remove_item(&self, key: &str);
}

/// SQLite-backed persistent store. Survives restarts; best-effort beyond
/// that.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the store at the given path.
    ///
    /// # Errors
    /// Fails when the database cannot be opened or the schema cannot be
    /// created.
    pub fn new<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn.lock().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}

impl KvStore for SqliteStore {
    fn get_item(&self, key: &str) -> Option<String> {
        let conn = self.conn.lock();
        match conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
        {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Store read failed for {}: {}", key, e);
                None
            }
        }
    }

    fn set_item(&self, key: &str, value: &str) -> bool {
        let conn = self.conn.lock();
        match conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        ) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Store write failed for {}: {}", key, e);
                false
            }
        }
    }

    fn remove_item(&self, key: &str) {
        let conn = self.conn.lock();
        if let Err(e) = conn.execute("DELETE FROM kv WHERE key = ?1", params![key]) {
            tracing::warn!("Store delete failed for {}: {}", key, e);
        }
    }
}

/// In-memory store, used as a test double and as the fallback when no
/// persistent store is available.
#[derive(Clone, Default)]
pub struct MemoryStore {
    map: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.map.lock().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> bool {
        self.map.lock().insert(key.to_string(), value.to_string());
        true
    }

    fn remove_item(&self, key: &str) {
        self.map.lock().remove(key);
    }
}
