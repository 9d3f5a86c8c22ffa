//! Bounded log of past analyses
//!
//! The whole log lives under one key as a JSON array, most recent first. Every
//! change rewrites the key in a single statement, so a reader never sees a
//! half-written log.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::StorageError;
use crate::report::RiskLevel;

pub const HISTORY_KEY: &str = "lastfive_history";
pub const MAX_ENTRIES: usize = 20;
pub const VISIBLE_ENTRIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Milliseconds since the epoch, bumped when needed to stay strictly increasing
    pub id: i64,
    pub product_name: String,
    pub risk_level: RiskLevel,
    pub timestamp: DateTime<Utc>,
}

/// Minimal durable key/value contract
pub trait KeyValueStore: Send {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// SQLite-backed store with a single `kv` table
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    ///
    /// A file that is not a usable database is moved aside to `<path>.corrupt`
    /// and replaced with a fresh one.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        match Self::open_at(path) {
            Ok(store) => Ok(store),
            Err(StorageError::Sqlite(err)) if path.exists() => {
                let aside = corrupt_path(path);
                warn!(path = %path.display(), error = %err, "history database unreadable, starting fresh");
                fs::rename(path, &aside)?;
                Self::open_at(path)
            }
            Err(err) => Err(err),
        }
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )?;
        Ok(Self { conn })
    }
}

fn corrupt_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".corrupt");
    PathBuf::from(name)
}

impl KeyValueStore for SqliteStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

/// In-process store, used when no database can be opened and in tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.values.insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Owner of the persisted history log and its only writer
pub struct HistoryStore {
    backend: Box<dyn KeyValueStore>,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// An empty store; call [`HistoryStore::load`] to read what is persisted.
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            entries: Vec::new(),
        }
    }

    /// Construct and load in one go.
    pub fn open(backend: Box<dyn KeyValueStore>) -> Self {
        let mut store = Self::new(backend);
        store.load();
        store
    }

    /// Replace the in-memory log with what is persisted.
    ///
    /// A missing, empty, or unreadable log yields an empty history.
    pub fn load(&mut self) -> &[HistoryEntry] {
        self.entries = match self.read_log() {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "discarding unreadable history");
                Vec::new()
            }
        };
        info!(entries = self.entries.len(), "history loaded");
        &self.entries
    }

    fn read_log(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        let raw = match self.backend.read(HISTORY_KEY)? {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Ok(Vec::new()),
        };

        let mut entries: Vec<HistoryEntry> =
            serde_json::from_str(&raw).map_err(|e| StorageError::Corruption(e.to_string()))?;
        entries.truncate(MAX_ENTRIES);
        Ok(entries)
    }

    /// Prepend `entry`, evict past the cap, and persist the whole log.
    ///
    /// The in-memory log is updated even when persisting fails.
    pub fn insert(&mut self, entry: HistoryEntry) -> Result<(), StorageError> {
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_ENTRIES);
        self.flush()
    }

    /// Build an entry stamped `now` with a strictly increasing id and insert it.
    pub fn record(
        &mut self,
        product_name: &str,
        risk_level: RiskLevel,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let id = self.next_id(now);
        self.insert(HistoryEntry {
            id,
            product_name: product_name.to_string(),
            risk_level,
            timestamp: now,
        })
    }

    fn next_id(&self, now: DateTime<Utc>) -> i64 {
        let candidate = now.timestamp_millis();
        match self.entries.first() {
            Some(latest) if latest.id >= candidate => latest.id + 1,
            _ => candidate,
        }
    }

    /// Write the whole log under [`HISTORY_KEY`].
    pub fn flush(&mut self) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.entries)?;
        self.backend.write(HISTORY_KEY, &raw)?;
        debug!(entries = self.entries.len(), "history flushed");
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        self.flush()
    }

    pub fn top_n(&self, n: usize) -> &[HistoryEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// The projection a rendering surface may show
    pub fn visible(&self) -> &[HistoryEntry] {
        self.top_n(VISIBLE_ENTRIES)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn backend(&self) -> &dyn KeyValueStore {
        self.backend.as_ref()
    }
}
