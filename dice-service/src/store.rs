//! Key-value units of work over a single SQLite file.
//!
//! Each collection is a table of `(key BLOB, value BLOB)` rows created on first
//! write. Writers are serialized behind one connection; readers get their own
//! read-only connection and see the last committed snapshot.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rusqlite::{params, Connection, OpenFlags, OptionalExtension, TransactionBehavior};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid collection name {0:?}")]
    InvalidCollection(String),

    #[error("cannot write to {collection} inside a read-only unit of work")]
    ReadOnly { collection: String },

    #[error("unable to encode {collection} record: {source}")]
    Encode {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to decode {collection} record: {source}")]
    Decode {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("store worker unavailable")]
    WorkerUnavailable,
}

pub struct Store {
    path: PathBuf,
    writer: Mutex<Connection>,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             CREATE TABLE IF NOT EXISTS _sequences (
                 collection TEXT PRIMARY KEY,
                 value INTEGER NOT NULL
             );",
        )?;
        tracing::debug!(path = %path.display(), "Store opened");

        Ok(Self {
            path,
            writer: Mutex::new(conn),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `f` in a write unit of work. Everything `f` wrote is committed when
    /// it returns `Ok` and rolled back otherwise.
    pub fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Tx<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        // A unit that panicked was rolled back when its transaction dropped.
        let mut conn = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let inner = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)?;
        let unit = Tx {
            inner,
            writable: true,
        };

        let value = f(&unit)?;
        unit.inner.commit().map_err(StoreError::from)?;
        Ok(value)
    }

    /// Runs `f` against a consistent snapshot of committed state.
    pub fn view<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Tx<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(StoreError::from)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(StoreError::from)?;
        let inner = conn.transaction().map_err(StoreError::from)?;
        let unit = Tx {
            inner,
            writable: false,
        };

        let value = f(&unit)?;
        unit.inner.commit().map_err(StoreError::from)?;
        Ok(value)
    }
}

/// A single unit of work. Only reachable through [`Store::update`] and
/// [`Store::view`].
pub struct Tx<'c> {
    inner: rusqlite::Transaction<'c>,
    writable: bool,
}

impl Tx<'_> {
    pub fn exists(&self, collection: &str) -> Result<bool, StoreError> {
        validate(collection)?;
        let found = self
            .inner
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![collection],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn get(&self, collection: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        if !self.exists(collection)? {
            return Ok(None);
        }
        let sql = format!("SELECT value FROM \"{collection}\" WHERE key = ?1");
        let value = self
            .inner
            .query_row(&sql, params![key], |row| row.get::<_, Vec<u8>>(0))
            .optional()?;
        Ok(value)
    }

    pub fn put(&self, collection: &str, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.ensure(collection)?;
        let sql = format!("INSERT OR REPLACE INTO \"{collection}\" (key, value) VALUES (?1, ?2)");
        self.inner.execute(&sql, params![key, value])?;
        Ok(())
    }

    /// Next value of the collection's persisted counter, starting at 1.
    pub fn next_sequence(&self, collection: &str) -> Result<u64, StoreError> {
        self.ensure(collection)?;
        let value = self.inner.query_row(
            "INSERT INTO _sequences (collection, value) VALUES (?1, 1)
             ON CONFLICT(collection) DO UPDATE SET value = value + 1
             RETURNING value",
            params![collection],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(value as u64)
    }

    /// Walks the collection in ascending key order until `visit` breaks. A
    /// collection that was never written is empty.
    pub fn scan<F>(&self, collection: &str, mut visit: F) -> Result<(), StoreError>
    where
        F: FnMut(&[u8], &[u8]) -> ControlFlow<()>,
    {
        if !self.exists(collection)? {
            return Ok(());
        }
        let sql = format!("SELECT key, value FROM \"{collection}\" ORDER BY key");
        let mut stmt = self.inner.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let key: Vec<u8> = row.get(0)?;
            let value: Vec<u8> = row.get(1)?;
            if visit(&key, &value).is_break() {
                break;
            }
        }
        Ok(())
    }

    fn ensure(&self, collection: &str) -> Result<(), StoreError> {
        validate(collection)?;
        if !self.writable {
            return Err(StoreError::ReadOnly {
                collection: collection.to_string(),
            });
        }
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS \"{collection}\" \
             (key BLOB PRIMARY KEY, value BLOB NOT NULL)"
        );
        self.inner.execute(&sql, [])?;
        Ok(())
    }
}

// Names are interpolated into SQL, so only plain identifiers pass.
fn validate(collection: &str) -> Result<(), StoreError> {
    let mut chars = collection.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidCollection(collection.to_string()))
    }
}
