//! Key-value storage contracts and implementations.
//!
//! # Responsibility
//! - Provide the `get/set(key) -> bytes` capability collections persist through.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Keys are validated once, at `StorageKey` construction.
//! - `set` replaces the full value for a key atomically.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key of the notebook collection.
pub const NOTES_STORAGE_KEY: &str = "notes";
/// Storage key of the to-do collection.
pub const TASKS_STORAGE_KEY: &str = "vibrantTodoTasks";

static STORAGE_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_.:-]{0,127}$").expect("valid storage key regex")
});

pub type StoreResult<T> = Result<T, StoreError>;

/// Write-side persistence failures.
#[derive(Debug)]
pub enum StoreError {
    /// Key does not match the storage key grammar.
    InvalidKey(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    Db(DbError),
    /// Collection could not be encoded for storage.
    Serialization(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid storage key: `{key}`"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "key-value store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "failed to encode collection: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidKey(_) => None,
            Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Validated storage key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Validates `key` (trimmed) against the storage key grammar.
    pub fn new(key: &str) -> StoreResult<Self> {
        let trimmed = key.trim();
        if !STORAGE_KEY_RE.is_match(trimmed) {
            return Err(StoreError::InvalidKey(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn notes() -> Self {
        Self(NOTES_STORAGE_KEY.to_string())
    }

    pub fn tasks() -> Self {
        Self(TASKS_STORAGE_KEY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Synchronous byte storage addressed by key.
pub trait KeyValueStore {
    /// Returns `None` when the key was never written or was removed.
    fn get(&self, key: &StorageKey) -> StoreResult<Option<Vec<u8>>>;
    fn set(&self, key: &StorageKey, value: &[u8]) -> StoreResult<()>;
    /// Removing an absent key is not an error.
    fn remove(&self, key: &StorageKey) -> StoreResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &StorageKey) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &StorageKey, value: &[u8]) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &StorageKey) -> StoreResult<()> {
        (**self).remove(key)
    }
}

/// SQLite-backed key-value store over the `kv_entries` table.
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvStore<'conn> {
    /// Creates a store from a connection opened through `db::open_db*`.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteKvStore<'_> {
    fn get(&self, key: &StorageKey) -> StoreResult<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key.as_str()],
                |row| Ok(value_bytes(row.get_ref(0)?)),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &StorageKey, value: &[u8]) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key.as_str(), value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &StorageKey) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key.as_str()])?;
        Ok(())
    }
}

/// Raw bytes of a stored value whatever its column affinity. Non-text
/// values are rendered as text so the decoder can reject them.
fn value_bytes(value: ValueRef<'_>) -> Vec<u8> {
    match value {
        ValueRef::Blob(bytes) | ValueRef::Text(bytes) => bytes.to_vec(),
        ValueRef::Integer(number) => number.to_string().into_bytes(),
        ValueRef::Real(number) => number.to_string().into_bytes(),
        ValueRef::Null => Vec::new(),
    }
}

/// In-process key-value store. Contents live as long as the value.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RefCell<BTreeMap<StorageKey, Vec<u8>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &StorageKey) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &StorageKey, value: &[u8]) -> StoreResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.clone(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &StorageKey) -> StoreResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
