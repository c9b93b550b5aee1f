//! Key-value storage contracts and implementations.
//!
//! # Responsibility
//! - Provide the local persistent storage the playground saves into.
//! - Keep backend details (SQL, page storage) inside the storage boundary.
//!
//! # Invariants
//! - `set_item` is an upsert: the latest write for a key wins.
//! - A write rejected by the quota leaves the previous value untouched.

#[cfg(feature = "native")]
use crate::db::DbError;
use log::warn;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage failure for key-value operations.
#[derive(Debug)]
pub enum StoreError {
    #[cfg(feature = "native")]
    Db(DbError),
    /// Writing would exceed the configured storage budget.
    QuotaExceeded {
        key: String,
        required_bytes: usize,
        quota_bytes: usize,
    },
    /// Storage backend refused the operation.
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "native")]
            Self::Db(err) => write!(f, "{err}"),
            Self::QuotaExceeded {
                key,
                required_bytes,
                quota_bytes,
            } => write!(
                f,
                "storage quota exceeded writing `{key}`: {required_bytes} bytes needed, {quota_bytes} allowed"
            ),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            #[cfg(feature = "native")]
            Self::Db(err) => Some(err),
            Self::QuotaExceeded { .. } | Self::Unavailable(_) => None,
        }
    }
}

#[cfg(feature = "native")]
impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

#[cfg(feature = "native")]
impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String key-value storage, modeled on browser local storage.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove_item(&self, key: &str) -> StoreResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        (**self).remove_item(key)
    }
}

pub(super) fn check_quota(
    key: &str,
    value: &str,
    other_entries_bytes: usize,
    quota_bytes: Option<usize>,
) -> StoreResult<()> {
    let Some(quota_bytes) = quota_bytes else {
        return Ok(());
    };
    let required_bytes = other_entries_bytes + key.len() + value.len();
    if required_bytes > quota_bytes {
        warn!(
            "event=storage_write module=repo status=error error_code=quota_exceeded required_bytes={required_bytes} quota_bytes={quota_bytes}"
        );
        return Err(StoreError::QuotaExceeded {
            key: key.to_string(),
            required_bytes,
            quota_bytes,
        });
    }
    Ok(())
}

/// Session-lifetime store kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RefCell<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(mut self, quota_bytes: Option<usize>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        let other_bytes = self
            .entries
            .borrow()
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(existing, stored)| existing.len() + stored.len())
            .sum();
        check_quota(key, value, other_bytes, self.quota_bytes)?;

        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, MemoryKeyValueStore, StoreError};

    #[test]
    fn memory_store_upserts_and_removes() {
        let store = MemoryKeyValueStore::new();
        store.set_item("k", "one").unwrap();
        store.set_item("k", "two").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("two"));
        assert_eq!(store.len(), 1);

        store.remove_item("k").unwrap();
        assert_eq!(store.get_item("k").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn memory_store_quota_keeps_previous_value() {
        let store = MemoryKeyValueStore::new().with_quota(Some(8));
        store.set_item("k", "small").unwrap();

        let err = store.set_item("k", "far too large").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { quota_bytes: 8, .. }));
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("small"));
    }

    #[test]
    fn quota_ignores_the_value_being_replaced() {
        let store = MemoryKeyValueStore::new().with_quota(Some(10));
        store.set_item("k", "12345678").unwrap();
        store.set_item("k", "87654321").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("87654321"));
    }
}
