//! Durable key-value storage for the cookie jar.
//!
//! The jar persists into any [`KeyValueStore`] using a fixed layout:
//!
//! - [`NAMES_KEY`] holds the comma-joined names of every tracked cookie.
//! - [`COOKIE_KEY_PREFIX`]` + name` holds that cookie's [`encode_cookie`] blob.
//!
//! Each [`KeyValueStore::commit`] call applies one batch of edits as a unit.
//! Durable state is an advisory cache: the in-memory jar is authoritative for
//! the lifetime of the process.

mod codec;
mod file;

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

pub use codec::{decode_cookie, encode_cookie};
pub use file::{FileStore, persisted_store_path, resolve_store_dir};

/// Key of the cookie name index.
pub const NAMES_KEY: &str = "names";

/// Prefix of each per-cookie blob key.
pub const COOKIE_KEY_PREFIX: &str = "cookie_";

/// Returns the store key holding the blob for cookie `name`.
#[must_use]
pub fn cookie_key(name: &str) -> String {
    format!("{COOKIE_KEY_PREFIX}{name}")
}

/// Errors for durable store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No suitable user config directory is available.
    #[error("unable to determine config directory (set XDG_CONFIG_HOME or HOME)")]
    ConfigDirUnavailable,
    /// Filesystem I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Stored encrypted payload is malformed.
    #[error("persisted cookie store payload is invalid")]
    InvalidPayload,
    /// Encryption failed.
    #[error("failed to encrypt cookie store")]
    EncryptionFailed,
    /// Decryption failed.
    #[error("failed to decrypt cookie store")]
    DecryptionFailed,
}

/// One change inside a commit batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEdit {
    /// Set `key` to `value`.
    Put {
        /// Entry key.
        key: String,
        /// Entry value.
        value: String,
    },
    /// Delete `key` if present.
    Remove {
        /// Entry key.
        key: String,
    },
}

impl StoreEdit {
    /// Convenience constructor for [`StoreEdit::Put`].
    #[must_use]
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Convenience constructor for [`StoreEdit::Remove`].
    #[must_use]
    pub fn remove(key: impl Into<String>) -> Self {
        Self::Remove { key: key.into() }
    }
}

/// A string-keyed durable store.
///
/// Implementations must be shareable across threads; the jar serializes its
/// own commits, but reads may run concurrently with them.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Applies `edits` in order as a single atomic unit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the batch could not be made durable; in that
    /// case none of the edits are visible.
    fn commit(&self, edits: &[StoreEdit]) -> Result<(), StoreError>;
}

/// Applies edits to an in-memory map.
pub(crate) fn apply_edits(entries: &mut BTreeMap<String, String>, edits: &[StoreEdit]) {
    for edit in edits {
        match edit {
            StoreEdit::Put { key, value } => {
                entries.insert(key.clone(), value.clone());
            }
            StoreEdit::Remove { key } => {
                entries.remove(key);
            }
        }
    }
}

/// Process-local store. Nothing survives a restart; used for ephemeral jars
/// and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every entry.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn commit(&self, edits: &[StoreEdit]) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        apply_edits(&mut entries, edits);
        Ok(())
    }
}

// Shared handles let a caller inspect a store the jar also writes to.
impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn commit(&self, edits: &[StoreEdit]) -> Result<(), StoreError> {
        (**self).commit(edits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_key_uses_prefix() {
        assert_eq!(cookie_key("sid"), "cookie_sid");
    }

    #[test]
    fn test_memory_store_commit_applies_in_order() {
        let store = MemoryStore::new();
        store
            .commit(&[
                StoreEdit::put("a", "1"),
                StoreEdit::put("b", "2"),
                StoreEdit::remove("a"),
                StoreEdit::put("b", "3"),
            ])
            .unwrap();

        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("3"));
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let store = MemoryStore::new();
        store.commit(&[StoreEdit::remove("missing")]).unwrap();
        assert!(store.snapshot().is_empty());
    }
}
