//! Key-value persistence for the marketplace collections.
//!
//! The marketplace keeps three JSON documents under fixed keys:
//! [`LISTINGS_KEY`], [`USERS_KEY`] and [`CURRENT_USER_KEY`] (absent when
//! nobody is logged in). A [`KeyValueStore`] only moves strings; encoding
//! and decoding live in [`load_json`] and [`save_json`].

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Key of the listing collection.
pub const LISTINGS_KEY: &str = "products";
/// Key of the user collection.
pub const USERS_KEY: &str = "users";
/// Key of the logged-in user, removed on logout.
pub const CURRENT_USER_KEY: &str = "currentUser";

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Reading or writing the backing medium failed.
    #[error("I/O error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    /// A stored document is not valid JSON for its type.
    #[error("corrupt document under key {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded.
    #[error("failed to encode value for key {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String-keyed document storage.
///
/// Implementations must make a `save` visible to every later `load` of the
/// same key through any handle to the same store.
pub trait KeyValueStore {
    /// Read the raw document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Replace the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// Delete `key`; deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        (**self).save(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        (**self).remove(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        (**self).save(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        (**self).remove(key)
    }
}

/// Load and decode the document under `key`.
///
/// # Errors
///
/// Returns `PersistenceError::Corrupt` if the document does not decode.
pub fn load_json<T, S>(store: &S, key: &str) -> Result<Option<T>, PersistenceError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    store
        .load(key)?
        .map(|raw| {
            serde_json::from_str(&raw).map_err(|source| PersistenceError::Corrupt {
                key: key.to_owned(),
                source,
            })
        })
        .transpose()
}

/// Encode `value` and store it under `key`.
///
/// # Errors
///
/// Returns an error if encoding or the underlying write fails.
pub fn save_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), PersistenceError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| PersistenceError::Encode {
        key: key.to_owned(),
        source,
    })?;
    store.save(key, &raw)
}

/// In-process store, used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a data directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) a data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| PersistenceError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn io_error(key: &str) -> impl FnOnce(io::Error) -> PersistenceError + '_ {
    move |source| PersistenceError::Io {
        key: key.to_owned(),
        source,
    }
}

impl KeyValueStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key)(e)),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(io_error(key))?;
        fs::rename(&tmp, &path).map_err(io_error(key))
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key)(e)),
        }
    }
}
