//! Persistent cache store abstraction and implementations.
//!
//! The host platform ultimately owns the key-value cache; this module
//! defines the narrow contract the subsystem needs from it, plus a
//! filesystem-backed implementation and an in-memory one for tests and
//! embedding hosts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use argus_common::ContentHash;

use crate::error::CacheError;
use crate::key::CacheKey;

/// File extension for stored cache entries.
const ENTRY_EXT: &str = "bin";

/// Suffix for in-progress writes, renamed into place once complete.
const TMP_SUFFIX: &str = "tmp";

/// The persistent key-value store holding serialized unit bundles.
///
/// `read` observes the previous run's snapshot for a key; `write` records
/// the entry the next run will observe. Implementations must tolerate
/// concurrent operations on distinct keys, and a written entry must become
/// observable only as a complete blob — readers must never see a
/// half-written entry.
pub trait CacheStore: Send + Sync {
    /// Returns `true` if an entry exists for `key`, without fetching it.
    fn contains(&self, key: &CacheKey) -> bool;

    /// Fetches the entry stored at `key`, or `None` if absent.
    fn read(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError>;

    /// Stores `blob` at `key`, overwriting any prior entry.
    fn write(&self, key: &CacheKey, blob: &[u8]) -> Result<(), CacheError>;
}

/// Filesystem-backed cache store.
///
/// Entries live in a single directory; each file name is derived from the
/// content hash of the rendered key, so the same key maps to the same file
/// across process restarts. Writes go to a temporary file first and are
/// renamed into place, so an interrupted write leaves no observable entry.
pub struct FsCacheStore {
    dir: PathBuf,
}

impl FsCacheStore {
    /// Opens a store rooted at the given directory, creating it if needed.
    pub fn open(dir: &Path) -> Result<Self, CacheError> {
        std::fs::create_dir_all(dir).map_err(|e| CacheError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Returns the on-disk path for the entry at `key`.
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        let digest = ContentHash::of(key.to_string().as_bytes());
        self.dir.join(format!("{digest}.{ENTRY_EXT}"))
    }
}

impl CacheStore for FsCacheStore {
    fn contains(&self, key: &CacheKey) -> bool {
        self.entry_path(key).is_file()
    }

    fn read(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.entry_path(key);
        match std::fs::read(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::Io { path, source: e }),
        }
    }

    fn write(&self, key: &CacheKey, blob: &[u8]) -> Result<(), CacheError> {
        let path = self.entry_path(key);
        let tmp = path.with_extension(TMP_SUFFIX);

        std::fs::write(&tmp, blob).map_err(|e| CacheError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            CacheError::Io { path, source: e }
        })
    }
}

/// In-memory cache store for tests and hosts without persistent storage.
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryCacheStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Returns `true` if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryCacheStore {
    fn contains(&self, key: &CacheKey) -> bool {
        self.entries.lock().unwrap().contains_key(&key.to_string())
    }

    fn read(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.entries.lock().unwrap().get(&key.to_string()).cloned())
    }

    fn write(&self, key: &CacheKey, blob: &[u8]) -> Result<(), CacheError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), blob.to_vec());
        Ok(())
    }
}
