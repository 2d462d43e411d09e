//! Per-file cache entry operations: presence, read, replay, and write-back.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::bundle::UnitBundle;
use crate::error::CacheError;
use crate::key::CacheKey;
use crate::output::OutputDir;
use crate::store::CacheStore;

/// Binds one file's cache key to the persistent store and working output.
///
/// Created once per file per run by the strategy selector and carried by the
/// chosen strategy so the deferred write-back can reach the store after the
/// file's analysis completes.
pub struct UnitSerialization {
    store: Arc<dyn CacheStore>,
    output: OutputDir,
    key: CacheKey,
}

impl UnitSerialization {
    /// Creates the serialization for one file's key.
    pub fn new(store: Arc<dyn CacheStore>, output: OutputDir, key: CacheKey) -> Self {
        Self { store, output, key }
    }

    /// Returns the key this serialization addresses.
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Returns `true` if the store holds an entry for this file.
    ///
    /// Presence only; the entry is not fetched or validated.
    pub fn is_in_cache(&self) -> bool {
        self.store.contains(&self.key)
    }

    /// Fetches and decodes the entry stored for this file.
    ///
    /// An entry that vanished after the presence check, or fails structural
    /// validation, is reported as corruption; a malformed blob is never
    /// partially accepted.
    pub fn read_from_cache(&self) -> Result<UnitBundle, CacheError> {
        let blob = self
            .store
            .read(&self.key)?
            .ok_or_else(|| CacheError::Corrupted {
                reason: format!("entry '{}' disappeared before it could be read", self.key),
            })?;
        UnitBundle::decode(&blob)
    }

    /// Materializes every unit of a decoded bundle into the working output.
    ///
    /// All-or-nothing: the first failed write aborts the copy and removes
    /// the units this call already materialized, so downstream never
    /// observes a partial replay.
    pub fn copy_from_previous(&self, bundle: &UnitBundle) -> Result<(), CacheError> {
        let mut materialized: Vec<&str> = Vec::with_capacity(bundle.len());
        for unit in bundle.units() {
            if let Err(e) = self.output.write_unit(&unit.name, &unit.content) {
                for name in materialized {
                    let _ = self.output.remove_unit(name);
                }
                return Err(e);
            }
            materialized.push(&unit.name);
        }
        debug!(
            "Replayed {} cached unit(s) for '{}'",
            bundle.len(),
            self.key.file_key()
        );
        Ok(())
    }

    /// Serializes the file's units and stores them at the key, overwriting
    /// any prior entry.
    pub fn write_to_cache(&self, bundle: &UnitBundle) -> Result<(), CacheError> {
        let blob = bundle.encode()?;
        self.store.write(&self.key, &blob)?;
        debug!(
            "Stored {} unit(s) ({} byte(s)) for '{}'",
            bundle.len(),
            blob.len(),
            self.key.file_key()
        );
        Ok(())
    }
}

impl fmt::Debug for UnitSerialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitSerialization")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
