//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur during cache operations.
///
/// No error in this subsystem aborts an analysis run: read-side failures are
/// downgraded to cache misses by the strategy selector, and write-side
/// failures leave the entry stale until a later successful write. This enum
/// is used for internal propagation within the subsystem.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A stored cache entry is structurally malformed.
    #[error("corrupted cache entry: {reason}")]
    Corrupted {
        /// Description of the structural inconsistency.
        reason: String,
    },

    /// A bundle could not be encoded into the entry format.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the encoding failure.
        reason: String,
    },

    /// A generated unit carries a name that is not a safe relative path.
    #[error("invalid unit name '{name}': {reason}")]
    InvalidUnitName {
        /// The offending name.
        name: String,
        /// Why the name was rejected.
        reason: &'static str,
    },

    /// A generated unit name occurs more than once within one bundle.
    #[error("duplicate unit name '{name}'")]
    DuplicateUnitName {
        /// The repeated name.
        name: String,
    },
}
