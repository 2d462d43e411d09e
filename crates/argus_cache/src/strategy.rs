//! The per-file cache strategy chosen by the selector.

use std::fmt;

use crate::bundle::UnitBundle;
use crate::error::CacheError;
use crate::serialization::UnitSerialization;

/// The read/write behavior variants a file can be assigned for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Never read, never write.
    NoCache,
    /// Recompute the file, persist the fresh units afterward.
    WriteOnly,
    /// Serve the cached units now, persist the file's units afterward.
    ReadAndWrite,
}

/// The cache strategy decided for one file in the current run.
///
/// A stateless decision produced once per file. `WriteOnly` and
/// `ReadAndWrite` carry the serialization that performs the deferred
/// write-back once the file's analysis completes.
pub struct CacheStrategy {
    kind: StrategyKind,
    serialization: Option<UnitSerialization>,
}

impl CacheStrategy {
    /// The strategy for files the cache must never touch.
    pub fn no_cache() -> Self {
        Self {
            kind: StrategyKind::NoCache,
            serialization: None,
        }
    }

    /// The strategy for files that must be recomputed but still persisted.
    pub fn write_only(serialization: UnitSerialization) -> Self {
        Self {
            kind: StrategyKind::WriteOnly,
            serialization: Some(serialization),
        }
    }

    /// The strategy for files served from the cache and persisted again.
    pub fn read_and_write(serialization: UnitSerialization) -> Self {
        Self {
            kind: StrategyKind::ReadAndWrite,
            serialization: Some(serialization),
        }
    }

    /// Returns which of the three behaviors this strategy encodes.
    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    /// Returns the strategy's display name.
    pub fn name(&self) -> &'static str {
        match self.kind {
            StrategyKind::NoCache => "NO_CACHE",
            StrategyKind::WriteOnly => "WRITE_ONLY",
            StrategyKind::ReadAndWrite => "READ_AND_WRITE",
        }
    }

    /// Returns `true` if cached units were served for this file.
    pub fn reads_cache(&self) -> bool {
        self.kind == StrategyKind::ReadAndWrite
    }

    /// Returns `true` if a deferred write-back runs after analysis.
    pub fn writes_cache(&self) -> bool {
        self.serialization.is_some()
    }

    /// Returns `true` if the analyzer must actually process the file.
    ///
    /// `ReadAndWrite` means the materialized units already satisfy
    /// downstream consumers, so recomputation can be skipped.
    pub fn is_analysis_required(&self) -> bool {
        !self.reads_cache()
    }

    /// Persists the file's units, overwriting any prior entry.
    ///
    /// A no-op for `NoCache`. Called once per file after its analysis
    /// completes, including when the analysis served a cached copy.
    pub fn write_analysis_to_cache(&self, bundle: &UnitBundle) -> Result<(), CacheError> {
        match &self.serialization {
            Some(serialization) => serialization.write_to_cache(bundle),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for CacheStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStrategy")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
