//! Incremental-analysis caching for the Argus analyzer.
//!
//! For each analyzed file this crate decides whether previously computed
//! flow-IR units can be reused from the persistent cache instead of being
//! recomputed, and manages writing fresh units back for future runs. The
//! decision is one of three strategies (no-cache, write-only,
//! read-and-write) chosen by ordered eligibility gates; cached units travel
//! as a self-describing binary bundle keyed by plugin version and file
//! identity. All read-side failures degrade to recomputation — a broken
//! cache never fails an analysis run.

#![warn(missing_docs)]

pub mod bundle;
pub mod config;
pub mod error;
pub mod key;
pub mod output;
pub mod reporter;
pub mod selector;
pub mod serialization;
pub mod store;
pub mod strategy;

pub use bundle::{IrUnit, UnitBundle};
pub use config::{load_config, load_config_from_str, CacheConfig, ConfigError};
pub use error::CacheError;
pub use key::CacheKey;
pub use output::OutputDir;
pub use reporter::{CacheReporter, MissReason};
pub use selector::{
    AnalysisCache, FileFacts, FileStatus, Product, RuntimeFacts, MIN_SUPPORTED_API,
};
pub use serialization::UnitSerialization;
pub use store::{CacheStore, FsCacheStore, MemoryCacheStore};
pub use strategy::{CacheStrategy, StrategyKind};
