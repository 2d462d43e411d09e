//! The cache strategy decision engine.
//!
//! For every analyzed file the selector evaluates an ordered sequence of
//! eligibility gates and produces one of the three strategies. The first
//! failing gate decides; later gates are not evaluated. Read-side failures
//! never escalate: a corrupt or unreadable entry downgrades the file to
//! `WriteOnly` and the run continues.

use std::sync::Arc;

use argus_common::ApiVersion;
use tracing::error;

use crate::bundle::UnitBundle;
use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::key::CacheKey;
use crate::output::OutputDir;
use crate::reporter::{CacheReporter, MissReason};
use crate::serialization::UnitSerialization;
use crate::store::CacheStore;
use crate::strategy::CacheStrategy;

/// Minimum host platform API version that exposes the analysis cache.
pub const MIN_SUPPORTED_API: ApiVersion = ApiVersion::new(2, 1);

/// The host product the analyzer is running inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    /// A full scanner run with access to the persistent cache.
    Scanner,
    /// An in-editor lint-only session; caching is never used.
    Editor,
}

/// Change status of a file relative to the previous analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// Unchanged since the last analysis.
    Same,
    /// Content differs from the last analysis.
    Changed,
    /// Not present in the last analysis.
    Added,
    /// Removed since the last analysis.
    Deleted,
}

/// Facts about the host runtime and the current analysis mode.
#[derive(Debug, Clone)]
pub struct RuntimeFacts {
    /// API version reported by the host platform.
    pub api_version: ApiVersion,
    /// Which product the analyzer is embedded in.
    pub product: Product,
    /// Whether the current mode guarantees every file is analyzed this run.
    pub all_files_analyzed: bool,
    /// Whether the host supports skipping unchanged files.
    pub can_skip_unchanged: bool,
}

/// Facts about one file under analysis.
#[derive(Debug, Clone)]
pub struct FileFacts {
    /// The file's stable identity within the project.
    pub key: String,
    /// Change status relative to the previous analysis.
    pub status: FileStatus,
}

impl FileFacts {
    /// Creates file facts from an identity and change status.
    pub fn new(key: impl Into<String>, status: FileStatus) -> Self {
        Self {
            key: key.into(),
            status,
        }
    }
}

/// Outcome assigned by a failed eligibility gate.
#[derive(Clone, Copy)]
enum GateOutcome {
    NoCache,
    WriteOnly,
}

/// The run-scoped front door of the cache subsystem.
///
/// Owns the store handle, the working output, and the reporter for one
/// analysis run. The caller creates one per run, asks it for a strategy per
/// file, runs each file's deferred write-back through
/// [`finish_file`](Self::finish_file), and logs the aggregate report at the
/// end. Strategy selection may run concurrently from per-file workers.
pub struct AnalysisCache {
    store: Arc<dyn CacheStore>,
    output: OutputDir,
    plugin_version: Option<String>,
    enabled: bool,
    reporter: CacheReporter,
}

impl AnalysisCache {
    /// Creates the cache front door for one analysis run.
    pub fn new(
        config: &CacheConfig,
        store: Arc<dyn CacheStore>,
        output: OutputDir,
        plugin_version: Option<&str>,
    ) -> Self {
        Self {
            store,
            output,
            plugin_version: plugin_version.map(str::to_string),
            enabled: config.enabled,
            reporter: CacheReporter::new(),
        }
    }

    /// Decides the cache strategy for one file.
    ///
    /// Evaluates the eligibility gates in order; the first failing gate
    /// determines the outcome. Every invocation logs one decision line and
    /// increments exactly one reporter counter.
    pub fn strategy_for(&self, runtime: &RuntimeFacts, file: &FileFacts) -> CacheStrategy {
        let key = CacheKey::for_file(&file.key, self.plugin_version.as_deref());
        let serialization =
            UnitSerialization::new(Arc::clone(&self.store), self.output.clone(), key);

        // Ordered gate table; predicates run lazily so a failed gate stops
        // all later checks, including the store presence query.
        let gates: [(&dyn Fn() -> bool, GateOutcome, MissReason); 5] = [
            (
                &|| {
                    !runtime.api_version.is_at_least(MIN_SUPPORTED_API)
                        || runtime.product == Product::Editor
                },
                GateOutcome::NoCache,
                MissReason::RuntimeApiIncompatible,
            ),
            (
                &|| !self.enabled,
                GateOutcome::NoCache,
                MissReason::CacheDisabled,
            ),
            (
                &|| !runtime.all_files_analyzed || !runtime.can_skip_unchanged,
                GateOutcome::WriteOnly,
                MissReason::AnalysisModeIneligible,
            ),
            (
                &|| file.status != FileStatus::Same,
                GateOutcome::WriteOnly,
                MissReason::FileChanged,
            ),
            (
                &|| !serialization.is_in_cache(),
                GateOutcome::WriteOnly,
                MissReason::FileNotInCache,
            ),
        ];

        let mut failed = None;
        for (gate_failed, outcome, reason) in gates {
            if gate_failed() {
                failed = Some((outcome, reason));
                break;
            }
        }

        if let Some((outcome, reason)) = failed {
            let strategy = match outcome {
                GateOutcome::NoCache => CacheStrategy::no_cache(),
                GateOutcome::WriteOnly => CacheStrategy::write_only(serialization),
            };
            self.reporter
                .log_and_increment(&strategy, &file.key, Some(reason));
            return strategy;
        }

        match materialize(&serialization) {
            Ok(()) => {
                let strategy = CacheStrategy::read_and_write(serialization);
                self.reporter.log_and_increment(&strategy, &file.key, None);
                strategy
            }
            Err(e) => {
                error!("Failure when reading cache entry for '{}': {e}", file.key);
                let strategy = CacheStrategy::write_only(serialization);
                self.reporter
                    .log_and_increment(&strategy, &file.key, Some(MissReason::CacheCorrupted));
                strategy
            }
        }
    }

    /// Runs the deferred write-back once a file's analysis has completed.
    ///
    /// A failed write is logged and swallowed: the file's entry stays stale
    /// until a future run succeeds, and the analysis itself is unaffected.
    pub fn finish_file(&self, strategy: &CacheStrategy, bundle: &UnitBundle) {
        if let Err(e) = strategy.write_analysis_to_cache(bundle) {
            error!("Failure when writing cache entry: {e}");
        }
    }

    /// Returns the run's outcome reporter.
    pub fn reporter(&self) -> &CacheReporter {
        &self.reporter
    }

    /// Logs the aggregate end-of-run report.
    pub fn log_report(&self) {
        self.reporter.log_report();
    }

    /// Clears all reporter counters for reuse in an independent run.
    pub fn reset(&self) {
        self.reporter.reset();
    }
}

/// Reads the stored bundle and replays it into the working output.
fn materialize(serialization: &UnitSerialization) -> Result<(), CacheError> {
    let bundle = serialization.read_from_cache()?;
    serialization.copy_from_previous(&bundle)
}
