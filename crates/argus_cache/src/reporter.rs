//! Run-level accumulation and reporting of cache strategy outcomes.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, info};

use crate::strategy::CacheStrategy;

/// Why a file was not served from the cache.
///
/// Classification for reporting only; it never feeds back into strategy
/// selection. The absence of a reason denotes a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissReason {
    /// The host runtime API is too old, or the product disables caching.
    RuntimeApiIncompatible,
    /// Caching is switched off by configuration.
    CacheDisabled,
    /// The current analysis mode cannot reuse cached results.
    AnalysisModeIneligible,
    /// The file changed since the previous analysis.
    FileChanged,
    /// No entry exists for the file's key.
    FileNotInCache,
    /// The stored entry could not be read back.
    CacheCorrupted,
}

impl MissReason {
    /// All reasons, in the order report lines are rendered.
    pub const ALL: [MissReason; 6] = [
        MissReason::RuntimeApiIncompatible,
        MissReason::CacheDisabled,
        MissReason::AnalysisModeIneligible,
        MissReason::FileChanged,
        MissReason::FileNotInCache,
        MissReason::CacheCorrupted,
    ];

    /// Human-readable description used in decision logs and reports.
    pub fn description(self) -> &'static str {
        match self {
            MissReason::RuntimeApiIncompatible => "the runtime API is not compatible",
            MissReason::CacheDisabled => "cache is disabled",
            MissReason::AnalysisModeIneligible => {
                "the current analysis requires all files to be analyzed"
            }
            MissReason::FileChanged => "the current file is changed",
            MissReason::FileNotInCache => "the current file is not cached",
            MissReason::CacheCorrupted => "the cache is corrupted",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|r| *r == self).unwrap_or(0)
    }
}

/// Thread-safe accumulator of strategy outcomes across one analysis run.
///
/// Per-file workers running in parallel all report into the same instance;
/// counters are atomic so no update is ever lost. One reporter lives for
/// one run: the owner calls [`log_report`](Self::log_report) at the end and
/// [`reset`](Self::reset) before any reuse.
pub struct CacheReporter {
    hits: AtomicUsize,
    misses: [AtomicUsize; MissReason::ALL.len()],
}

impl CacheReporter {
    /// Creates a reporter with all counters at zero.
    pub fn new() -> Self {
        Self {
            hits: AtomicUsize::new(0),
            misses: Default::default(),
        }
    }

    /// Logs one strategy decision and increments the matching counter.
    pub fn log_and_increment(
        &self,
        strategy: &CacheStrategy,
        file_key: &str,
        reason: Option<MissReason>,
    ) {
        match reason {
            Some(reason) => {
                debug!(
                    "Cache strategy set to '{}' for file '{}' as {}",
                    strategy.name(),
                    file_key,
                    reason.description()
                );
                self.misses[reason.index()].fetch_add(1, Ordering::Relaxed);
            }
            None => {
                debug!(
                    "Cache strategy set to '{}' for file '{}'",
                    strategy.name(),
                    file_key
                );
                self.hits.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Returns the number of files served from the cache.
    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Returns the number of files that missed for the given reason.
    pub fn miss_count(&self, reason: MissReason) -> usize {
        self.misses[reason.index()].load(Ordering::Relaxed)
    }

    /// Returns the total number of decisions recorded.
    pub fn total(&self) -> usize {
        self.hit_count()
            + MissReason::ALL
                .iter()
                .map(|r| self.miss_count(*r))
                .sum::<usize>()
    }

    /// Renders the aggregate report: the hit line plus one line per
    /// non-zero miss reason, in declaration order. Empty when no decision
    /// was recorded.
    pub fn render_report(&self) -> Vec<String> {
        let total = self.total();
        if total == 0 {
            return Vec::new();
        }

        let mut lines = vec![format!(
            "Hit the cache for {} out of {} file(s)",
            self.hit_count(),
            total
        )];
        for reason in MissReason::ALL {
            let count = self.miss_count(reason);
            if count > 0 {
                lines.push(format!(
                    "Miss the cache for {count} out of {total} file(s): {}",
                    reason.description()
                ));
            }
        }
        lines
    }

    /// Logs the aggregate report, one line per entry.
    pub fn log_report(&self) {
        for line in self.render_report() {
            info!("{line}");
        }
    }

    /// Zeroes all counters. Idempotent; must run before a reporter is
    /// reused for an independent run.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        for counter in &self.misses {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for CacheReporter {
    fn default() -> Self {
        Self::new()
    }
}
