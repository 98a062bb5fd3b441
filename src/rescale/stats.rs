//! Decision counters.
//!
//! Each filter counts into its own `FilterStats` and folds them into the
//! factory's totals when dropped, so concurrent compaction jobs never
//! write a shared counter per key. Relaxed atomics only: counters are
//! diagnostics and never feed back into a decision.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct FilterStats {
    /// In-range keys (and current-round values) kept
    kept: AtomicU64,
    /// Out-of-range entries removed
    dropped: AtomicU64,
    /// Entries kept with their round tag rewritten
    retagged: AtomicU64,
    /// Entries kept without a range check (unconfigured, disabled, malformed)
    passthrough: AtomicU64,
    sink_failures: AtomicU64,
}

/// Point-in-time copy of [`FilterStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStatsSnapshot {
    pub kept: u64,
    pub dropped: u64,
    pub retagged: u64,
    pub passthrough: u64,
    pub sink_failures: u64,
}

impl FilterStatsSnapshot {
    /// Entries that reached the filter.
    pub fn total_decisions(&self) -> u64 {
        self.kept + self.dropped + self.retagged + self.passthrough
    }
}

impl FilterStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_kept(&self) {
        self.kept.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_retagged(&self) {
        self.retagged.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_passthrough(&self) {
        self.passthrough.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_sink_failure(&self) {
        self.sink_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Add every counter of `other` into `self`.
    pub(crate) fn absorb(&self, other: &FilterStatsSnapshot) {
        self.kept.fetch_add(other.kept, Ordering::Relaxed);
        self.dropped.fetch_add(other.dropped, Ordering::Relaxed);
        self.retagged.fetch_add(other.retagged, Ordering::Relaxed);
        self.passthrough.fetch_add(other.passthrough, Ordering::Relaxed);
        self.sink_failures.fetch_add(other.sink_failures, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FilterStatsSnapshot {
        FilterStatsSnapshot {
            kept: self.kept.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            retagged: self.retagged.load(Ordering::Relaxed),
            passthrough: self.passthrough.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
        }
    }
}
