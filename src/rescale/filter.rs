//! The rescaling compaction filter.
//!
//! Decides per key whether an entry still belongs to this store
//! instance's key-group range. The filter is fail-open: anything it was
//! not explicitly told to delete is kept.
//!
//! Key-only decision (`decide`):
//! 1. Unconfigured or round `Disabled` -> Keep
//! 2. Empty key or a range with an absent (empty) bound -> Keep
//! 3. `key < smallest_key` or `key >= largest_key` -> Drop, else Keep
//!
//! Value-aware decision (`filter_entry`): every value carries the round
//! that last claimed it in its first byte. Values already tagged with the
//! configured round are kept untouched; values from the other round are
//! re-tagged when their key is in range and removed otherwise.

use std::fmt;
use std::sync::Arc;

use crate::compaction::{CompactionFilter, Decision, ValueType};
use crate::rescale::holder::ConfigHolder;
use crate::rescale::sink::{emit, DiagnosticSink};
use crate::rescale::stats::{FilterStats, FilterStatsSnapshot};
use crate::rescale::types::{FilterConfig, RescaleRound};

/// Name reported to the host engine.
pub const FILTER_NAME: &str = "FlinkRescalingCompactionFilter";

/// Result of the key-only decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyDecision {
    Keep,
    Drop,
}

impl KeyDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyDecision::Keep => "keep",
            KeyDecision::Drop => "drop",
        }
    }
}

impl fmt::Display for KeyDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a key relates to the active config.
enum Verdict {
    /// No range check applies
    Passthrough,
    InRange,
    OutOfRange,
}

fn classify(config: Option<&FilterConfig>, key: &[u8]) -> Verdict {
    let Some(config) = config else {
        return Verdict::Passthrough;
    };
    match config.rescale_round {
        RescaleRound::Disabled => Verdict::Passthrough,
        RescaleRound::Zero | RescaleRound::One => {
            if key.is_empty() || config.range.has_absent_bound() {
                Verdict::Passthrough
            } else if config.range.contains(key) {
                Verdict::InRange
            } else {
                Verdict::OutOfRange
            }
        }
    }
}

/// One filter per compaction job. Holds a shared reference to the
/// factory's config holder, so it stays valid after the factory closes.
pub struct RescalingCompactionFilter {
    holder: Arc<ConfigHolder>,
    sink: Option<Arc<dyn DiagnosticSink>>,
    /// Counters for this filter only
    stats: FilterStats,
    /// Factory totals, credited with `stats` on drop
    totals: Option<Arc<FilterStats>>,
}

impl RescalingCompactionFilter {
    pub fn new(holder: Arc<ConfigHolder>) -> Self {
        Self::from_parts(holder, None, None)
    }

    pub fn with_sink(holder: Arc<ConfigHolder>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self::from_parts(holder, Some(sink), None)
    }

    pub(crate) fn from_parts(
        holder: Arc<ConfigHolder>,
        sink: Option<Arc<dyn DiagnosticSink>>,
        totals: Option<Arc<FilterStats>>,
    ) -> Self {
        Self {
            holder,
            sink,
            stats: FilterStats::new(),
            totals,
        }
    }

    /// Decisions made by this filter so far.
    pub fn stats(&self) -> FilterStatsSnapshot {
        self.stats.snapshot()
    }

    /// Decide whether `key` is still live. Never fails.
    pub fn decide(&self, key: &[u8]) -> KeyDecision {
        let decision = match classify(self.holder.current_config(), key) {
            Verdict::Passthrough => {
                self.stats.record_passthrough();
                KeyDecision::Keep
            }
            Verdict::InRange => {
                self.stats.record_kept();
                KeyDecision::Keep
            }
            Verdict::OutOfRange => {
                self.stats.record_dropped();
                KeyDecision::Drop
            }
        };

        emit(self.sink.as_deref(), &self.stats, || {
            self.describe(key, None, decision.as_str())
        });
        decision
    }

    /// Full per-entry decision, including the round tag in the value.
    pub fn filter_entry(
        &self,
        _level: u32,
        key: &[u8],
        _value_type: ValueType,
        existing_value: &[u8],
    ) -> Decision {
        let decision = self.entry_decision(key, existing_value);

        emit(self.sink.as_deref(), &self.stats, || {
            let outcome = match &decision {
                Decision::Keep => "keep",
                Decision::Remove => "remove",
                Decision::ChangeValue(_) => "retag",
            };
            self.describe(key, existing_value.first().copied(), outcome)
        });
        decision
    }

    fn entry_decision(&self, key: &[u8], existing_value: &[u8]) -> Decision {
        let config = match self.holder.current_config() {
            Some(config) if config.rescale_round.is_active() => config,
            _ => {
                self.stats.record_passthrough();
                return Decision::Keep;
            }
        };

        let Some(&tag) = existing_value.first() else {
            self.stats.record_passthrough();
            return Decision::Keep;
        };

        let round = config.rescale_round.ordinal();
        if tag == round {
            self.stats.record_kept();
            return Decision::Keep;
        }

        match classify(Some(config), key) {
            Verdict::Passthrough | Verdict::InRange => {
                self.stats.record_retagged();
                let mut new_value = existing_value.to_vec();
                new_value[0] = round;
                Decision::ChangeValue(new_value)
            }
            Verdict::OutOfRange => {
                self.stats.record_dropped();
                Decision::Remove
            }
        }
    }

    fn describe(&self, key: &[u8], value_tag: Option<u8>, outcome: &str) -> String {
        // Key-only decisions have no value, so no tag to report
        let tag = value_tag
            .map(|tag| format!(", value round tag {}", tag))
            .unwrap_or_default();
        match self.holder.current_config() {
            Some(config) => format!(
                "{FILTER_NAME}: key {}{}, rescale round {}, \
                 smallest key {}, largest key {} -> {}",
                hex::encode(key),
                tag,
                config.rescale_round,
                hex::encode(&config.range.smallest_key),
                hex::encode(&config.range.largest_key),
                outcome
            ),
            None => format!(
                "{FILTER_NAME}: key {}{}, unconfigured -> {}",
                hex::encode(key),
                tag,
                outcome
            ),
        }
    }
}

impl fmt::Debug for RescalingCompactionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RescalingCompactionFilter")
            .field("config", &self.holder.current_config())
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

impl Drop for RescalingCompactionFilter {
    fn drop(&mut self) {
        if let Some(totals) = &self.totals {
            totals.absorb(&self.stats.snapshot());
        }
    }
}

impl CompactionFilter for RescalingCompactionFilter {
    fn name(&self) -> &'static str {
        FILTER_NAME
    }

    fn filter(
        &self,
        level: u32,
        key: &[u8],
        value_type: ValueType,
        existing_value: &[u8],
    ) -> Decision {
        self.filter_entry(level, key, value_type, existing_value)
    }

    fn ignore_snapshots(&self) -> bool {
        true
    }
}

// ── Tests ──────────────────────────────────────────────────────────
