//! Optional diagnostic channel for filter decisions.
//!
//! Writes are best effort. A failing sink is counted and otherwise
//! ignored; it never changes a decision.

use crate::error::Result;
use crate::rescale::stats::FilterStats;

/// Target used for per-key decision events.
pub const DECISION_TARGET: &str = "rescaling_filter::decisions";

/// Write-only sink for free-form diagnostic messages.
pub trait DiagnosticSink: Send + Sync {
    /// Whether messages would be recorded at all. Lets the filter skip
    /// formatting on the hot path.
    fn is_enabled(&self) -> bool {
        true
    }

    fn write(&self, message: &str) -> Result<()>;
}

/// Forwards messages to `tracing` at DEBUG level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn is_enabled(&self) -> bool {
        tracing::enabled!(target: DECISION_TARGET, tracing::Level::DEBUG)
    }

    fn write(&self, message: &str) -> Result<()> {
        tracing::debug!(target: DECISION_TARGET, "{}", message);
        Ok(())
    }
}

/// Format and deliver a message if a sink is present and enabled.
pub(crate) fn emit<F>(sink: Option<&dyn DiagnosticSink>, stats: &FilterStats, message: F)
where
    F: FnOnce() -> String,
{
    let Some(sink) = sink else {
        return;
    };
    if !sink.is_enabled() {
        return;
    }
    if sink.write(&message()).is_err() {
        stats.record_sink_failure();
    }
}

// ── Tests ──────────────────────────────────────────────────────────
