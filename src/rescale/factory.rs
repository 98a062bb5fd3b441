//! Factory that owns the config holder for one store generation.
//!
//! The host engine asks it for a filter per compaction job; the rescale
//! coordinator calls `configure` once when a rescale begins.
//!
//! Filters share the holder through `Arc`, so `close()` only drops the
//! factory's own references. A compaction still running when the factory
//! closes keeps reading a live holder until its filter is dropped.

use std::sync::{Arc, RwLock};

use crate::compaction::{CompactionFilterContext, CompactionFilterFactory};
use crate::error::{FilterError, Result};
use crate::rescale::filter::RescalingCompactionFilter;
use crate::rescale::holder::ConfigHolder;
use crate::rescale::sink::DiagnosticSink;
use crate::rescale::stats::{FilterStats, FilterStatsSnapshot};
use crate::rescale::types::FilterConfig;

/// Identity reported to the host engine for registration and logging.
pub const FACTORY_IDENTITY: &str = "FlinkRescalingCompactionFilterFactory";

/// Resources released by `close()`.
struct FactoryState {
    holder: Arc<ConfigHolder>,
    sink: Option<Arc<dyn DiagnosticSink>>,
}

pub struct RescalingCompactionFilterFactory {
    /// `None` once closed
    state: RwLock<Option<FactoryState>>,
    stats: Arc<FilterStats>,
}

impl RescalingCompactionFilterFactory {
    /// Factory with a fresh, unconfigured holder and no diagnostic sink.
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_sink(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self::build(Some(sink))
    }

    fn build(sink: Option<Arc<dyn DiagnosticSink>>) -> Self {
        Self {
            state: RwLock::new(Some(FactoryState {
                holder: Arc::new(ConfigHolder::new()),
                sink,
            })),
            stats: Arc::new(FilterStats::new()),
        }
    }

    /// Configure the rescale for this store generation.
    ///
    /// Fails with `AlreadyConfigured` on every call after the first, and
    /// with `Closed` once the factory is closed.
    pub fn configure(&self, config: FilterConfig) -> Result<()> {
        let state = self.state.read().unwrap();
        let state = state.as_ref().ok_or(FilterError::Closed)?;
        state.holder.configure_with(config)
    }

    /// A filter bound to this factory's holder.
    ///
    /// After `close()` this hands out a pass-through filter over an empty
    /// holder, so a late compaction job keeps every entry.
    pub fn new_filter_instance(&self) -> RescalingCompactionFilter {
        let state = self.state.read().unwrap();
        match state.as_ref() {
            Some(state) => RescalingCompactionFilter::from_parts(
                Arc::clone(&state.holder),
                state.sink.clone(),
                Some(Arc::clone(&self.stats)),
            ),
            None => {
                tracing::warn!(
                    factory = FACTORY_IDENTITY,
                    "filter requested from closed factory, returning pass-through filter"
                );
                RescalingCompactionFilter::from_parts(
                    Arc::new(ConfigHolder::new()),
                    None,
                    Some(Arc::clone(&self.stats)),
                )
            }
        }
    }

    /// Release the holder and sink. Idempotent.
    pub fn close(&self) {
        if self.state.write().unwrap().take().is_some() {
            tracing::debug!(factory = FACTORY_IDENTITY, "compaction filter factory closed");
        }
    }

    pub fn identity(&self) -> &'static str {
        FACTORY_IDENTITY
    }

    pub fn is_closed(&self) -> bool {
        self.state.read().unwrap().is_none()
    }

    pub fn is_configured(&self) -> bool {
        self.state
            .read()
            .unwrap()
            .as_ref()
            .is_some_and(|state| state.holder.is_configured())
    }

    /// Copy of the active config, if configured and not closed.
    pub fn current_config(&self) -> Option<FilterConfig> {
        self.state
            .read()
            .unwrap()
            .as_ref()
            .and_then(|state| state.holder.current_config().cloned())
    }

    /// Decisions made by filters this factory handed out. A filter's
    /// counts land here when it is dropped, so live filters are not
    /// included.
    pub fn stats(&self) -> FilterStatsSnapshot {
        self.stats.snapshot()
    }
}

impl Default for RescalingCompactionFilterFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CompactionFilterFactory for RescalingCompactionFilterFactory {
    type Filter = RescalingCompactionFilter;

    fn create_compaction_filter(&self, context: &CompactionFilterContext) -> Self::Filter {
        tracing::trace!(factory = FACTORY_IDENTITY, %context, "creating compaction filter");
        self.new_filter_instance()
    }

    fn name(&self) -> &'static str {
        FACTORY_IDENTITY
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compaction::{CompactionFilter, Decision, ValueType};
    use crate::rescale::filter::KeyDecision;
    use crate::rescale::types::RescaleRound;

    fn range_config() -> FilterConfig {
        FilterConfig::for_one(vec![0x00, 0x10], vec![0x00, 0x20])
    }

    #[test]
    fn test_identity() {
        let factory = RescalingCompactionFilterFactory::new();
        assert_eq!(factory.identity(), "FlinkRescalingCompactionFilterFactory");
        assert_eq!(CompactionFilterFactory::name(&factory), factory.identity());
    }

    #[test]
    fn test_new_factory_is_unconfigured_pass_through() {
        let factory = RescalingCompactionFilterFactory::new();
        assert!(!factory.is_configured());
        assert!(!factory.is_closed());
        assert!(factory.current_config().is_none());

        let filter = factory.new_filter_instance();
        assert_eq!(filter.decide(&[0x00, 0x30]), KeyDecision::Keep);
    }

    #[test]
    fn test_configure_then_filter() {
        let factory = RescalingCompactionFilterFactory::new();
        factory.configure(range_config()).unwrap();
        assert!(factory.is_configured());
        assert_eq!(factory.current_config(), Some(range_config()));

        let filter = factory.new_filter_instance();
        assert_eq!(filter.decide(&[0x00, 0x15]), KeyDecision::Keep);
        assert_eq!(filter.decide(&[0x00, 0x30]), KeyDecision::Drop);
        assert_eq!(filter.decide(&[0x00, 0x10]), KeyDecision::Keep);
        assert_eq!(filter.decide(&[0x00, 0x20]), KeyDecision::Drop);
    }

    #[test]
    fn test_configure_twice_fails() {
        let factory = RescalingCompactionFilterFactory::new();
        factory.configure(range_config()).unwrap();

        let err = factory
            .configure(FilterConfig::for_zero(vec![0x00], vec![0xff]))
            .unwrap_err();
        assert!(matches!(err, FilterError::AlreadyConfigured));
        assert_eq!(factory.current_config(), Some(range_config()));
    }

    #[test]
    fn test_filters_share_configuration() {
        let factory = RescalingCompactionFilterFactory::new();
        let early = factory.new_filter_instance();
        factory.configure(range_config()).unwrap();
        let late = factory.new_filter_instance();

        for key in [[0x00, 0x05], [0x00, 0x15], [0x00, 0x25]] {
            assert_eq!(early.decide(&key), late.decide(&key));
        }
        assert_eq!(early.decide(&[0x00, 0x25]), KeyDecision::Drop);
    }

    #[test]
    fn test_close_is_idempotent() {
        let factory = RescalingCompactionFilterFactory::new();
        factory.close();
        factory.close();
        assert!(factory.is_closed());
        assert!(!factory.is_configured());
    }

    #[test]
    fn test_configure_after_close_fails() {
        let factory = RescalingCompactionFilterFactory::new();
        factory.close();
        let err = factory.configure(range_config()).unwrap_err();
        assert!(matches!(err, FilterError::Closed));
    }

    #[test]
    fn test_in_flight_filter_survives_close() {
        let factory = RescalingCompactionFilterFactory::new();
        factory.configure(range_config()).unwrap();
        let filter = factory.new_filter_instance();

        factory.close();

        assert_eq!(filter.decide(&[0x00, 0x15]), KeyDecision::Keep);
        assert_eq!(filter.decide(&[0x00, 0x30]), KeyDecision::Drop);
    }

    #[test]
    fn test_filter_after_close_is_pass_through() {
        let factory = RescalingCompactionFilterFactory::new();
        factory.configure(range_config()).unwrap();
        factory.close();

        let filter = factory.new_filter_instance();
        assert_eq!(filter.decide(&[0x00, 0x30]), KeyDecision::Keep);
        assert_eq!(
            filter.filter(0, &[0x00, 0x30], ValueType::Value, &[RescaleRound::Zero.ordinal()]),
            Decision::Keep
        );
    }

    #[test]
    fn test_create_compaction_filter_via_trait() {
        let factory = RescalingCompactionFilterFactory::new();
        factory.configure(range_config()).unwrap();

        let ctx = CompactionFilterContext {
            is_full_compaction: true,
            ..Default::default()
        };
        let filter = factory.create_compaction_filter(&ctx);
        assert_eq!(filter.name(), "FlinkRescalingCompactionFilter");
        assert_eq!(
            filter.filter(0, &[0x00, 0x30], ValueType::Value, &[RescaleRound::Zero.ordinal(), 7]),
            Decision::Remove
        );
    }

    #[test]
    fn test_stats_aggregate_across_filters() {
        let factory = RescalingCompactionFilterFactory::new();
        factory.configure(range_config()).unwrap();

        let a = factory.new_filter_instance();
        let b = factory.new_filter_instance();
        a.decide(&[0x00, 0x15]);
        b.decide(&[0x00, 0x30]);
        b.decide(&[0x00, 0x31]);
        drop(a);
        drop(b);

        let stats = factory.stats();
        assert_eq!(stats.kept, 1);
        assert_eq!(stats.dropped, 2);
        assert_eq!(stats.total_decisions(), 3);
    }

    #[test]
    fn test_live_filter_counts_stay_local_until_drop() {
        let factory = RescalingCompactionFilterFactory::new();
        factory.configure(range_config()).unwrap();

        let filter = factory.new_filter_instance();
        filter.decide(&[0x00, 0x15]);
        filter.decide(&[0x00, 0x30]);

        assert_eq!(filter.stats().total_decisions(), 2);
        assert_eq!(factory.stats().total_decisions(), 0);

        drop(filter);
        let stats = factory.stats();
        assert_eq!(stats.kept, 1);
        assert_eq!(stats.dropped, 1);

        // Filters handed out after close still report back
        factory.close();
        let late = factory.new_filter_instance();
        late.decide(&[0x00, 0x30]);
        drop(late);
        assert_eq!(factory.stats().passthrough, 1);
    }
}
