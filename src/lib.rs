//! Compaction-time key filter that discards state left behind by
//! keyed-state rescaling.
//!
//! A [`RescalingCompactionFilterFactory`] is registered with the store once.
//! When a rescale begins the coordinator calls
//! [`configure`](RescalingCompactionFilterFactory::configure) exactly once
//! with the key range this instance keeps; from then on every compaction
//! drops entries outside that range.
//!
//! ```
//! use rescaling_filter::{FilterConfig, KeyDecision, RescalingCompactionFilterFactory};
//!
//! let factory = RescalingCompactionFilterFactory::new();
//! factory
//!     .configure(FilterConfig::for_one(vec![0x00, 0x10], vec![0x00, 0x20]))
//!     .unwrap();
//!
//! let filter = factory.new_filter_instance();
//! assert_eq!(filter.decide(&[0x00, 0x10]), KeyDecision::Keep);
//! assert_eq!(filter.decide(&[0x00, 0x20]), KeyDecision::Drop);
//! ```

pub mod compaction;
pub mod error;
pub mod rescale;

#[cfg(feature = "rocksdb")]
pub mod rocks;

pub use compaction::{
    CompactionFilter, CompactionFilterContext, CompactionFilterFactory, Decision, ValueType,
};
pub use error::{FilterError, Result};
pub use rescale::{
    ConfigHolder, DiagnosticSink, FilterConfig, FilterStatsSnapshot, KeyDecision, KeyRange,
    RescaleRound, RescalingCompactionFilter, RescalingCompactionFilterFactory, TracingSink,
};
