//! Key-group rescaling filter.
//!
//! After a rescale each store instance keeps only its own key-group range.
//! Entries outside it are dropped during background compaction instead of
//! by a full rewrite pass.

pub mod types;
pub mod holder;
pub mod stats;
pub mod sink;
pub mod filter;
pub mod factory;

pub use types::{FilterConfig, KeyRange, RescaleRound};
pub use holder::ConfigHolder;
pub use stats::{FilterStats, FilterStatsSnapshot};
pub use sink::{DiagnosticSink, TracingSink, DECISION_TARGET};
pub use filter::{KeyDecision, RescalingCompactionFilter, FILTER_NAME};
pub use factory::{RescalingCompactionFilterFactory, FACTORY_IDENTITY};
