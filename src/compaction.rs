//! Host engine interface for compaction filters.
//!
//! The key-value engine owns compaction scheduling and threading. It asks
//! a [`CompactionFilterFactory`] for one filter per compaction job, then
//! calls [`CompactionFilter::filter`] once per entry, in key order, from
//! whichever worker thread runs that job.

use std::fmt;

/// Outcome of filtering one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Remove,
    /// Keep the entry with this value in place of the existing one.
    ChangeValue(Vec<u8>),
}

/// Kind of entry being compacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Value,
    MergeOperand,
    BlobIndex,
}

/// Information about the compaction a filter is created for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompactionFilterContext {
    /// Compaction covers all data files
    pub is_full_compaction: bool,
    /// Requested by the client rather than scheduled automatically
    pub is_manual_compaction: bool,
    pub column_family_id: u32,
}

impl fmt::Display for CompactionFilterContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cf={} full={} manual={}",
            self.column_family_id, self.is_full_compaction, self.is_manual_compaction
        )
    }
}

pub trait CompactionFilter: Send + Sync {
    /// Name written to the engine log on startup.
    fn name(&self) -> &'static str;

    fn filter(
        &self,
        level: u32,
        key: &[u8],
        value_type: ValueType,
        existing_value: &[u8],
    ) -> Decision;

    /// When true the engine may apply the filter to entries still visible
    /// to open snapshots.
    fn ignore_snapshots(&self) -> bool {
        false
    }
}

pub trait CompactionFilterFactory: Send + Sync {
    type Filter: CompactionFilter;

    fn create_compaction_filter(&self, context: &CompactionFilterContext) -> Self::Filter;

    fn name(&self) -> &'static str;
}
