//! RocksDB binding for the rescaling filter (feature `rocksdb`).
//!
//! RocksDB only lets a filter change a value to a `'static` slice, so
//! this binding uses the key-only decision: out-of-range keys are removed,
//! everything else is kept.

use std::ffi::CStr;
use std::sync::Arc;

use rocksdb::compaction_filter::{CompactionFilter, Decision};
use rocksdb::compaction_filter_factory::{CompactionFilterContext, CompactionFilterFactory};
use rocksdb::Options;

use crate::rescale::{KeyDecision, RescalingCompactionFilter, RescalingCompactionFilterFactory};

pub struct RocksRescalingFilter {
    inner: RescalingCompactionFilter,
}

impl CompactionFilter for RocksRescalingFilter {
    fn filter(&mut self, _level: u32, key: &[u8], _value: &[u8]) -> Decision {
        match self.inner.decide(key) {
            KeyDecision::Keep => Decision::Keep,
            KeyDecision::Drop => Decision::Remove,
        }
    }

    fn name(&self) -> &CStr {
        c"FlinkRescalingCompactionFilter"
    }
}

/// Hands the shared factory to RocksDB, which takes ownership of the
/// registered factory object.
pub struct RocksRescalingFilterFactory {
    factory: Arc<RescalingCompactionFilterFactory>,
}

impl RocksRescalingFilterFactory {
    pub fn new(factory: Arc<RescalingCompactionFilterFactory>) -> Self {
        Self { factory }
    }
}

impl CompactionFilterFactory for RocksRescalingFilterFactory {
    type Filter = RocksRescalingFilter;

    fn create(&mut self, context: CompactionFilterContext) -> Self::Filter {
        tracing::trace!(
            full = context.is_full_compaction,
            manual = context.is_manual_compaction,
            "creating rocksdb rescaling filter"
        );
        RocksRescalingFilter {
            inner: self.factory.new_filter_instance(),
        }
    }

    fn name(&self) -> &CStr {
        c"FlinkRescalingCompactionFilterFactory"
    }
}

/// Register `factory` on the column family options.
pub fn install(opts: &mut Options, factory: Arc<RescalingCompactionFilterFactory>) {
    opts.set_compaction_filter_factory(RocksRescalingFilterFactory::new(factory));
}

#[cfg(test)]
mod tests {
    use rocksdb::DB;

    use super::*;
    use crate::rescale::FilterConfig;

    #[test]
    fn test_compaction_drops_out_of_range_keys() {
        let dir = tempfile::tempdir().unwrap();
        let factory = Arc::new(RescalingCompactionFilterFactory::new());

        let mut opts = Options::default();
        opts.create_if_missing(true);
        install(&mut opts, Arc::clone(&factory));

        let db = DB::open(&opts, dir.path()).unwrap();
        for key in [b"050", b"100", b"150", b"200", b"250"] {
            db.put(key, b"state").unwrap();
        }
        db.flush().unwrap();

        factory
            .configure(FilterConfig::for_one(b"100".to_vec(), b"200".to_vec()))
            .unwrap();
        db.compact_range::<&[u8], &[u8]>(None, None);

        assert!(db.get(b"050").unwrap().is_none());
        assert!(db.get(b"100").unwrap().is_some());
        assert!(db.get(b"150").unwrap().is_some());
        assert!(db.get(b"200").unwrap().is_none());
        assert!(db.get(b"250").unwrap().is_none());
    }
}
