//! Write-once configuration cell shared by every filter of one store
//! generation.
//!
//! Backed by `OnceLock`: the single `configure` publishes the config with
//! release semantics and every reader does one acquire load, so a reader
//! sees either nothing or the complete config. After that the read path
//! takes no lock.

use std::sync::OnceLock;

use crate::error::{FilterError, Result};
use crate::rescale::types::{FilterConfig, KeyRange, RescaleRound};

#[derive(Debug, Default)]
pub struct ConfigHolder {
    config: OnceLock<FilterConfig>,
}

impl ConfigHolder {
    /// Create an unconfigured holder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the rescale config. Succeeds exactly once per holder.
    pub fn configure(
        &self,
        rescale_round: RescaleRound,
        smallest_key: impl Into<Vec<u8>>,
        largest_key: impl Into<Vec<u8>>,
    ) -> Result<()> {
        self.configure_with(FilterConfig::new(
            rescale_round,
            KeyRange::new(smallest_key, largest_key),
        ))
    }

    /// Same as [`configure`](Self::configure) with a prebuilt config.
    ///
    /// A second call fails with `AlreadyConfigured` and the first config
    /// stays in force, whatever the arguments.
    pub fn configure_with(&self, config: FilterConfig) -> Result<()> {
        if config.rescale_round.is_active() {
            let range = &config.range;
            if range.has_absent_bound() {
                tracing::warn!(
                    round = %config.rescale_round,
                    smallest_key = %hex::encode(&range.smallest_key),
                    largest_key = %hex::encode(&range.largest_key),
                    "key range has an absent bound, filter will keep every entry"
                );
            } else if range.is_inverted() {
                tracing::warn!(
                    round = %config.rescale_round,
                    smallest_key = %hex::encode(&range.smallest_key),
                    largest_key = %hex::encode(&range.largest_key),
                    "inverted key range, filter will drop every entry"
                );
            }
        }

        let round = config.rescale_round;
        match self.config.set(config) {
            Ok(()) => {
                tracing::info!(round = %round, "rescaling compaction filter configured");
                Ok(())
            }
            Err(rejected) => {
                tracing::warn!(
                    rejected_round = %rejected.rescale_round,
                    "rescaling compaction filter is already configured"
                );
                Err(FilterError::AlreadyConfigured)
            }
        }
    }

    /// The published config, or `None` while unconfigured.
    pub fn current_config(&self) -> Option<&FilterConfig> {
        self.config.get()
    }

    pub fn is_configured(&self) -> bool {
        self.config.get().is_some()
    }
}

// ── Tests ──────────────────────────────────────────────────────────
