//! Rescale types: the round marker, the retained key range, and the
//! config that combines them.
//!
//! JSON layout of a config (bounds are raw byte arrays):
//! ```text
//! {"rescale_round":"One","smallest_key":[0,16],"largest_key":[0,32]}
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};

// ── Rescale Round ──────────────────────────────────────────────────

/// Which of two overlapping rescale generations is being retired.
///
/// The ordinal is fixed: it is the value the binding layer passes across
/// the boundary and the tag byte stored at the front of every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RescaleRound {
    /// No filtering; every entry passes through.
    Disabled = 0,
    Zero = 1,
    One = 2,
}

impl RescaleRound {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// True for `Zero` and `One`.
    pub fn is_active(self) -> bool {
        match self {
            RescaleRound::Disabled => false,
            RescaleRound::Zero | RescaleRound::One => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RescaleRound::Disabled => "disabled",
            RescaleRound::Zero => "zero",
            RescaleRound::One => "one",
        }
    }
}

impl TryFrom<u8> for RescaleRound {
    type Error = FilterError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(RescaleRound::Disabled),
            1 => Ok(RescaleRound::Zero),
            2 => Ok(RescaleRound::One),
            other => Err(FilterError::InvalidRescaleRound(other as i64)),
        }
    }
}

impl TryFrom<i32> for RescaleRound {
    type Error = FilterError;

    fn try_from(value: i32) -> Result<Self> {
        u8::try_from(value)
            .map_err(|_| FilterError::InvalidRescaleRound(value as i64))
            .and_then(RescaleRound::try_from)
    }
}

impl fmt::Display for RescaleRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Key Range ──────────────────────────────────────────────────────

/// Half-open `[smallest_key, largest_key)` range of serialized keys this
/// store instance keeps. Ordering is byte-lexicographic.
///
/// A zero-length bound counts as absent and a range with an absent bound
/// never drops keys. An inverted range (`smallest_key > largest_key`)
/// contains nothing, so every key falls outside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyRange {
    pub smallest_key: Vec<u8>,
    pub largest_key: Vec<u8>,
}

impl KeyRange {
    pub fn new(smallest_key: impl Into<Vec<u8>>, largest_key: impl Into<Vec<u8>>) -> Self {
        Self {
            smallest_key: smallest_key.into(),
            largest_key: largest_key.into(),
        }
    }

    pub fn has_absent_bound(&self) -> bool {
        self.smallest_key.is_empty() || self.largest_key.is_empty()
    }

    pub fn is_inverted(&self) -> bool {
        self.smallest_key > self.largest_key
    }

    /// `smallest_key <= key < largest_key`.
    ///
    /// Does not consult `has_absent_bound`; callers decide what an absent
    /// bound means for them.
    pub fn contains(&self, key: &[u8]) -> bool {
        key >= self.smallest_key.as_slice() && key < self.largest_key.as_slice()
    }
}

// ── Filter Config ──────────────────────────────────────────────────

/// Round plus range, created once per rescale event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterConfig {
    pub rescale_round: RescaleRound,
    #[serde(flatten)]
    pub range: KeyRange,
}

impl FilterConfig {
    pub fn new(rescale_round: RescaleRound, range: KeyRange) -> Self {
        Self { rescale_round, range }
    }

    pub fn for_zero(smallest_key: impl Into<Vec<u8>>, largest_key: impl Into<Vec<u8>>) -> Self {
        Self::new(RescaleRound::Zero, KeyRange::new(smallest_key, largest_key))
    }

    pub fn for_one(smallest_key: impl Into<Vec<u8>>, largest_key: impl Into<Vec<u8>>) -> Self {
        Self::new(RescaleRound::One, KeyRange::new(smallest_key, largest_key))
    }

    /// Pass-through config with no bounds.
    pub fn disabled() -> Self {
        Self::new(RescaleRound::Disabled, KeyRange::new(Vec::new(), Vec::new()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Read a JSON config from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

// ── Tests ──────────────────────────────────────────────────────────
