//! Error types for the rescaling filter

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilterError>;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Compaction filter is already configured")]
    AlreadyConfigured,

    #[error("Compaction filter factory is closed")]
    Closed,

    #[error("Invalid rescale round ordinal: {0}")]
    InvalidRescaleRound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Diagnostic sink error: {0}")]
    Sink(String),
}

impl FilterError {
    /// Get error code for the binding layer
    pub fn code(&self) -> &'static str {
        match self {
            FilterError::AlreadyConfigured => "ALREADY_CONFIGURED",
            FilterError::Closed => "FACTORY_CLOSED",
            FilterError::InvalidRescaleRound(_) => "INVALID_RESCALE_ROUND",
            FilterError::Io(_) | FilterError::Json(_) => "INVALID_CONFIG",
            FilterError::Sink(_) => "SINK_ERROR",
        }
    }
}
