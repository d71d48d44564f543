//! Error types for tdplot-stats

use thiserror::Error;

/// Errors raised by the statistical routines
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// Bin edges are too few, unordered, or non-finite
    #[error("Invalid bin edges: {message}")]
    InvalidBinEdges { message: String },

    /// Paired sequences differ in length
    #[error("Length mismatch: x has {x_len} values, y has {y_len}")]
    LengthMismatch { x_len: usize, y_len: usize },

    /// A statistic was requested over an empty sequence
    #[error("Cannot compute statistics over empty input: {what}")]
    EmptyInput { what: String },

    /// Every sample fell outside the bin range
    #[error("No samples inside the bin range ({excluded} excluded)")]
    NoSamplesInRange { excluded: usize },

    /// Percentile outside [0, 100]
    #[error("Percentile must be within [0, 100], got {0}")]
    InvalidPercentile(f64),
}

impl StatsError {
    pub(crate) fn empty(what: impl Into<String>) -> Self {
        StatsError::EmptyInput { what: what.into() }
    }

    pub(crate) fn bins(message: impl Into<String>) -> Self {
        StatsError::InvalidBinEdges {
            message: message.into(),
        }
    }
}

/// Result type alias for statistical operations
pub type StatsResult<T> = Result<T, StatsError>;
