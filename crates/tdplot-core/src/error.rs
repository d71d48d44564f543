//! Error types for tdplot-core
//!
//! Provides error handling for:
//! - Loading and assembling statistics
//! - Rendering
//! - Export
//! - Configuration

use std::path::PathBuf;
use thiserror::Error;

use tdplot_io::IoError;
use tdplot_stats::StatsError;

use crate::config::ConfigError;

/// Main error type for figure production
#[derive(Error, Debug)]
pub enum PlotError {
    /// Reading result files or caches failed
    #[error("Failed to load statistics: {0}")]
    Load(#[from] IoError),

    /// A statistic could not be computed
    #[error("Statistics error: {0}")]
    Stats(#[from] StatsError),

    /// Drawing failed
    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    /// Writing the figure failed
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Settings are valid on their own but unusable for the requested figure
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A required observable is absent from the loaded data
    #[error("Observable '{0}' is not available")]
    MissingObservable(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while drawing
#[derive(Error, Debug)]
pub enum RenderError {
    /// The plotting backend reported a failure
    #[error("Drawing backend error: {message}")]
    Backend { message: String },

    /// Nothing to draw
    #[error("Nothing to draw: {what}")]
    EmptyFigure { what: String },

    /// Plot limits are empty or inverted
    #[error("Invalid plot limits: {lo}..{hi}")]
    InvalidLimits { lo: f64, hi: f64 },
}

impl RenderError {
    /// Wrap a plotters error
    pub fn backend(err: impl std::fmt::Display) -> Self {
        RenderError::Backend {
            message: err.to_string(),
        }
    }
}

/// Errors related to export
#[derive(Error, Debug)]
pub enum ExportError {
    /// Invalid output path
    #[error("Invalid output path: {path}")]
    InvalidPath { path: PathBuf },

    /// Invalid dimensions
    #[error("Invalid dimensions: {width}x{height} (must be positive and within limits)")]
    InvalidDimensions { width: u32, height: u32 },

    /// Manifest could not be serialized
    #[error("Manifest serialization failed: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// Result type alias for figure operations
pub type PlotResult<T> = Result<T, PlotError>;

/// Result type alias for render operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Result type alias for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Validation utilities
pub mod validation {
    use super::*;

    const MAX_DIMENSION: u32 = 16384;
    const MIN_DIMENSION: u32 = 1;

    /// Validate export dimensions
    pub fn validate_dimensions(width: u32, height: u32) -> ExportResult<()> {
        if width < MIN_DIMENSION
            || height < MIN_DIMENSION
            || width > MAX_DIMENSION
            || height > MAX_DIMENSION
        {
            return Err(ExportError::InvalidDimensions { width, height });
        }
        Ok(())
    }

    /// Validate a plot range
    pub fn validate_limits(lo: f64, hi: f64) -> RenderResult<()> {
        if !(lo.is_finite() && hi.is_finite() && hi > lo) {
            return Err(RenderError::InvalidLimits { lo, hi });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_error_converts() {
        let err: PlotError = StatsError::EmptyInput {
            what: "x values".to_string(),
        }
        .into();
        assert!(err.to_string().contains("x values"));
    }

    #[test]
    fn test_export_error_display() {
        let err = ExportError::InvalidDimensions {
            width: 0,
            height: 100,
        };
        assert!(err.to_string().contains("0x100"));
    }

    #[test]
    fn test_validate_dimensions() {
        assert!(validation::validate_dimensions(1600, 800).is_ok());
        assert!(validation::validate_dimensions(0, 100).is_err());
        assert!(validation::validate_dimensions(20000, 1000).is_err());
    }

    #[test]
    fn test_validate_limits() {
        assert!(validation::validate_limits(0.0, 180.0).is_ok());
        assert!(validation::validate_limits(5.0, 5.0).is_err());
        assert!(validation::validate_limits(0.0, f64::NAN).is_err());
    }
}
