//! Configuration for tdplot-core
//!
//! Everything that used to be a module-level constant (input paths, the
//! routing horizon, the target stop, map framing) lives here and is handed to
//! the pipeline explicitly.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::export::ExportFormat;

/// Pipeline-wide configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Input and output locations
    pub paths: PathsConfig,
    /// Stop whose result file feeds the map figure
    pub target_node_id: Option<String>,
    /// Time axis settings
    pub time: TimeConfig,
    /// Loading and caching behavior
    pub loading: LoadingConfig,
    /// Geographic scatter framing
    pub map: MapConfig,
    /// Output format and size
    pub export: ExportSettings,
}

/// Input and output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of the routing results
    pub results_dir: PathBuf,
    /// Where figures and the manifest are written
    pub figures_dir: PathBuf,
    /// Subdirectory of `results_dir` holding the per-target files
    pub stats_subdir: String,
    /// Node listing CSV (`lat`, `lon`, `desc`)
    pub nodes_file: PathBuf,
    /// Shell-style pattern for per-target result files
    pub result_pattern: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            figures_dir: PathBuf::from("figures"),
            stats_subdir: "all_to_all_stats".to_string(),
            nodes_file: PathBuf::from("data/main.day.nodes.csv"),
            result_pattern: tdplot_io::RESULT_FILE_PATTERN.to_string(),
        }
    }
}

impl PathsConfig {
    /// Directory scanned for per-target result files; also holds the matrix caches
    pub fn stats_dir(&self) -> PathBuf {
        self.results_dir.join(&self.stats_subdir)
    }
}

/// Time axis configuration (all values in minutes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Routing horizon
    pub horizon: f64,
    /// Replacement for unreachable pairs; must exceed the horizon
    pub unreachable_value: f64,
    /// Seconds in one plotted unit
    pub seconds_per_unit: f64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            horizon: 180.0,
            unreachable_value: 240.0,
            seconds_per_unit: 60.0,
        }
    }
}

/// Loading and caching configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    /// Read at most this many result files
    pub file_limit: Option<usize>,
    /// Ignore cached observable matrices
    pub recompute: bool,
    /// Files read for the quick-look figures
    pub quicklook_files: usize,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            file_limit: None,
            recompute: false,
            quicklook_files: 7,
        }
    }
}

/// Background used in place of map tiles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileStyle {
    #[default]
    Dark,
    Light,
}

/// Geographic scatter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Web Mercator zoom level
    pub zoom: u8,
    pub tile_style: TileStyle,
    /// Percentiles of projected x bounding the frame
    pub x_percentiles: (f64, f64),
    /// Percentiles of projected y bounding the frame
    pub y_percentiles: (f64, f64),
    /// Scatter marker area, as in a matplotlib `s`
    pub marker_size: u32,
    /// File name prefix of the map grid
    pub name_prefix: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: 10,
            tile_style: TileStyle::Dark,
            x_percentiles: (5.0, 95.0),
            y_percentiles: (6.0, 98.0),
            marker_size: 12,
            name_prefix: "helsinki_test_".to_string(),
        }
    }
}

/// Figure output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub format: ExportFormat,
    pub width: u32,
    pub height: u32,
    /// Draw titles, ticks and legends; off renders without any fonts
    pub labels: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            width: 1200,
            height: 900,
            labels: true,
        }
    }
}

impl PlotConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a TOML or JSON file, chosen by extension, and validate it
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&text)?,
            _ => Self::from_toml(&text)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let time = &self.time;
        if !(time.horizon > 0.0) {
            return Err(ConfigError::OutOfRange(
                "horizon must be positive".to_string(),
            ));
        }

        if !(time.unreachable_value > time.horizon) {
            return Err(ConfigError::OutOfRange(
                "unreachable_value must exceed horizon".to_string(),
            ));
        }

        if !(time.seconds_per_unit > 0.0) {
            return Err(ConfigError::OutOfRange(
                "seconds_per_unit must be positive".to_string(),
            ));
        }

        check_percentiles("x_percentiles", self.map.x_percentiles)?;
        check_percentiles("y_percentiles", self.map.y_percentiles)?;

        if self.export.width == 0 || self.export.height == 0 {
            return Err(ConfigError::OutOfRange(
                "export dimensions must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

fn check_percentiles(name: &str, (lo, hi): (f64, f64)) -> Result<(), ConfigError> {
    let valid = (0.0..=100.0).contains(&lo) && (0.0..=100.0).contains(&hi) && lo < hi;
    if !valid {
        return Err(ConfigError::InvalidPercentiles(format!(
            "{} must be increasing within 0..=100, got ({}, {})",
            name, lo, hi
        )));
    }
    Ok(())
}

/// Configuration loading or validation error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Value is out of valid range
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// Percentile bounds are not an increasing pair in 0..=100
    #[error("Invalid percentiles: {0}")]
    InvalidPercentiles(String),

    /// Text could not be parsed or serialized
    #[error("Parse error: {0}")]
    Parse(String),

    /// Config file could not be read
    #[error("Cannot read {path}: {message}")]
    Read { path: PathBuf, message: String },
}
