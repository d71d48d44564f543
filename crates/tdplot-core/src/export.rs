//! Figure export
//!
//! Supports writing figures to:
//! - PNG: raster image through the bitmap backend
//! - SVG: scalable vector graphics
//!
//! Every written figure is recorded in a [`FigureManifest`] that the
//! pipeline stores next to the images as `manifest.json`.

use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::{BitMapBackend, DrawingArea, DrawingBackend, IntoDrawingArea, SVGBackend};
use plotters::style::WHITE;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ExportSettings;
use crate::error::{validation, ExportError, PlotResult, RenderError, RenderResult};

/// File name of the manifest written next to the figures
pub const MANIFEST_FILE: &str = "manifest.json";

/// Export format for figures
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// PNG raster image
    Png,
    /// SVG scalable vector graphics
    Svg,
}

impl ExportFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
        }
    }

    /// Get MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Svg => "image/svg+xml",
        }
    }
}

impl ExportSettings {
    /// Get suggested filename based on format
    pub fn suggested_filename(&self, base: &str) -> String {
        format!("{}.{}", base, self.format.extension())
    }
}

/// Something that can be drawn onto a full drawing area and saved
pub trait Figure {
    /// File stem of the figure
    fn name(&self) -> String;

    /// Canvas size overriding the configured one
    fn size(&self) -> Option<(u32, u32)> {
        None
    }

    /// Draw onto `root`; `labels` off means no text at all
    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        labels: bool,
    ) -> RenderResult<()>;
}

/// One written figure
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportedFigure {
    pub name: String,
    pub path: PathBuf,
    pub format: ExportFormat,
    pub mime_type: String,
    pub dimensions: (u32, u32),
}

/// A figure that was not produced, with the reason
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkippedFigure {
    pub name: String,
    pub reason: String,
}

/// Record of one pipeline run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FigureManifest {
    pub figures: Vec<ExportedFigure>,
    pub skipped: Vec<SkippedFigure>,
    /// Number of (origin, target) pairs that survived filtering
    pub pairs: usize,
    /// Pairs dropped by the validity masks
    pub dropped_pairs: usize,
    pub software_version: String,
}

impl Default for FigureManifest {
    fn default() -> Self {
        Self {
            figures: Vec::new(),
            skipped: Vec::new(),
            pairs: 0,
            dropped_pairs: 0,
            software_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl FigureManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, figure: ExportedFigure) {
        self.figures.push(figure);
    }

    pub fn skip(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        self.skipped.push(SkippedFigure {
            name: name.into(),
            reason: reason.into(),
        });
    }

    /// Look up a written figure by name
    pub fn get(&self, name: &str) -> Option<&ExportedFigure> {
        self.figures.iter().find(|f| f.name == name)
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ExportError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write `manifest.json` into `dir`
    pub fn write(&self, dir: &Path) -> PlotResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(MANIFEST_FILE);
        std::fs::write(&path, self.to_json()?)?;
        Ok(path)
    }
}

fn render_on<DB: DrawingBackend, F: Figure>(
    root: DrawingArea<DB, Shift>,
    figure: &F,
    labels: bool,
) -> RenderResult<()> {
    root.fill(&WHITE).map_err(RenderError::backend)?;
    figure.draw(&root, labels)?;
    root.present().map_err(RenderError::backend)
}

/// Draw `figure` and write it into `dir` in the configured format
///
/// The directory is created when missing. Figure names must be plain file
/// stems.
pub fn export_figure<F: Figure>(
    figure: &F,
    dir: &Path,
    settings: &ExportSettings,
) -> PlotResult<ExportedFigure> {
    let name = figure.name();
    let plain = !name.is_empty()
        && Path::new(&name).file_name().map(|n| n == name.as_str()) == Some(true);
    if !plain {
        return Err(ExportError::InvalidPath {
            path: dir.join(&name),
        }
        .into());
    }
    let dimensions = figure
        .size()
        .unwrap_or((settings.width, settings.height));
    validation::validate_dimensions(dimensions.0, dimensions.1)?;

    std::fs::create_dir_all(dir)?;
    let path = dir.join(settings.suggested_filename(&name));
    match settings.format {
        ExportFormat::Png => render_on(
            BitMapBackend::new(&path, dimensions).into_drawing_area(),
            figure,
            settings.labels,
        )?,
        ExportFormat::Svg => render_on(
            SVGBackend::new(&path, dimensions).into_drawing_area(),
            figure,
            settings.labels,
        )?,
    }
    info!(figure = %name, path = %path.display(), "figure written");

    Ok(ExportedFigure {
        name,
        path,
        format: settings.format,
        mime_type: settings.format.mime_type().to_string(),
        dimensions,
    })
}
