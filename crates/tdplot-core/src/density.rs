//! Binned bivariate density plots
//!
//! A [`DensityPlot`] couples a normalized 2D histogram with the conditional
//! mean and 5th/95th percentile curves of y per x bin. Empty cells are
//! missing rather than zero and are painted with the colormap's bad color.

use ndarray::Array2;
use plotters::coord::Shift;
use plotters::prelude::{
    BitMapBackend, ChartBuilder, DrawingArea, DrawingBackend, IntoDrawingArea, Rectangle,
};
use plotters::style::WHITE;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tdplot_stats::{BinEdges, ConditionalSummary, Histogram2D, StatsResult};

use crate::chart::{self, Limits, LineStyle, ReferenceLine};
use crate::colormap::{viridis, Color, Colormap};
use crate::error::{PlotResult, RenderError, RenderResult};

/// Size of images produced by [`render_density`]
pub const DEFAULT_RASTER_SIZE: (u32, u32) = (640, 480);

const COLORBAR_WIDTH: u32 = 90;
const COLORBAR_STEPS: usize = 64;

/// How data units map onto pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aspect {
    /// One data unit has the same pixel length on both axes
    #[default]
    Equal,
    /// Fill the panel
    Auto,
}

/// Labels, limits and decorations of one panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelStyle {
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    /// Panel letter drawn in the top-left corner
    pub letter: Option<String>,
    /// Axis limits; the bin range when unset
    pub x_limits: Option<(f64, f64)>,
    pub y_limits: Option<(f64, f64)>,
    pub reference_lines: Vec<ReferenceLine>,
    pub colorbar: bool,
    pub legend: bool,
    /// Draw any text at all
    pub labels: bool,
}

impl Default for PanelStyle {
    fn default() -> Self {
        Self {
            x_label: None,
            y_label: None,
            letter: None,
            x_limits: None,
            y_limits: None,
            reference_lines: Vec::new(),
            colorbar: true,
            legend: true,
            labels: true,
        }
    }
}

impl PanelStyle {
    pub fn with_axis_labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_label = Some(x.into());
        self.y_label = Some(y.into());
        self
    }

    pub fn with_limits(mut self, x: (f64, f64), y: (f64, f64)) -> Self {
        self.x_limits = Some(x);
        self.y_limits = Some(y);
        self
    }

    pub fn with_letter(mut self, letter: impl Into<String>) -> Self {
        self.letter = Some(letter.into());
        self
    }

    pub fn with_reference_line(mut self, line: ReferenceLine) -> Self {
        self.reference_lines.push(line);
        self
    }

    pub(crate) fn limits_or(&self, x: (f64, f64), y: (f64, f64)) -> Limits {
        Limits::new(self.x_limits.unwrap_or(x), self.y_limits.unwrap_or(y))
    }
}

/// Mean line of the overlay
pub fn mean_line_style() -> LineStyle {
    LineStyle::solid(Color::RED.with_alpha(0.8), 3)
}

/// 5th and 95th percentile lines of the overlay
pub fn percentile_line_style() -> LineStyle {
    LineStyle::dashed(Color::RED.with_alpha(0.8), 3)
}

/// A computed density plot, ready to draw
#[derive(Debug, Clone)]
pub struct DensityPlot {
    histogram: Histogram2D,
    density: Array2<Option<f64>>,
    max_density: f64,
    summary: ConditionalSummary,
    aspect: Aspect,
    colormap: Colormap,
}

impl DensityPlot {
    /// Bin the pairs and summarize y per x bin
    ///
    /// Inputs are only read. Pairs outside either bin range are excluded;
    /// an empty input or a grid without a single pair is an error.
    pub fn compute(
        x: &[f64],
        y: &[f64],
        x_bins: &BinEdges,
        y_bins: &BinEdges,
        aspect: Aspect,
    ) -> StatsResult<Self> {
        let summary = ConditionalSummary::compute(x, y, x_bins)?;
        let histogram = Histogram2D::from_pairs(x, y, x_bins, y_bins)?;
        let density = histogram.masked_density()?;
        let max_density = density.iter().flatten().copied().fold(0.0, f64::max);
        debug!(
            counted = histogram.total(),
            excluded = histogram.excluded(),
            populated_bins = summary.populated_bins(),
            "density computed"
        );
        Ok(Self {
            histogram,
            density,
            max_density,
            summary,
            aspect,
            colormap: viridis().with_bad(Color::WHITE),
        })
    }

    pub fn histogram(&self) -> &Histogram2D {
        &self.histogram
    }

    /// Density per cell, `None` where the cell is empty
    pub fn density(&self) -> &Array2<Option<f64>> {
        &self.density
    }

    /// Top of the color scale
    pub fn max_density(&self) -> f64 {
        self.max_density
    }

    pub fn summary(&self) -> &ConditionalSummary {
        &self.summary
    }

    pub fn aspect(&self) -> Aspect {
        self.aspect
    }

    /// Display color of cell `(i, j)`
    pub fn cell_color(&self, i: usize, j: usize) -> Color {
        let value = self.density.get((i, j)).copied().flatten();
        self.colormap
            .sample_opt(value.map(|d| d / self.max_density))
    }

    fn data_range(&self) -> ((f64, f64), (f64, f64)) {
        (self.histogram.x_edges().range(), self.histogram.y_edges().range())
    }

    /// Draw the panel onto `area`
    pub fn draw<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        style: &PanelStyle,
    ) -> RenderResult<()> {
        let (x_range, y_range) = self.data_range();
        let limits = style.limits_or(x_range, y_range);
        limits.validate()?;

        let (main, bar) = if style.colorbar {
            let width = area.dim_in_pixel().0;
            let (main, bar) = area.split_horizontally(width.saturating_sub(COLORBAR_WIDTH) as i32);
            (main, Some(bar))
        } else {
            (area.margin(0, 0, 0, 0), None)
        };

        let plot_area = match self.aspect {
            Aspect::Equal => {
                let label_space = if style.labels {
                    (chart::Y_LABEL_AREA, chart::X_LABEL_AREA + 30)
                } else {
                    (0, 0)
                };
                chart::equal_aspect_area(
                    &main,
                    &limits,
                    (
                        label_space.0 + 2 * chart::MARGIN,
                        label_space.1 + 2 * chart::MARGIN,
                    ),
                )
            }
            Aspect::Auto => main.margin(0, 0, 0, 0),
        };

        let mut chart = chart::build_chart(&plot_area, &limits, None, style.labels)?;
        if style.labels {
            chart::draw_axes(&mut chart, style.x_label.as_deref(), style.y_label.as_deref())?;
        }

        let x_edges = self.histogram.x_edges();
        let y_edges = self.histogram.y_edges();
        let mut cells = Vec::new();
        for i in 0..x_edges.num_bins() {
            for j in 0..y_edges.num_bins() {
                if self.density[[i, j]].is_none() {
                    continue;
                }
                let (Some(xb), Some(yb)) = (x_edges.bounds(i), y_edges.bounds(j)) else {
                    continue;
                };
                if let Some(rect) = limits.clamp_rect(xb, yb) {
                    cells.push(Rectangle::new(rect, chart::fill(self.cell_color(i, j))));
                }
            }
        }
        chart.draw_series(cells).map_err(RenderError::backend)?;

        for line in &style.reference_lines {
            chart::draw_polyline(&mut chart, &[line.from, line.to], &limits, line.style, None)?;
        }

        let legend = style.labels && style.legend;
        for (i, run) in self.summary.segments(&self.summary.mean).iter().enumerate() {
            let label = (legend && i == 0).then_some("mean");
            chart::draw_polyline(&mut chart, run, &limits, mean_line_style(), label)?;
        }
        for (series, name) in [
            (&self.summary.p5, Some("5th and 95th percentile")),
            (&self.summary.p95, None),
        ] {
            for (i, run) in self.summary.segments(series).iter().enumerate() {
                let label = name.filter(|_| legend && i == 0);
                chart::draw_polyline(&mut chart, run, &limits, percentile_line_style(), label)?;
            }
        }
        if legend {
            chart::draw_legend(&mut chart)?;
        }

        if let Some(bar) = bar {
            self.draw_colorbar(&bar, style.labels)?;
        }
        if let (true, Some(letter)) = (style.labels, style.letter.as_deref()) {
            chart::draw_panel_letter(area, letter)?;
        }
        Ok(())
    }

    fn draw_colorbar<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        labels: bool,
    ) -> RenderResult<()> {
        let top = if self.max_density > 0.0 {
            self.max_density
        } else {
            1.0
        };
        let tick_format = |v: &f64| format!("{:.1e}", v);
        let mut builder = ChartBuilder::on(area);
        builder.margin(chart::MARGIN);
        if labels {
            builder
                .x_label_area_size(chart::X_LABEL_AREA)
                .y_label_area_size(COLORBAR_WIDTH - 30);
        }
        let mut bar = builder
            .build_cartesian_2d(0.0..1.0, 0.0..top)
            .map_err(RenderError::backend)?;
        let step = top / COLORBAR_STEPS as f64;
        bar.draw_series((0..COLORBAR_STEPS).map(|k| {
            let y0 = k as f64 * step;
            let color = self.colormap.sample((k as f64 + 0.5) / COLORBAR_STEPS as f64);
            Rectangle::new([(0.0, y0), (1.0, y0 + step)], chart::fill(color))
        }))
        .map_err(RenderError::backend)?;
        if labels {
            bar.configure_mesh()
                .disable_mesh()
                .disable_x_axis()
                .y_desc("Probability density")
                .y_label_formatter(&tick_format)
                .draw()
                .map_err(RenderError::backend)?;
        }
        Ok(())
    }

    /// Draw into an in-memory RGB image
    pub fn rasterize(&self, style: &PanelStyle, (width, height): (u32, u32)) -> PlotResult<RasterImage> {
        crate::error::validation::validate_dimensions(width, height)?;
        let mut rgb = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut rgb, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(RenderError::backend)?;
            self.draw(&root, style)?;
            root.present().map_err(RenderError::backend)?;
        }
        Ok(RasterImage {
            width,
            height,
            rgb,
        })
    }
}

/// An RGB image held in memory, row-major with three bytes per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl RasterImage {
    /// Pixel at `(x, y)` counted from the top-left corner
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let at = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.rgb[at], self.rgb[at + 1], self.rgb[at + 2]])
    }
}

/// Compute a density plot and draw it at [`DEFAULT_RASTER_SIZE`]
pub fn render_density(
    x_values: &[f64],
    y_values: &[f64],
    x_bins: &BinEdges,
    y_bins: &BinEdges,
    aspect: Aspect,
    style: &PanelStyle,
) -> PlotResult<(DensityPlot, RasterImage)> {
    let plot = DensityPlot::compute(x_values, y_values, x_bins, y_bins, aspect)?;
    let image = plot.rasterize(style, DEFAULT_RASTER_SIZE)?;
    Ok((plot, image))
}
