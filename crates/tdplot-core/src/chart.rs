//! Shared panel plumbing for plotters charts
//!
//! Every figure panel is a cartesian chart over `f64` data limits. Plotters
//! does not clip elements to the plotting area, so rectangles are clamped and
//! polylines are cut at the limits before they are drawn.

use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::element::DashedPathElement;
use plotters::prelude::{
    Cartesian2d, ChartBuilder, ChartContext, DrawingArea, DrawingBackend, IntoFont, PathElement,
    SeriesLabelPosition, ShapeStyle, Text,
};
use plotters::style::Color as _;
use plotters::style::{BLACK, WHITE};
use serde::{Deserialize, Serialize};

use crate::colormap::Color;
use crate::error::{validation, RenderError, RenderResult};

pub(crate) type Chart<'a, DB> =
    ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

pub(crate) const MARGIN: u32 = 10;
pub(crate) const X_LABEL_AREA: u32 = 40;
pub(crate) const Y_LABEL_AREA: u32 = 55;
pub(crate) const FONT: &str = "sans-serif";
/// Dash and gap length of dashed lines, in pixels
pub(crate) const DASH: (u32, u32) = (10, 6);

/// Axis limits of a panel in data units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl Limits {
    pub fn new(x: (f64, f64), y: (f64, f64)) -> Self {
        Self { x, y }
    }

    pub fn validate(&self) -> RenderResult<()> {
        validation::validate_limits(self.x.0, self.x.1)?;
        validation::validate_limits(self.y.0, self.y.1)
    }

    pub fn contains(&self, (x, y): (f64, f64)) -> bool {
        x >= self.x.0 && x <= self.x.1 && y >= self.y.0 && y <= self.y.1
    }

    pub fn width(&self) -> f64 {
        self.x.1 - self.x.0
    }

    pub fn height(&self) -> f64 {
        self.y.1 - self.y.0
    }

    /// Clamp a rectangle to the limits; `None` when nothing is left
    pub fn clamp_rect(&self, x: (f64, f64), y: (f64, f64)) -> Option<[(f64, f64); 2]> {
        let x0 = x.0.max(self.x.0);
        let x1 = x.1.min(self.x.1);
        let y0 = y.0.max(self.y.0);
        let y1 = y.1.min(self.y.1);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some([(x0, y0), (x1, y1)])
    }

    /// Clamp a point onto the limits
    pub fn clamp_point(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (x.clamp(self.x.0, self.x.1), y.clamp(self.y.0, self.y.1))
    }
}

/// Stroke settings for a line series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: Color,
    pub width: u32,
    pub dashed: bool,
}

impl LineStyle {
    pub fn solid(color: Color, width: u32) -> Self {
        Self {
            color,
            width,
            dashed: false,
        }
    }

    pub fn dashed(color: Color, width: u32) -> Self {
        Self {
            color,
            width,
            dashed: true,
        }
    }

    pub(crate) fn shape(&self) -> ShapeStyle {
        stroke(self.color, self.width)
    }
}

/// A straight guide line such as the `y = x` diagonal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub style: LineStyle,
}

impl ReferenceLine {
    /// Dashed blue `y = x` from `lo` to `hi`
    pub fn diagonal(lo: f64, hi: f64) -> Self {
        Self {
            from: (lo, lo),
            to: (hi, hi),
            style: LineStyle::dashed(Color::BLUE, 3),
        }
    }
}

pub(crate) fn fill(color: Color) -> ShapeStyle {
    ShapeStyle {
        color: color.to_plotters(),
        filled: true,
        stroke_width: 0,
    }
}

pub(crate) fn stroke(color: Color, width: u32) -> ShapeStyle {
    ShapeStyle {
        color: color.to_plotters(),
        filled: false,
        stroke_width: width,
    }
}

/// Cut a polyline into the pieces that lie inside `limits`
///
/// Each segment is clipped with Liang-Barsky; a segment leaving the box ends
/// the current piece.
pub fn clip_polyline(points: &[(f64, f64)], limits: &Limits) -> Vec<Vec<(f64, f64)>> {
    let mut pieces = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();

    if points.len() == 1 {
        if limits.contains(points[0]) {
            pieces.push(vec![points[0]]);
        }
        return pieces;
    }

    for pair in points.windows(2) {
        match clip_segment(pair[0], pair[1], limits) {
            Some((a, b)) => {
                if current.last() != Some(&a) {
                    if !current.is_empty() {
                        pieces.push(std::mem::take(&mut current));
                    }
                    current.push(a);
                }
                current.push(b);
            }
            None => {
                if !current.is_empty() {
                    pieces.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

fn clip_segment(
    a: (f64, f64),
    b: (f64, f64),
    limits: &Limits,
) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    let checks = [
        (-dx, a.0 - limits.x.0),
        (dx, limits.x.1 - a.0),
        (-dy, a.1 - limits.y.0),
        (dy, limits.y.1 - a.1),
    ];
    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    let at = |t: f64| {
        if t == 0.0 {
            a
        } else if t == 1.0 {
            b
        } else {
            (a.0 + t * dx, a.1 + t * dy)
        }
    };
    Some((at(t0), at(t1)))
}

/// Build the cartesian chart of one panel
///
/// Without `labels` no text is drawn at all, which keeps rendering
/// independent of system fonts.
pub(crate) fn build_chart<'a, DB: DrawingBackend>(
    area: &'a DrawingArea<DB, Shift>,
    limits: &Limits,
    title: Option<&str>,
    labels: bool,
) -> RenderResult<Chart<'a, DB>> {
    limits.validate()?;
    let mut builder = ChartBuilder::on(area);
    builder.margin(MARGIN);
    if labels {
        if let Some(title) = title {
            builder.caption(title, (FONT, 18));
        }
        builder
            .x_label_area_size(X_LABEL_AREA)
            .y_label_area_size(Y_LABEL_AREA);
    }
    builder
        .build_cartesian_2d(limits.x.0..limits.x.1, limits.y.0..limits.y.1)
        .map_err(RenderError::backend)
}

/// Axis ticks and descriptions
pub(crate) fn draw_axes<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    x_label: Option<&str>,
    y_label: Option<&str>,
) -> RenderResult<()> {
    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh();
    if let Some(label) = x_label {
        mesh.x_desc(label);
    }
    if let Some(label) = y_label {
        mesh.y_desc(label);
    }
    mesh.draw().map_err(RenderError::backend)
}

/// Draw a polyline clipped to `limits`, optionally registering a legend entry
pub(crate) fn draw_polyline<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    points: &[(f64, f64)],
    limits: &Limits,
    style: LineStyle,
    label: Option<&str>,
) -> RenderResult<()> {
    let pieces: Vec<Vec<(f64, f64)>> = clip_polyline(points, limits)
        .into_iter()
        .filter(|piece| piece.len() > 1)
        .collect();
    let shape = style.shape();
    let anno = if style.dashed {
        chart
            .draw_series(
                pieces
                    .into_iter()
                    .map(|piece| DashedPathElement::new(piece, DASH.0, DASH.1, shape)),
            )
            .map_err(RenderError::backend)?
    } else {
        chart
            .draw_series(pieces.into_iter().map(|piece| PathElement::new(piece, shape)))
            .map_err(RenderError::backend)?
    };
    if let Some(label) = label {
        anno.label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], shape));
    }
    Ok(())
}

pub(crate) fn draw_legend<'a, DB: DrawingBackend + 'a>(
    chart: &mut Chart<'a, DB>,
) -> RenderResult<()> {
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.9))
        .border_style(BLACK)
        .draw()
        .map_err(RenderError::backend)
}

/// Bold panel letter in the top-left corner
pub(crate) fn draw_panel_letter<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    letter: &str,
) -> RenderResult<()> {
    let x = (Y_LABEL_AREA + MARGIN + 8) as i32;
    let y = (MARGIN + 8) as i32;
    area.draw(&Text::new(
        letter.to_string(),
        (x, y),
        (FONT, 20).into_font().style(plotters::style::FontStyle::Bold),
    ))
    .map_err(RenderError::backend)
}

/// Sub-area in which one data unit spans the same pixel length on both axes
///
/// `reserved` is the pixel width and height taken by label areas and margins.
pub(crate) fn equal_aspect_area<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    limits: &Limits,
    reserved: (u32, u32),
) -> DrawingArea<DB, Shift> {
    let (w, h) = area.dim_in_pixel();
    let avail_w = w.saturating_sub(reserved.0) as f64;
    let avail_h = h.saturating_sub(reserved.1) as f64;
    let scale = (avail_w / limits.width()).min(avail_h / limits.height());
    if !scale.is_finite() || scale <= 0.0 {
        return area.margin(0, 0, 0, 0);
    }
    let pad_x = ((avail_w - limits.width() * scale) / 2.0).floor() as i32;
    let pad_y = ((avail_h - limits.height() * scale) / 2.0).floor() as i32;
    area.margin(pad_y, pad_y, pad_x, pad_x)
}
