//! Step-filled density histograms
//!
//! Several distributions share one panel; each is drawn as a filled step
//! outline with a black edge, in ascending z-order.

use plotters::coord::Shift;
use plotters::prelude::{DrawingArea, DrawingBackend, PathElement, Polygon, Rectangle};
use serde::{Deserialize, Serialize};

use tdplot_stats::{BinEdges, Histogram1D, StatsResult};

use crate::chart;
use crate::colormap::Color;
use crate::density::PanelStyle;
use crate::error::{RenderError, RenderResult};

/// Pixels per point of edge width
const PIXELS_PER_POINT: f64 = 2.0;

/// Look of one step histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepStyle {
    pub label: String,
    pub fill: Color,
    pub edge_color: Color,
    /// Edge width in points
    pub edge_width: f64,
    /// Higher values are drawn later
    pub z_order: i32,
}

impl StepStyle {
    pub fn new(label: impl Into<String>, fill: Color, edge_width: f64) -> Self {
        Self {
            label: label.into(),
            fill,
            edge_color: Color::BLACK,
            edge_width,
            z_order: 0,
        }
    }

    pub fn with_z_order(mut self, z_order: i32) -> Self {
        self.z_order = z_order;
        self
    }

    /// Edge width in whole pixels, at least one
    pub fn edge_pixels(&self) -> u32 {
        (self.edge_width * PIXELS_PER_POINT).round().max(1.0) as u32
    }
}

/// A normalized histogram with its drawing style
#[derive(Debug, Clone)]
pub struct StepHistogram {
    edges: BinEdges,
    density: Vec<f64>,
    style: StepStyle,
}

impl StepHistogram {
    /// Bin `values` and normalize to a density
    pub fn compute(values: &[f64], edges: &BinEdges, style: StepStyle) -> StatsResult<Self> {
        let hist = Histogram1D::from_values(values, edges);
        let density = hist.density()?;
        Ok(Self {
            edges: edges.clone(),
            density,
            style,
        })
    }

    pub fn density(&self) -> &[f64] {
        &self.density
    }

    pub fn style(&self) -> &StepStyle {
        &self.style
    }

    /// Closed step outline from the first to the last edge along y = 0
    pub fn outline(&self) -> Vec<(f64, f64)> {
        let edges = self.edges.as_slice();
        let mut points = Vec::with_capacity(2 * self.density.len() + 2);
        points.push((edges[0], 0.0));
        for (i, &d) in self.density.iter().enumerate() {
            points.push((edges[i], d));
            points.push((edges[i + 1], d));
        }
        points.push((edges[edges.len() - 1], 0.0));
        points
    }

    pub fn max_density(&self) -> f64 {
        self.density.iter().copied().fold(0.0, f64::max)
    }
}

/// Draw several step histograms into one panel
///
/// Without explicit y limits the panel spans 0 to 5% above the tallest bin.
pub fn draw_step_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    histograms: &[StepHistogram],
    style: &PanelStyle,
) -> RenderResult<()> {
    if histograms.is_empty() {
        return Err(RenderError::EmptyFigure {
            what: "step histogram panel".to_string(),
        });
    }

    let x_range = histograms
        .iter()
        .map(|h| h.edges.range())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |acc, r| {
            (acc.0.min(r.0), acc.1.max(r.1))
        });
    let top = histograms
        .iter()
        .map(StepHistogram::max_density)
        .fold(0.0, f64::max);
    let top = if top > 0.0 { top * 1.05 } else { 1.0 };
    let limits = style.limits_or(x_range, (0.0, top));

    let mut chart = chart::build_chart(area, &limits, None, style.labels)?;
    if style.labels {
        chart::draw_axes(&mut chart, style.x_label.as_deref(), style.y_label.as_deref())?;
    }

    let mut order: Vec<&StepHistogram> = histograms.iter().collect();
    order.sort_by_key(|h| h.style.z_order);

    let legend = style.labels && style.legend;
    for hist in order {
        let outline: Vec<(f64, f64)> = hist
            .outline()
            .into_iter()
            .map(|p| limits.clamp_point(p))
            .collect();
        let fill = chart::fill(hist.style.fill);
        let anno = chart
            .draw_series(std::iter::once(Polygon::new(outline.clone(), fill)))
            .map_err(RenderError::backend)?;
        if legend {
            anno.label(hist.style.label.as_str()).legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 15, y + 5)], fill)
            });
        }
        let edge = chart::stroke(hist.style.edge_color, hist.style.edge_pixels());
        chart
            .draw_series(std::iter::once(PathElement::new(outline, edge)))
            .map_err(RenderError::backend)?;
    }
    if legend {
        chart::draw_legend(&mut chart)?;
    }

    if let (true, Some(letter)) = (style.labels, style.letter.as_deref()) {
        chart::draw_panel_letter(area, letter)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotters::prelude::{BitMapBackend, IntoDrawingArea};
    use plotters::style::WHITE;

    fn unlabeled() -> PanelStyle {
        PanelStyle {
            labels: false,
            ..PanelStyle::default()
        }
    }

    fn hist(values: &[f64], style: StepStyle) -> StepHistogram {
        let edges = BinEdges::new(vec![0.0, 1.0, 2.0, 4.0]).unwrap();
        StepHistogram::compute(values, &edges, style).unwrap()
    }

    #[test]
    fn test_outline_shape() {
        let h = hist(&[0.5, 1.5, 1.5, 3.0], StepStyle::new("a", Color::BLUE, 1.0));
        let outline = h.outline();
        assert_eq!(outline.first(), Some(&(0.0, 0.0)));
        assert_eq!(outline.last(), Some(&(4.0, 0.0)));
        assert_eq!(outline.len(), 2 * 3 + 2);
        assert_eq!(outline[1], (0.0, 0.25));
        assert_eq!(outline[3], (1.0, 0.5));
        // last bin is twice as wide
        assert_eq!(outline[5], (2.0, 0.125));
    }

    #[test]
    fn test_density_integrates_to_one() {
        let h = hist(&[0.1, 0.2, 1.1, 2.5, 3.9], StepStyle::new("a", Color::BLUE, 1.0));
        let widths = [1.0, 1.0, 2.0];
        let mass: f64 = h.density().iter().zip(widths).map(|(d, w)| d * w).sum();
        assert!((mass - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_edge_width_keeps_fractional_points() {
        let widths: Vec<u32> = [2.0, 1.5, 1.0, 0.0]
            .into_iter()
            .map(|w| StepStyle::new("a", Color::BLUE, w).edge_pixels())
            .collect();
        assert_eq!(widths, vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_draw_fills_by_z_order() {
        let low = hist(&[0.5, 1.5], StepStyle::new("low", Color::BLUE, 0.0).with_z_order(-10));
        let high = hist(&[0.5, 1.5], StepStyle::new("high", Color::RED, 0.0).with_z_order(10));

        let mut rgb = vec![0u8; 200 * 200 * 3];
        {
            let root = BitMapBackend::with_buffer(&mut rgb, (200, 200)).into_drawing_area();
            root.fill(&WHITE).unwrap();
            // red drawn last despite coming first in the slice
            draw_step_panel(&root, &[high, low], &unlabeled()).unwrap();
            root.present().unwrap();
        }
        let red = rgb.chunks_exact(3).filter(|p| *p == [255, 0, 0]).count();
        let blue = rgb.chunks_exact(3).filter(|p| *p == [0, 0, 255]).count();
        assert!(red > 0);
        assert_eq!(blue, 0);
    }

    #[test]
    fn test_empty_panel_rejected() {
        let mut rgb = vec![0u8; 10 * 10 * 3];
        let root = BitMapBackend::with_buffer(&mut rgb, (10, 10)).into_drawing_area();
        assert!(matches!(
            draw_step_panel(&root, &[], &unlabeled()),
            Err(RenderError::EmptyFigure { .. })
        ));
    }
}
