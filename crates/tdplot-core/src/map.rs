//! Stop maps: per-stop observables scattered over a Web Mercator frame
//!
//! Coordinates are projected to tile pixels at a fixed zoom level. The frame
//! is cut at percentiles of the projected points so that a few remote stops
//! do not shrink the city to a dot. No tiles are fetched; the frame is
//! painted in a flat color matching the configured tile style.

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt::Display;

use plotters::coord::Shift;
use plotters::prelude::{Circle, Cross, DrawingArea, DrawingBackend, Rectangle};
use serde::{Deserialize, Serialize};
use tracing::debug;

use tdplot_io::Node;
use tdplot_stats::{percentile, StatsError};

use crate::chart::{self, Limits};
use crate::colormap::{plasma, viridis, Color, Normalize, ScalarMappable};
use crate::config::{MapConfig, TileStyle};
use crate::dataset::names;
use crate::derived;
use crate::error::{PlotError, PlotResult, RenderError, RenderResult};
use crate::export::Figure;

/// Pixels per tile edge
pub const TILE_SIZE: f64 = 256.0;

/// Observables of the multi-measure map grid, in panel order
pub const MAP_OBSERVABLES: [&str; 12] = [
    names::MIN_TEMPORAL_DISTANCE,
    names::MIN_TEMPORAL_DISTANCE_WITH_MIN_N_BOARDINGS,
    names::MEAN_TEMPORAL_DISTANCE,
    names::MEAN_TEMPORAL_DISTANCE_WITH_MIN_N_BOARDINGS,
    derived::MIN_MINUS_MIN_MIN_N_BOARDINGS,
    derived::MEAN_MINUS_MEAN_MIN_N_BOARDINGS,
    names::MAX_TEMPORAL_DISTANCE,
    derived::MEAN_MINUS_MIN,
    derived::MAX_MINUS_MIN,
    derived::MAX_MINUS_MEAN,
    derived::MEAN_MINUS_MIN_PER_MIN,
    derived::MAX_MINUS_MIN_PER_MIN,
];

/// Web Mercator tile-pixel coordinates of a WGS84 position
///
/// `x` grows eastward and `y` southward, both in `0 ..= 256 * 2^zoom`.
pub fn project(lat: f64, lon: f64, zoom: u8) -> (f64, f64) {
    let scale = TILE_SIZE * 2f64.powi(zoom as i32);
    let x = (lon + 180.0) / 360.0 * scale;
    let y = (1.0 - lat.to_radians().tan().asinh() / PI) / 2.0 * scale;
    (x, y)
}

/// Visible part of the projected plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    /// Left and right pixel bounds
    pub x: (f64, f64),
    /// Top and bottom pixel bounds; `top < bottom`
    pub y: (f64, f64),
}

impl MapView {
    /// Frame spanning the given percentiles of the projected points
    pub fn framing(
        projected: &[(f64, f64)],
        x_percentiles: (f64, f64),
        y_percentiles: (f64, f64),
    ) -> PlotResult<Self> {
        let xs: Vec<f64> = projected.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = projected.iter().map(|p| p.1).collect();
        let view = Self {
            x: (
                percentile(&xs, x_percentiles.0)?,
                percentile(&xs, x_percentiles.1)?,
            ),
            y: (
                percentile(&ys, y_percentiles.0)?,
                percentile(&ys, y_percentiles.1)?,
            ),
        };
        debug!(?view, "map frame");
        Ok(view)
    }

    pub fn contains(&self, (x, y): (f64, f64)) -> bool {
        x >= self.x.0 && x <= self.x.1 && y >= self.y.0 && y <= self.y.1
    }

    /// Chart limits; y is negated so that north stays up
    fn limits(&self) -> Limits {
        Limits::new(self.x, (-self.y.1, -self.y.0))
    }
}

/// Value preprocessing and color scale for one observable
#[derive(Debug, Clone)]
pub struct MapStyle {
    /// Treat NaN as unreachable (+inf) before scaling
    pub nan_as_unreachable: bool,
    /// Values are divided by this before color mapping
    pub divisor: f64,
    pub mappable: ScalarMappable,
    /// Draw smallest values first
    pub ascending: bool,
}

impl MapStyle {
    /// Styling chosen from the observable name
    ///
    /// Relative measures use viridis over 0..1; differences are shown in
    /// minutes with viridis over 0..30; everything else in minutes with
    /// reversed plasma over 0..90. Differences are drawn ascending, other
    /// observables descending so short times end up on top.
    pub fn for_observable(name: &str) -> Self {
        if name.contains("relative") {
            Self {
                nan_as_unreachable: true,
                divisor: 1.0,
                mappable: ScalarMappable::new(Normalize::new(0.0, 1.0), viridis()),
                ascending: false,
            }
        } else if name.contains("minus") {
            Self {
                nan_as_unreachable: true,
                divisor: 60.0,
                mappable: ScalarMappable::new(Normalize::new(0.0, 30.0), viridis()),
                ascending: true,
            }
        } else {
            Self {
                nan_as_unreachable: false,
                divisor: 60.0,
                mappable: ScalarMappable::new(Normalize::new(0.0, 90.0), plasma().reversed()),
                ascending: false,
            }
        }
    }

    /// Value as plotted
    pub fn transform(&self, value: f64) -> f64 {
        let value = if self.nan_as_unreachable && value.is_nan() {
            f64::INFINITY
        } else {
            value
        };
        value / self.divisor
    }
}

/// Cross drawn on target stops
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetMarker {
    pub color: Color,
    pub size: u32,
    pub width: u32,
}

impl Default for TargetMarker {
    fn default() -> Self {
        Self {
            color: Color::RED,
            size: 10,
            width: 3,
        }
    }
}

/// Flat stand-in for map tiles
pub fn tile_background(style: TileStyle) -> Color {
    match style {
        TileStyle::Dark => Color::rgb(0.16, 0.17, 0.19),
        TileStyle::Light => Color::rgb(0.92, 0.92, 0.90),
    }
}

/// A projected, colored stop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
    pub color: Color,
}

/// One observable scattered over the stop network
#[derive(Debug, Clone)]
pub struct StopMap {
    pub title: String,
    /// Points in drawing order
    pub points: Vec<MapPoint>,
    pub view: MapView,
    pub targets: Vec<(f64, f64)>,
    pub marker: TargetMarker,
    pub background: Color,
    pub point_radius: u32,
}

impl StopMap {
    /// Project, color and order the stops for `observable`
    ///
    /// `values[i]` belongs to `nodes[i]`. `targets` are `(lat, lon)` pairs.
    /// Stops whose plotted value is still NaN get no marker; the frame is
    /// taken over every stop.
    pub fn build(
        observable: &str,
        nodes: &[Node],
        values: &[f64],
        targets: &[(f64, f64)],
        config: &MapConfig,
    ) -> PlotResult<Self> {
        if nodes.is_empty() {
            return Err(StatsError::EmptyInput {
                what: format!("stops for {}", observable),
            }
            .into());
        }
        if nodes.len() != values.len() {
            return Err(StatsError::LengthMismatch {
                x_len: nodes.len(),
                y_len: values.len(),
            }
            .into());
        }

        let style = MapStyle::for_observable(observable);
        let projected: Vec<(f64, f64)> = nodes
            .iter()
            .map(|node| project(node.lat, node.lon, config.zoom))
            .collect();
        let view = MapView::framing(&projected, config.x_percentiles, config.y_percentiles)?;

        let mut points: Vec<MapPoint> = projected
            .iter()
            .zip(values)
            .map(|(&(x, y), &raw)| (x, y, style.transform(raw)))
            .filter(|&(_, _, value)| !value.is_nan())
            .map(|(x, y, value)| MapPoint {
                x,
                y,
                value,
                color: style.mappable.to_rgba(value),
            })
            .collect();
        points.sort_by(|a, b| a.value.total_cmp(&b.value));
        if !style.ascending {
            points.reverse();
        }

        Ok(Self {
            title: observable.to_string(),
            points,
            view,
            targets: targets
                .iter()
                .map(|&(lat, lon)| project(lat, lon, config.zoom))
                .collect(),
            marker: TargetMarker::default(),
            background: tile_background(config.tile_style),
            point_radius: ((config.marker_size as f64).sqrt() / 2.0).ceil().max(1.0) as u32,
        })
    }

    /// Draw the map panel; points outside the frame are left out
    pub fn draw<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        labels: bool,
    ) -> RenderResult<()> {
        let limits = self.view.limits();
        let title = labels.then_some(self.title.as_str());
        let mut chart = chart::build_chart(area, &limits, title, labels)?;

        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(limits.x.0, limits.y.0), (limits.x.1, limits.y.1)],
                chart::fill(self.background),
            )))
            .map_err(RenderError::backend)?;

        let radius = self.point_radius;
        chart
            .draw_series(
                self.points
                    .iter()
                    .filter(|p| self.view.contains((p.x, p.y)))
                    .map(|p| Circle::new((p.x, -p.y), radius, chart::fill(p.color))),
            )
            .map_err(RenderError::backend)?;

        let cross = chart::stroke(self.marker.color, self.marker.width);
        let size = self.marker.size;
        chart
            .draw_series(
                self.targets
                    .iter()
                    .filter(|&&t| self.view.contains(t))
                    .map(|&(x, y)| Cross::new((x, -y), size, cross)),
            )
            .map_err(RenderError::backend)?;
        Ok(())
    }
}

/// File stem of the map grid: prefix, targets joined by `_`, suffix
pub fn multiple_measures_name<T: Display>(prefix: &str, targets: &[T]) -> String {
    let targets: Vec<String> = targets.iter().map(ToString::to_string).collect();
    format!("{}{}_multiple_measures", prefix, targets.join("_"))
}

/// The twelve-panel grid of one target's observables
#[derive(Debug, Clone)]
pub struct MapGrid {
    pub name: String,
    pub maps: Vec<StopMap>,
}

impl MapGrid {
    /// Panel grid rows and columns
    pub const SHAPE: (usize, usize) = (4, 3);

    /// One [`StopMap`] per entry of [`MAP_OBSERVABLES`]
    pub fn build(
        name: impl Into<String>,
        stats: &BTreeMap<String, Vec<f64>>,
        nodes: &[Node],
        config: &MapConfig,
    ) -> PlotResult<Self> {
        let maps = MAP_OBSERVABLES
            .iter()
            .map(|&observable| {
                let values = stats
                    .get(observable)
                    .ok_or_else(|| PlotError::MissingObservable(observable.to_string()))?;
                StopMap::build(observable, nodes, values, &[], config)
            })
            .collect::<PlotResult<Vec<_>>>()?;
        Ok(Self {
            name: name.into(),
            maps,
        })
    }
}

impl Figure for MapGrid {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn size(&self) -> Option<(u32, u32)> {
        Some((1500, 1000))
    }

    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        labels: bool,
    ) -> RenderResult<()> {
        let areas = root.split_evenly(Self::SHAPE);
        for (map, area) in self.maps.iter().zip(areas.iter()) {
            map.draw(area, labels)?;
        }
        Ok(())
    }
}
