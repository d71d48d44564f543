//! The figure catalog
//!
//! - `all_to_all_stats`: six-panel summary of the flattened observables
//! - pairwise densities of one observable against another
//! - quick-look densities of the first few result files

use plotters::coord::Shift;
use plotters::prelude::{DrawingArea, DrawingBackend};
use tracing::debug;

use tdplot_stats::{finite_max, BinEdges, StatsError};

use crate::chart::ReferenceLine;
use crate::colormap::Color;
use crate::config::TimeConfig;
use crate::dataset::{names, symmetry_pairs, time_bins, FlattenedObservables, QuickLook};
use crate::density::{Aspect, DensityPlot, PanelStyle};
use crate::error::{PlotResult, RenderResult};
use crate::export::Figure;
use crate::histogram::{draw_step_panel, StepHistogram, StepStyle};

pub const SUMMARY: &str = "all_to_all_stats";
pub const MIN_VS_MAX: &str = "all_to_all_min_vs_max";
pub const MIN_VS_MEAN: &str = "all_to_all_min_vs_mean";
pub const MEAN_VS_MAX: &str = "all_to_all_mean_vs_max";
pub const MAX_MINUS_MIN_VS_MIN: &str = "all_to_all_max_minus_min_vs_min";
pub const MEAN_VS_MEAN_SYMMETRICITY: &str = "all_to_all_mean_vs_mean_symmetricity";
pub const MIN_BOARDINGS_VS_MEAN_BOARDINGS: &str = "all_to_all_min_boardings_vs_mean_boardings";
pub const QUICKLOOK: [&str; 3] = [
    "quicklook_min_vs_mean",
    "quicklook_mean_vs_max",
    "quicklook_min_vs_max",
];

/// Fill colors of the three-series step panels, min first
const STEP_COLORS: [(u8, u8, u8); 3] = [(44, 127, 184), (127, 205, 187), (237, 248, 177)];

/// x range of the summary density panels
const SUMMARY_X_LIMITS: (f64, f64) = (0.0, 140.0);

fn differences(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

fn required_max(values: &[f64], what: &str) -> PlotResult<f64> {
    finite_max(values).ok_or_else(|| {
        StatsError::EmptyInput {
            what: what.to_string(),
        }
        .into()
    })
}

/// One density plot saved as its own file
#[derive(Debug, Clone)]
pub struct DensityFigure {
    pub name: String,
    pub plot: DensityPlot,
    pub style: PanelStyle,
}

impl DensityFigure {
    fn compute(
        name: &str,
        x: &[f64],
        y: &[f64],
        x_bins: &BinEdges,
        y_bins: &BinEdges,
        aspect: Aspect,
        style: PanelStyle,
    ) -> PlotResult<Self> {
        let plot = DensityPlot::compute(x, y, x_bins, y_bins, aspect)?;
        debug!(figure = name, "density figure computed");
        Ok(Self {
            name: name.to_string(),
            plot,
            style,
        })
    }
}

impl Figure for DensityFigure {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        labels: bool,
    ) -> RenderResult<()> {
        let mut style = self.style.clone();
        style.labels &= labels;
        self.plot.draw(root, &style)
    }
}

/// A panel of the summary figure
#[derive(Debug, Clone)]
pub enum SummaryPanel {
    Steps {
        histograms: Vec<StepHistogram>,
        style: PanelStyle,
    },
    Density {
        plot: DensityPlot,
        style: PanelStyle,
    },
}

impl SummaryPanel {
    pub fn style(&self) -> &PanelStyle {
        match self {
            SummaryPanel::Steps { style, .. } | SummaryPanel::Density { style, .. } => style,
        }
    }

    fn draw<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        labels: bool,
    ) -> RenderResult<()> {
        let mut style = self.style().clone();
        style.labels &= labels;
        match self {
            SummaryPanel::Steps { histograms, .. } => draw_step_panel(area, histograms, &style),
            SummaryPanel::Density { plot, .. } => plot.draw(area, &style),
        }
    }
}

/// Six panels A to F on a 2x3 grid
#[derive(Debug, Clone)]
pub struct SummaryFigure {
    pub panels: Vec<SummaryPanel>,
}

impl SummaryFigure {
    pub const SHAPE: (usize, usize) = (2, 3);

    /// Compute every panel from the flattened observables
    pub fn build(data: &FlattenedObservables, time: &TimeConfig) -> PlotResult<Self> {
        let mins = data.get(names::MIN_TEMPORAL_DISTANCE)?;
        let means = data.get(names::MEAN_TEMPORAL_DISTANCE)?;
        let maxs = data.get(names::MAX_TEMPORAL_DISTANCE)?;
        let bins = &data.time_bins;

        let panels = vec![
            temporal_distance_pdf(mins, means, maxs, bins, time.horizon)?,
            mean_minus_min_vs_min(mins, means, bins)?,
            mean_minus_min_per_min_vs_min(mins, means, bins)?,
            boarding_count_distributions(
                data.get(names::MIN_N_BOARDINGS)?,
                data.get(names::MEAN_N_BOARDINGS)?,
                data.get(names::MAX_N_BOARDINGS)?,
            )?,
            min_vs_mean_n_boardings(mins, data.get(names::MEAN_N_BOARDINGS)?, bins)?,
            min_vs_n_journeys(mins, data.get(names::N_PARETO_OPTIMAL_TRIPS)?, bins)?,
        ];
        Ok(Self { panels })
    }
}

impl Figure for SummaryFigure {
    fn name(&self) -> String {
        SUMMARY.to_string()
    }

    fn size(&self) -> Option<(u32, u32)> {
        Some((1600, 800))
    }

    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        labels: bool,
    ) -> RenderResult<()> {
        let areas = root.split_evenly(Self::SHAPE);
        for (panel, area) in self.panels.iter().zip(areas.iter()) {
            panel.draw(area, labels)?;
        }
        Ok(())
    }
}

fn temporal_distance_pdf(
    mins: &[f64],
    means: &[f64],
    maxs: &[f64],
    time_bins: &BinEdges,
    horizon: f64,
) -> PlotResult<SummaryPanel> {
    let bins = time_bins.every_nth(3)?;
    let alphas = [1.0, 0.8, 0.6];
    let widths = [2.0, 1.5, 1.0];
    let labels = ["τ_min", "τ_mean", "τ_max"];
    let histograms = [mins, means, maxs]
        .iter()
        .enumerate()
        .map(|(i, values)| {
            let (r, g, b) = STEP_COLORS[i];
            let style = StepStyle::new(labels[i], Color::from_rgb256(r, g, b, alphas[i]), widths[i]);
            StepHistogram::compute(values, &bins, style)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let mut style = PanelStyle::default()
        .with_axis_labels("Temporal distance τ (min)", "Probability density P(τ)")
        .with_letter("A");
    style.x_limits = Some((0.0, horizon));
    Ok(SummaryPanel::Steps { histograms, style })
}

fn mean_minus_min_vs_min(mins: &[f64], means: &[f64], bins: &BinEdges) -> PlotResult<SummaryPanel> {
    let plot = DensityPlot::compute(mins, &differences(means, mins), bins, bins, Aspect::Auto)?;
    let style = PanelStyle::default()
        .with_axis_labels("τ_min", "τ_mean - τ_min")
        .with_limits(SUMMARY_X_LIMITS, (0.0, 80.0))
        .with_letter("B");
    Ok(SummaryPanel::Density { plot, style })
}

fn mean_minus_min_per_min_vs_min(
    mins: &[f64],
    means: &[f64],
    bins: &BinEdges,
) -> PlotResult<SummaryPanel> {
    let (x, y): (Vec<f64>, Vec<f64>) = mins
        .iter()
        .zip(means)
        .filter(|&(&min, _)| min > 0.0)
        .map(|(&min, &mean)| (min, (mean - min) / min))
        .unzip();
    let y_bins = BinEdges::linspace(0.0, 3.0, 100)?;
    let plot = DensityPlot::compute(&x, &y, bins, &y_bins, Aspect::Auto)?;
    let style = PanelStyle::default()
        .with_axis_labels("τ_min", "(τ_mean - τ_min) / τ_min")
        .with_limits(SUMMARY_X_LIMITS, (0.0, 2.0))
        .with_letter("C");
    Ok(SummaryPanel::Density { plot, style })
}

fn boarding_count_distributions(
    min_b: &[f64],
    mean_b: &[f64],
    max_b: &[f64],
) -> PlotResult<SummaryPanel> {
    let max_n = required_max(max_b, "boarding counts")?;
    let alphas = [1.0, 0.7, 1.0];
    let widths = [2.0, 2.0, 1.0];
    let z_orders = [-10, 10, 0];
    let labels = ["b_min", "b_mean,f.p.", "b_max,f.p."];
    let histograms = [min_b, mean_b, max_b]
        .iter()
        .enumerate()
        .map(|(i, values)| {
            // shift each series a little so overlapping bars stay visible
            let offset = -0.07 * (i as f64 - 1.0);
            // half a step past the top edge so the largest count is always binned
            let step = 0.2;
            let bins = BinEdges::arange(-0.1 + offset, max_n + 0.1 + offset + step / 2.0, step)?;
            let (r, g, b) = STEP_COLORS[i];
            let style = StepStyle::new(labels[i], Color::from_rgb256(r, g, b, alphas[i]), widths[i])
                .with_z_order(z_orders[i]);
            StepHistogram::compute(values, &bins, style)
        })
        .collect::<Result<Vec<_>, StatsError>>()?;
    let mut style = PanelStyle::default()
        .with_axis_labels("Number of boardings b", "Probability density P(b)")
        .with_letter("D");
    style.x_limits = Some((-0.15, max_n + 0.15));
    Ok(SummaryPanel::Steps { histograms, style })
}

fn min_vs_mean_n_boardings(
    mins: &[f64],
    mean_b: &[f64],
    bins: &BinEdges,
) -> PlotResult<SummaryPanel> {
    // all-walk data has no boardings at all; keep a valid axis
    let max_b = required_max(mean_b, "mean boarding counts")?.max(0.5);
    let y_bins = BinEdges::linspace(0.0, max_b, 50)?;
    let plot = DensityPlot::compute(mins, mean_b, bins, &y_bins, Aspect::Auto)?;
    let style = PanelStyle::default()
        .with_axis_labels("τ_min", "b_mean,f.p.")
        .with_limits(SUMMARY_X_LIMITS, (0.0, max_b))
        .with_letter("E");
    Ok(SummaryPanel::Density { plot, style })
}

fn min_vs_n_journeys(mins: &[f64], journeys: &[f64], bins: &BinEdges) -> PlotResult<SummaryPanel> {
    let max_n = required_max(journeys, "journey counts")?.max(0.0);
    let y_bins = BinEdges::linspace(-0.5, max_n + 0.5, max_n.round() as usize + 2)?;
    let plot = DensityPlot::compute(mins, journeys, bins, &y_bins, Aspect::Auto)?;
    let style = PanelStyle::default()
        .with_axis_labels("τ_min", "n_journeys")
        .with_limits(SUMMARY_X_LIMITS, (0.0, max_n.max(0.5)))
        .with_letter("F");
    Ok(SummaryPanel::Density { plot, style })
}

fn time_panel(x_label: &str, y_label: &str, horizon: f64) -> PanelStyle {
    PanelStyle::default()
        .with_axis_labels(x_label, y_label)
        .with_limits((0.0, horizon), (0.0, horizon))
}

/// The pairwise comparison figures that always have data
///
/// The symmetricity figure needs the full mean matrix and may be empty;
/// see [`symmetricity_figure`].
pub fn pairwise_figures(
    data: &FlattenedObservables,
    time: &TimeConfig,
) -> PlotResult<Vec<DensityFigure>> {
    let mins = data.get(names::MIN_TEMPORAL_DISTANCE)?;
    let means = data.get(names::MEAN_TEMPORAL_DISTANCE)?;
    let maxs = data.get(names::MAX_TEMPORAL_DISTANCE)?;
    let bins = &data.time_bins;
    let horizon = time.horizon;
    let diagonal = ReferenceLine::diagonal(0.0, horizon);

    let mut figures = Vec::with_capacity(5);
    for (name, x, y, x_label, y_label) in [
        (MIN_VS_MAX, mins, maxs, "min tdist", "max tdist"),
        (MIN_VS_MEAN, mins, means, "min tdist", "mean tdist"),
        (MEAN_VS_MAX, means, maxs, "mean tdist", "max tdist"),
    ] {
        let style = time_panel(x_label, y_label, horizon).with_reference_line(diagonal.clone());
        figures.push(DensityFigure::compute(
            name,
            x,
            y,
            bins,
            bins,
            Aspect::Equal,
            style,
        )?);
    }

    figures.push(DensityFigure::compute(
        MAX_MINUS_MIN_VS_MIN,
        mins,
        &differences(maxs, mins),
        bins,
        bins,
        Aspect::Equal,
        PanelStyle::default()
            .with_axis_labels("min tdist", "max - min tdist")
            .with_limits((0.0, 120.0), (0.0, 60.0)),
    )?);

    let min_b = data.get(names::MIN_N_BOARDINGS)?;
    let mean_b = data.get(names::MEAN_N_BOARDINGS)?;
    let max_b = required_max(mean_b, "mean boarding counts")?.max(0.5);
    let top = max_b.round().max(0.0);
    let x_bins = BinEdges::linspace(-0.5, 0.5 + top, top as usize + 2)?;
    let y_bins = BinEdges::linspace(0.0, max_b, 50)?;
    figures.push(DensityFigure::compute(
        MIN_BOARDINGS_VS_MEAN_BOARDINGS,
        min_b,
        &differences(mean_b, min_b),
        &x_bins,
        &y_bins,
        Aspect::Auto,
        PanelStyle::default()
            .with_axis_labels("b_min", "b_mean,f.p. - b_min")
            .with_limits((-0.5, max_b), (0.0, max_b)),
    )?);
    Ok(figures)
}

/// Mean temporal distance i to j against j to i
///
/// Matrix entries are in seconds and converted with `seconds_per_unit`.
/// `None` when no target is also an origin of another target.
pub fn symmetricity_figure(
    data: &FlattenedObservables,
    time: &TimeConfig,
) -> PlotResult<Option<DensityFigure>> {
    let (i_to_j, j_to_i) = symmetry_pairs(&data.mean_matrix);
    if i_to_j.is_empty() {
        return Ok(None);
    }
    let spu = time.seconds_per_unit;
    let x: Vec<f64> = i_to_j.iter().map(|v| v / spu).collect();
    let y: Vec<f64> = j_to_i.iter().map(|v| v / spu).collect();
    let figure = DensityFigure::compute(
        MEAN_VS_MEAN_SYMMETRICITY,
        &x,
        &y,
        &data.time_bins,
        &data.time_bins,
        Aspect::Equal,
        time_panel("mean tdist (i->j)", "mean tdist (j->i)", 120.0),
    )?;
    Ok(Some(figure))
}

/// Min, mean and max compared pairwise on the quick-look sample
pub fn quicklook_figures(quick: &QuickLook, time: &TimeConfig) -> PlotResult<Vec<DensityFigure>> {
    let bins = time_bins(time.horizon)?;
    let [min_vs_mean, mean_vs_max, min_vs_max] = QUICKLOOK;
    [
        (min_vs_mean, &quick.min, &quick.mean, "min tdist", "mean tdist"),
        (mean_vs_max, &quick.mean, &quick.max, "mean tdist", "max tdist"),
        (min_vs_max, &quick.min, &quick.max, "min tdist", "max tdist"),
    ]
    .into_iter()
    .map(|(name, x, y, x_label, y_label)| {
        DensityFigure::compute(
            name,
            x,
            y,
            &bins,
            &bins,
            Aspect::Equal,
            time_panel(x_label, y_label, time.horizon),
        )
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotters::prelude::{BitMapBackend, IntoDrawingArea};
    use plotters::style::WHITE;
    use tdplot_io::{KeyedStore, MemoryStore, ObservableMatrix};

    use crate::config::PlotConfig;
    use crate::dataset::load_flattened;

    fn dataset(rows: Vec<Vec<f64>>) -> FlattenedObservables {
        build_dataset(rows, false)
    }

    fn build_dataset(rows: Vec<Vec<f64>>, walk_only: bool) -> FlattenedObservables {
        let mut config = PlotConfig::default();
        config.paths.results_dir = "/nonexistent".into();
        let mut store: MemoryStore<ObservableMatrix> = MemoryStore::new();
        let scaled = |k: f64| -> Vec<Vec<f64>> {
            rows.iter()
                .map(|r| r.iter().map(|v| v * k).collect())
                .collect()
        };
        let shape = |v: f64| -> Vec<Vec<f64>> {
            rows.iter().map(|r| vec![v; r.len()]).collect()
        };
        let ramp = || -> Vec<Vec<f64>> {
            rows.iter()
                .map(|r| (1..=r.len()).map(|c| c as f64).collect())
                .collect()
        };
        let boardings = if walk_only {
            [shape(0.0), shape(0.0), shape(0.0)]
        } else {
            [shape(1.5), shape(1.0), ramp()]
        };
        let [mean_b, min_b, max_b] = boardings;
        let entries = [
            (names::MIN_TEMPORAL_DISTANCE, scaled(1.0)),
            (names::MEAN_TEMPORAL_DISTANCE, scaled(1.5)),
            (names::MAX_TEMPORAL_DISTANCE, scaled(2.0)),
            (names::N_PARETO_OPTIMAL_TRIPS, shape(3.0)),
            (names::MEAN_N_BOARDINGS, mean_b),
            (names::MIN_N_BOARDINGS, min_b),
            (names::MAX_N_BOARDINGS, max_b),
        ];
        for (name, matrix) in entries {
            store.put(name, &ObservableMatrix::new(matrix)).unwrap();
        }
        load_flattened(&config, &mut store).unwrap()
    }

    fn square() -> FlattenedObservables {
        // three targets, three origins, minutes 10..90 in seconds
        dataset(vec![
            vec![600.0, 1200.0, 1800.0],
            vec![2400.0, 3000.0, 3600.0],
            vec![4200.0, 4800.0, 5400.0],
        ])
    }

    fn draws<F: Figure>(figure: &F) -> bool {
        let (w, h) = figure.size().unwrap_or((300, 200));
        let mut rgb = vec![0u8; w as usize * h as usize * 3];
        let root = BitMapBackend::with_buffer(&mut rgb, (w, h)).into_drawing_area();
        root.fill(&WHITE).unwrap();
        figure.draw(&root, false).is_ok()
    }

    #[test]
    fn test_summary_has_six_lettered_panels() {
        let data = square();
        let summary = SummaryFigure::build(&data, &TimeConfig::default()).unwrap();
        let letters: Vec<&str> = summary
            .panels
            .iter()
            .filter_map(|p| p.style().letter.as_deref())
            .collect();
        assert_eq!(letters, vec!["A", "B", "C", "D", "E", "F"]);
        assert!(matches!(summary.panels[0], SummaryPanel::Steps { .. }));
        assert!(matches!(summary.panels[3], SummaryPanel::Steps { .. }));
        let SummaryPanel::Steps { histograms, .. } = &summary.panels[0] else {
            panic!("panel A is a step panel");
        };
        let widths: Vec<f64> = histograms.iter().map(|h| h.style().edge_width).collect();
        assert_eq!(widths, vec![2.0, 1.5, 1.0]);
        assert_eq!(summary.panels[1].style().y_limits, Some((0.0, 80.0)));
        assert_eq!(summary.panels[3].style().x_limits, Some((-0.15, 3.15)));
        assert!(draws(&summary));
    }

    #[test]
    fn test_boarding_panel_bins_largest_count() {
        let panel = boarding_count_distributions(&[0.0, 1.0], &[0.5, 1.5], &[2.0, 2.0]).unwrap();
        let SummaryPanel::Steps { histograms, .. } = panel else {
            panic!("expected a step panel");
        };
        assert_eq!(histograms.len(), 3);
        assert_eq!(histograms[2].style().z_order, 0);
        assert!(histograms[2].max_density() > 0.0);
    }

    #[test]
    fn test_walk_only_data_still_plots() {
        let data = build_dataset(
            vec![vec![600.0, 1200.0], vec![1800.0, 2400.0]],
            true,
        );
        let summary = SummaryFigure::build(&data, &TimeConfig::default()).unwrap();
        assert_eq!(summary.panels[4].style().y_limits, Some((0.0, 0.5)));
        assert!(draws(&summary));

        let figures = pairwise_figures(&data, &TimeConfig::default()).unwrap();
        let boardings = figures
            .iter()
            .find(|f| f.name == MIN_BOARDINGS_VS_MEAN_BOARDINGS)
            .unwrap();
        assert_eq!(boardings.plot.histogram().total(), 4);
        assert!(draws(boardings));
    }

    #[test]
    fn test_pairwise_catalog() {
        let data = square();
        let figures = pairwise_figures(&data, &TimeConfig::default()).unwrap();
        let names: Vec<&str> = figures.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                MIN_VS_MAX,
                MIN_VS_MEAN,
                MEAN_VS_MAX,
                MAX_MINUS_MIN_VS_MIN,
                MIN_BOARDINGS_VS_MEAN_BOARDINGS
            ]
        );
        assert_eq!(figures[0].style.reference_lines.len(), 1);
        assert!(figures[3].style.reference_lines.is_empty());
        assert_eq!(figures[3].style.x_limits, Some((0.0, 120.0)));
        for figure in &figures {
            assert!(draws(figure));
        }
    }

    #[test]
    fn test_symmetricity_pairs_in_minutes() {
        let data = square();
        let figure = symmetricity_figure(&data, &TimeConfig::default())
            .unwrap()
            .unwrap();
        // pairs (m01, m10), (m02, m20), (m12, m21)
        assert_eq!(figure.plot.histogram().total(), 3);
        assert!(figure.plot.summary().populated_bins() > 0);
    }

    #[test]
    fn test_symmetricity_skipped_without_pairs() {
        let data = dataset(vec![vec![600.0, 1200.0]]);
        assert!(symmetricity_figure(&data, &TimeConfig::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_quicklook_figures() {
        let quick = QuickLook {
            min: vec![10.0, 20.0, 30.0],
            mean: vec![15.0, 25.0, 45.0],
            max: vec![20.0, 40.0, 60.0],
        };
        let figures = quicklook_figures(&quick, &TimeConfig::default()).unwrap();
        assert_eq!(figures.len(), 3);
        assert_eq!(figures[1].name, "quicklook_mean_vs_max");
        assert!(figures.iter().all(draws));
    }
}
