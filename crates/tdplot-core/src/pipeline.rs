//! End-to-end figure production
//!
//! Loads the flattened observables once, writes the summary, pairwise and
//! quick-look figures into the figures directory, optionally the map grid of
//! one target into the results directory, and finally `manifest.json`.

use tracing::{info, info_span, warn};

use tdplot_io::{
    discover_result_files, read_nodes, read_target_stats, target_file_pattern, KeyedStore,
    ObservableMatrix, PickleStore,
};

use crate::config::PlotConfig;
use crate::dataset::{load_flattened, load_quicklook};
use crate::derived::derive_observables;
use crate::error::{PlotError, PlotResult};
use crate::export::{export_figure, FigureManifest};
use crate::figures::{
    pairwise_figures, quicklook_figures, symmetricity_figure, SummaryFigure,
    MEAN_VS_MEAN_SYMMETRICITY, QUICKLOOK,
};
use crate::map::{multiple_measures_name, MapGrid};

/// Runs the figure catalog for one configuration
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PlotConfig,
}

impl Pipeline {
    /// Validate `config` and wrap it
    pub fn new(config: PlotConfig) -> PlotResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    /// Run with the on-disk matrix cache in the stats directory
    pub fn run(&self) -> PlotResult<FigureManifest> {
        let mut store = PickleStore::new(self.config.paths.stats_dir());
        self.run_with_store(&mut store)
    }

    /// Run with an explicit matrix cache
    pub fn run_with_store<S>(&self, store: &mut S) -> PlotResult<FigureManifest>
    where
        S: KeyedStore<ObservableMatrix> + ?Sized,
    {
        let _span = info_span!("pipeline").entered();
        let config = &self.config;
        let figures_dir = &config.paths.figures_dir;
        let export = &config.export;

        let data = load_flattened(config, store)?;
        let mut manifest = FigureManifest::new();
        manifest.pairs = data.len();
        manifest.dropped_pairs = data.dropped;
        info!(pairs = data.len(), dropped = data.dropped, "observables loaded");

        let summary = SummaryFigure::build(&data, &config.time)?;
        manifest.push(export_figure(&summary, figures_dir, export)?);

        for figure in pairwise_figures(&data, &config.time)? {
            manifest.push(export_figure(&figure, figures_dir, export)?);
        }

        match symmetricity_figure(&data, &config.time)? {
            Some(figure) => manifest.push(export_figure(&figure, figures_dir, export)?),
            None => {
                warn!("no opposite-direction pairs, symmetricity figure skipped");
                manifest.skip(MEAN_VS_MEAN_SYMMETRICITY, "no opposite-direction pairs");
            }
        }

        let quick = load_quicklook(config)?;
        if quick.is_empty() {
            warn!(dir = %config.paths.results_dir.display(), "no quick-look result files");
            for name in QUICKLOOK {
                manifest.skip(name, "no result files in the results directory");
            }
        } else {
            for figure in quicklook_figures(&quick, &config.time)? {
                manifest.push(export_figure(&figure, figures_dir, export)?);
            }
        }

        if let Some(target) = config.target_node_id.as_deref() {
            let grid = self.map_grid(target)?;
            manifest.push(export_figure(&grid, &config.paths.results_dir, export)?);
        }

        let path = manifest.write(figures_dir)?;
        info!(
            figures = manifest.figures.len(),
            skipped = manifest.skipped.len(),
            manifest = %path.display(),
            "pipeline finished"
        );
        Ok(manifest)
    }

    /// Map grid of one target's observables over the node listing
    pub fn map_grid(&self, target: &str) -> PlotResult<MapGrid> {
        let paths = &self.config.paths;
        let files = discover_result_files(&paths.stats_dir(), &target_file_pattern(target), Some(1))?;
        let path = files.first().ok_or_else(|| {
            PlotError::InvalidConfig(format!(
                "no result file for target {} in {}",
                target,
                paths.stats_dir().display()
            ))
        })?;

        let mut stats = read_target_stats(path)?;
        derive_observables(&mut stats.stats);
        let nodes = read_nodes(&paths.nodes_file)?;
        info!(target_node = target, stops = nodes.len(), "building map grid");

        let name = multiple_measures_name(&self.config.map.name_prefix, &[target]);
        MapGrid::build(name, &stats.stats, &nodes, &self.config.map)
    }
}

/// Validate `config` and run the whole catalog
pub fn run(config: PlotConfig) -> PlotResult<FigureManifest> {
    Pipeline::new(config)?.run()
}
