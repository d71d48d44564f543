//! Assembly of the all-to-all observables
//!
//! Observable matrices come from the keyed cache or, on a miss, from the
//! per-target result files. They are flattened, converted to minutes and
//! filtered down to the origin/target pairs whose three temporal distances
//! are all valid.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{info, warn};

use tdplot_io::{
    compute_observable_matrix, discover_result_files, fetch_or_compute, read_target_stats,
    scan_negative_values, CachePolicy, KeyedStore, ObservableMatrix,
};
use tdplot_stats::{apply_mask, cleanse, combine_masks, validity_mask, BinEdges, StatsError};

use crate::config::PlotConfig;
use crate::error::{PlotError, PlotResult};

/// Observable names as stored in the result files
pub mod names {
    pub const MIN_TEMPORAL_DISTANCE: &str = "min_temporal_distance";
    pub const MEAN_TEMPORAL_DISTANCE: &str = "mean_temporal_distance";
    pub const MAX_TEMPORAL_DISTANCE: &str = "max_temporal_distance";
    pub const N_PARETO_OPTIMAL_TRIPS: &str = "n_pareto_optimal_trips";
    pub const MEAN_N_BOARDINGS: &str = "mean_n_boardings_on_shortest_paths";
    pub const MIN_N_BOARDINGS: &str = "min_n_boardings";
    pub const MAX_N_BOARDINGS: &str = "max_n_boardings_on_shortest_paths";
    pub const MIN_TEMPORAL_DISTANCE_WITH_MIN_N_BOARDINGS: &str =
        "min_temporal_distance_with_min_n_boardings";
    pub const MEAN_TEMPORAL_DISTANCE_WITH_MIN_N_BOARDINGS: &str =
        "mean_temporal_distance_with_min_n_boardings";
}

/// Every observable loaded for the all-to-all figures
pub const ALL_TO_ALL_OBSERVABLES: [&str; 7] = [
    names::MIN_TEMPORAL_DISTANCE,
    names::MEAN_TEMPORAL_DISTANCE,
    names::MAX_TEMPORAL_DISTANCE,
    names::N_PARETO_OPTIMAL_TRIPS,
    names::MEAN_N_BOARDINGS,
    names::MIN_N_BOARDINGS,
    names::MAX_N_BOARDINGS,
];

/// Observables measured in seconds
pub const TEMPORAL_OBSERVABLES: [&str; 3] = [
    names::MIN_TEMPORAL_DISTANCE,
    names::MEAN_TEMPORAL_DISTANCE,
    names::MAX_TEMPORAL_DISTANCE,
];

/// Flattened, filtered observables ready for plotting
#[derive(Debug, Clone)]
pub struct FlattenedObservables {
    /// Unit-wide bins centred on whole minutes, `-0.5 ..= horizon + 0.5`
    pub time_bins: BinEdges,
    series: BTreeMap<String, Vec<f64>>,
    /// Unfiltered mean temporal distances in seconds, one row per target
    pub mean_matrix: ObservableMatrix,
    /// Pairs dropped for an invalid temporal distance
    pub dropped: usize,
}

impl FlattenedObservables {
    /// Values of one observable
    pub fn get(&self, name: &str) -> PlotResult<&[f64]> {
        self.series
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| PlotError::MissingObservable(name.to_string()))
    }

    /// Number of retained pairs
    pub fn len(&self) -> usize {
        self.series.values().next().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bins `linspace(-0.5, horizon + 0.5, horizon + 2)`
pub fn time_bins(horizon: f64) -> PlotResult<BinEdges> {
    let num = horizon.round().max(0.0) as usize + 2;
    Ok(BinEdges::linspace(-0.5, horizon + 0.5, num)?)
}

/// Load all seven observables and keep only pairs with valid times
///
/// Matrices are fetched through `store`; on a miss the result files in
/// the stats directory are scanned once and the matrix is stored.
pub fn load_flattened<S>(config: &PlotConfig, store: &mut S) -> PlotResult<FlattenedObservables>
where
    S: KeyedStore<ObservableMatrix> + ?Sized,
{
    let stats_dir = config.paths.stats_dir();
    let policy = CachePolicy::from_recompute(config.loading.recompute);
    let mut files: Option<Vec<PathBuf>> = None;

    let mut matrices = BTreeMap::new();
    for name in ALL_TO_ALL_OBSERVABLES {
        let matrix = fetch_or_compute(store, name, policy, || -> PlotResult<ObservableMatrix> {
            if files.is_none() {
                files = Some(discover_result_files(
                    &stats_dir,
                    &config.paths.result_pattern,
                    config.loading.file_limit,
                )?);
            }
            let files = files.as_deref().unwrap_or(&[]);
            Ok(compute_observable_matrix(files, name)?)
        })?;
        info!(observable = name, shape = ?matrix.shape(), "observable loaded");
        matrices.insert(name.to_string(), matrix);
    }
    info!("data loaded");

    let mean_matrix = matrices
        .get(names::MEAN_TEMPORAL_DISTANCE)
        .cloned()
        .unwrap_or_default();

    let mut series: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut expected: Option<usize> = None;
    for (name, matrix) in matrices {
        let mut values = matrix.flatten();
        match expected {
            None => expected = Some(values.len()),
            Some(len) if len != values.len() => {
                return Err(StatsError::LengthMismatch {
                    x_len: len,
                    y_len: values.len(),
                }
                .into());
            }
            Some(_) => {}
        }
        if TEMPORAL_OBSERVABLES.contains(&name.as_str()) {
            for v in values.iter_mut() {
                *v /= config.time.seconds_per_unit;
            }
        }
        series.insert(name, values);
    }

    let mut masks = Vec::with_capacity(TEMPORAL_OBSERVABLES.len());
    for name in TEMPORAL_OBSERVABLES {
        let values = series
            .get_mut(name)
            .ok_or_else(|| PlotError::MissingObservable(name.to_string()))?;
        masks.push(validity_mask(values));
        *values = cleanse(values, config.time.unreachable_value).values;
    }
    let combined = combine_masks(&masks);
    let kept = combined.iter().filter(|&&keep| keep).count();
    let dropped = combined.len() - kept;
    info!(kept, dropped, "filtered invalid time values");

    for values in series.values_mut() {
        *values = apply_mask(values, &combined);
    }

    Ok(FlattenedObservables {
        time_bins: time_bins(config.time.horizon)?,
        series,
        mean_matrix,
        dropped,
    })
}

/// Opposite-direction pairs `(m[i][j], m[j][i])` for `i < j`
///
/// A pair is kept only when both entries are finite and non-negative.
pub fn symmetry_pairs(mean_matrix: &ObservableMatrix) -> (Vec<f64>, Vec<f64>) {
    let n = mean_matrix.num_rows();
    let mut i_to_j = Vec::new();
    let mut j_to_i = Vec::new();
    let usable = |v: f64| v.is_finite() && v >= 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            if let (Some(ij), Some(ji)) = (mean_matrix.get(i, j), mean_matrix.get(j, i)) {
                if usable(ij) && usable(ji) {
                    i_to_j.push(ij);
                    j_to_i.push(ji);
                }
            }
        }
    }
    (i_to_j, j_to_i)
}

/// Temporal distances of the first few result files, in minutes
#[derive(Debug, Clone, PartialEq)]
pub struct QuickLook {
    pub min: Vec<f64>,
    pub mean: Vec<f64>,
    pub max: Vec<f64>,
}

impl QuickLook {
    pub fn is_empty(&self) -> bool {
        self.min.is_empty()
    }
}

/// Read the first `quicklook_files` result files without caching
///
/// The sample comes from the results directory itself, where per-target
/// files land as they are computed, not from the stats subdirectory.
/// Unreachable entries become `horizon` minutes.
pub fn load_quicklook(config: &PlotConfig) -> PlotResult<QuickLook> {
    let files = discover_result_files(
        &config.paths.results_dir,
        &config.paths.result_pattern,
        Some(config.loading.quicklook_files),
    )?;

    let mut columns: [Vec<f64>; 3] = Default::default();
    for path in &files {
        let stats = read_target_stats(path)?;
        if scan_negative_values(&stats, names::MIN_TEMPORAL_DISTANCE) == Some(true) {
            warn!(path = %path.display(), target = %stats.target, "negative values");
        }
        for (column, name) in columns.iter_mut().zip(TEMPORAL_OBSERVABLES) {
            let values = stats.observable(name).ok_or_else(|| {
                tdplot_io::IoError::ObservableNotFound {
                    observable: name.to_string(),
                    path: path.clone(),
                }
            })?;
            column.extend_from_slice(values);
        }
    }

    let fallback = config.time.horizon * config.time.seconds_per_unit;
    let [min, mean, max] = columns.map(|column| {
        cleanse(&column, fallback)
            .values
            .into_iter()
            .map(|v| v / config.time.seconds_per_unit)
            .collect::<Vec<f64>>()
    });
    info!(files = files.len(), pairs = min.len(), "quick-look data loaded");
    Ok(QuickLook { min, mean, max })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tdplot_io::MemoryStore;

    fn config() -> PlotConfig {
        let mut config = PlotConfig::default();
        config.paths.results_dir = PathBuf::from("/nonexistent");
        config
    }

    fn seeded_store(mins: Vec<f64>, means: Vec<f64>, maxs: Vec<f64>) -> MemoryStore<ObservableMatrix> {
        let n = mins.len();
        let mut store = MemoryStore::new();
        let mut put = |name: &str, values: Vec<f64>| {
            store
                .put(name, &ObservableMatrix::new(vec![values]))
                .unwrap();
        };
        put(names::MIN_TEMPORAL_DISTANCE, mins);
        put(names::MEAN_TEMPORAL_DISTANCE, means);
        put(names::MAX_TEMPORAL_DISTANCE, maxs);
        put(names::N_PARETO_OPTIMAL_TRIPS, (0..n).map(|i| i as f64).collect());
        put(names::MEAN_N_BOARDINGS, vec![1.5; n]);
        put(names::MIN_N_BOARDINGS, vec![1.0; n]);
        put(names::MAX_N_BOARDINGS, vec![2.0; n]);
        store
    }

    #[test]
    fn test_time_bins() {
        let bins = time_bins(180.0).unwrap();
        assert_eq!(bins.as_slice().len(), 182);
        assert_eq!(bins.range(), (-0.5, 180.5));
        assert!((bins.widths()[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_load_filters_invalid_pairs() {
        let mut store = seeded_store(
            vec![60.0, f64::NAN, 120.0, -60.0],
            vec![120.0, 60.0, f64::INFINITY, 60.0],
            vec![180.0, 60.0, 300.0, 60.0],
        );
        let data = load_flattened(&config(), &mut store).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data.dropped, 3);
        assert_eq!(data.get(names::MIN_TEMPORAL_DISTANCE).unwrap(), &[1.0]);
        assert_eq!(data.get(names::MEAN_TEMPORAL_DISTANCE).unwrap(), &[2.0]);
        assert_eq!(data.get(names::MAX_TEMPORAL_DISTANCE).unwrap(), &[3.0]);
        // untouched by the unit conversion
        assert_eq!(data.get(names::N_PARETO_OPTIMAL_TRIPS).unwrap(), &[0.0]);
        assert_eq!(data.mean_matrix.get(0, 2), Some(f64::INFINITY));
    }

    #[test]
    fn test_missing_observable_lookup() {
        let mut store = seeded_store(vec![60.0], vec![60.0], vec![60.0]);
        let data = load_flattened(&config(), &mut store).unwrap();
        assert!(matches!(
            data.get("pareto"),
            Err(PlotError::MissingObservable(_))
        ));
    }

    #[test]
    fn test_cache_miss_without_results_fails() {
        let mut store = MemoryStore::new();
        let err = load_flattened(&config(), &mut store).unwrap_err();
        assert!(matches!(err, PlotError::Load(_)));
    }

    #[test]
    fn test_mismatched_matrices_rejected() {
        let mut store = seeded_store(vec![60.0, 60.0], vec![60.0, 60.0], vec![60.0, 60.0]);
        store
            .put(names::MIN_N_BOARDINGS, &ObservableMatrix::new(vec![vec![1.0]]))
            .unwrap();
        assert!(matches!(
            load_flattened(&config(), &mut store),
            Err(PlotError::Stats(StatsError::LengthMismatch { .. }))
        ));
    }

    #[test]
    fn test_symmetry_pairs() {
        let m = ObservableMatrix::new(vec![
            vec![0.0, 10.0, 20.0],
            vec![12.0, 0.0, f64::INFINITY],
            vec![22.0, 5.0, 0.0],
        ]);
        let (ij, ji) = symmetry_pairs(&m);
        assert_eq!(ij, vec![10.0, 20.0]);
        assert_eq!(ji, vec![12.0, 22.0]);
    }

    #[test]
    fn test_symmetry_pairs_skips_negative() {
        let m = ObservableMatrix::new(vec![vec![0.0, -1.0], vec![3.0, 0.0]]);
        let (ij, _) = symmetry_pairs(&m);
        assert!(ij.is_empty());
    }

    fn write_stats(dir: &std::path::Path, target: i64, min: Vec<f64>) {
        let mut stats = BTreeMap::new();
        for name in TEMPORAL_OBSERVABLES {
            stats.insert(name.to_string(), min.clone());
        }
        let path = dir.join(format!("helsinki_all_to_all_stats_target_{}.pkl", target));
        let stats = tdplot_io::TargetStats {
            target: tdplot_io::TargetId::Int(target),
            stats,
        };
        tdplot_io::write_target_stats(&path, &stats).unwrap();
    }

    #[test]
    fn test_quicklook_reads_results_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PlotConfig::default();
        config.paths.results_dir = dir.path().to_path_buf();
        let stats_dir = config.paths.stats_dir();
        std::fs::create_dir_all(&stats_dir).unwrap();

        write_stats(dir.path(), 0, vec![600.0, f64::INFINITY]);
        write_stats(dir.path(), 1, vec![1200.0, 1800.0]);
        write_stats(&stats_dir, 2, vec![60.0, 60.0]);

        let quick = load_quicklook(&config).unwrap();
        assert_eq!(quick.min, vec![10.0, 180.0, 20.0, 30.0]);
        assert_eq!(quick.max, quick.min);
    }

    #[test]
    fn test_quicklook_limits_file_count() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PlotConfig::default();
        config.paths.results_dir = dir.path().to_path_buf();
        config.loading.quicklook_files = 1;
        write_stats(dir.path(), 3, vec![60.0]);
        write_stats(dir.path(), 12, vec![120.0]);

        assert_eq!(load_quicklook(&config).unwrap().min, vec![1.0]);
    }

    #[test]
    fn test_quicklook_without_results_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PlotConfig::default();
        config.paths.results_dir = dir.path().to_path_buf();
        assert!(load_quicklook(&config).unwrap().is_empty());
    }
}
