//! Shared fixtures for tdplot-core integration tests

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tdplot_core::{names, ExportFormat, PlotConfig};
use tdplot_io::{write_target_stats, TargetId, TargetStats};

/// Targets and origins of the fixture network
pub const STOPS: usize = 3;

/// Stats of one target: origin `o` reaches target `t` in `10 * (1 + t + o)`
/// minutes at best, with mean and max at 1.5x and 2x of that
pub fn fixture_stats(target: usize) -> BTreeMap<String, Vec<f64>> {
    let per_origin = |f: &dyn Fn(usize) -> f64| -> Vec<f64> { (0..STOPS).map(f).collect() };
    let min = |o: usize| 600.0 * (1 + target + o) as f64;

    let mut stats = BTreeMap::new();
    let mut put = |name: &str, values: Vec<f64>| {
        stats.insert(name.to_string(), values);
    };
    put(names::MIN_TEMPORAL_DISTANCE, per_origin(&|o| min(o)));
    put(names::MEAN_TEMPORAL_DISTANCE, per_origin(&|o| 1.5 * min(o)));
    put(names::MAX_TEMPORAL_DISTANCE, per_origin(&|o| 2.0 * min(o)));
    put(
        names::MIN_TEMPORAL_DISTANCE_WITH_MIN_N_BOARDINGS,
        per_origin(&|o| min(o) + 60.0),
    );
    put(
        names::MEAN_TEMPORAL_DISTANCE_WITH_MIN_N_BOARDINGS,
        per_origin(&|o| 1.5 * min(o) + 60.0),
    );
    put(names::N_PARETO_OPTIMAL_TRIPS, per_origin(&|o| (o + 1) as f64));
    put(names::MIN_N_BOARDINGS, per_origin(&|o| o as f64));
    put(names::MEAN_N_BOARDINGS, per_origin(&|o| o as f64 + 0.5));
    put(names::MAX_N_BOARDINGS, per_origin(&|o| (o + 1) as f64));
    stats
}

/// Write the fixture network under `root` and return a config pointing at it
///
/// Result files land both in the results directory, where the quick-look
/// sample is read, and in its stats subdirectory.
///
/// The first target cannot be reached from the first origin, so one pair
/// is dropped as invalid.
pub fn write_fixture(root: &Path) -> PlotConfig {
    let mut config = PlotConfig::default();
    config.paths.results_dir = root.join("results");
    config.paths.figures_dir = root.join("figures");
    config.paths.nodes_file = root.join("nodes.csv");
    config.export.format = ExportFormat::Png;
    config.export.width = 320;
    config.export.height = 240;
    config.export.labels = false;

    let stats_dir = config.paths.stats_dir();
    std::fs::create_dir_all(&stats_dir).unwrap();
    for target in 0..STOPS {
        let mut stats = fixture_stats(target);
        if target == 0 {
            for name in [
                names::MIN_TEMPORAL_DISTANCE,
                names::MEAN_TEMPORAL_DISTANCE,
                names::MAX_TEMPORAL_DISTANCE,
            ] {
                if let Some(values) = stats.get_mut(name) {
                    values[0] = f64::INFINITY;
                }
            }
        }
        write_result_file(&config.paths.results_dir, target, stats.clone());
        write_result_file(&stats_dir, target, stats);
    }

    std::fs::write(
        &config.paths.nodes_file,
        "lat,lon,desc\n60.1699,24.9384,Kamppi\n60.1841,24.8301,Aalto\n60.2055,24.6559,Kilo\n",
    )
    .unwrap();
    config
}

pub fn write_result_file(dir: &Path, target: usize, stats: BTreeMap<String, Vec<f64>>) -> PathBuf {
    let path = dir.join(format!("helsinki_all_to_all_stats_target_{}.pkl", target));
    write_target_stats(
        &path,
        &TargetStats {
            target: TargetId::Int(target as i64),
            stats,
        },
    )
    .unwrap_or_else(|e| panic!("Failed to write fixture for target {}: {}", target, e));
    path
}
