//! Shared fixtures for tdplot-io integration tests

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tdplot_io::{write_target_stats, TargetId, TargetStats};

/// Write a result file named like the routing pipeline's output
pub fn write_result_file(dir: &Path, target: i64, stats: &[(&str, Vec<f64>)]) -> PathBuf {
    let path = dir.join(format!("helsinki_all_to_all_stats_target_{}.pkl", target));
    let stats: BTreeMap<String, Vec<f64>> = stats
        .iter()
        .map(|(name, values)| (name.to_string(), values.clone()))
        .collect();
    write_target_stats(
        &path,
        &TargetStats {
            target: TargetId::Int(target),
            stats,
        },
    )
    .unwrap_or_else(|e| panic!("Failed to write fixture for target {}: {}", target, e));
    path
}
