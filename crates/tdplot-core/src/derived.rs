//! Differences and ratios derived from one target's observables
//!
//! Arithmetic is element-wise IEEE: a zero denominator yields inf or NaN,
//! which the map styling later sends to the end or bad color.

use std::collections::BTreeMap;

use tracing::debug;

use crate::dataset::names;

pub const MAX_MINUS_MIN: &str = "max_minus_min_temporal_distance";
pub const MAX_MINUS_MEAN: &str = "max_minus_mean_temporal_distance";
pub const MEAN_MINUS_MIN: &str = "mean_minus_min_temporal_distance";
pub const MEAN_MINUS_MEAN_MIN_N_BOARDINGS: &str = "mean_minus_mean_min_n_boardings";
pub const MIN_MINUS_MIN_MIN_N_BOARDINGS: &str = "min_minus_min_min_n_boardings";
pub const MAX_MINUS_MIN_PER_MIN: &str = "max_minus_min_per_min";
pub const MEAN_MINUS_MIN_PER_MIN: &str = "mean_minus_min_per_min";
pub const MAX_MINUS_MIN_PER_MIN_PER_MEAN_MINUS_MIN: &str =
    "max_minus_min_per_min_per_mean_minus_min";

fn zip_with(a: &[f64], b: &[f64], f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect()
}

/// Add the derived observables to `stats`
///
/// A derived series is added only when all of its inputs are present.
/// Returns the names that were added.
pub fn derive_observables(stats: &mut BTreeMap<String, Vec<f64>>) -> Vec<&'static str> {
    let get = |name: &str| stats.get(name).cloned();
    let min = get(names::MIN_TEMPORAL_DISTANCE);
    let mean = get(names::MEAN_TEMPORAL_DISTANCE);
    let max = get(names::MAX_TEMPORAL_DISTANCE);
    let mean_min_b = get(names::MEAN_TEMPORAL_DISTANCE_WITH_MIN_N_BOARDINGS);
    let min_min_b = get(names::MIN_TEMPORAL_DISTANCE_WITH_MIN_N_BOARDINGS);

    let mut derived: Vec<(&'static str, Vec<f64>)> = Vec::new();
    if let (Some(min), Some(max)) = (&min, &max) {
        derived.push((MAX_MINUS_MIN, zip_with(max, min, |a, b| a - b)));
        derived.push((
            MAX_MINUS_MIN_PER_MIN,
            zip_with(max, min, |a, b| (a - b) / b),
        ));
    }
    if let (Some(mean), Some(max)) = (&mean, &max) {
        derived.push((MAX_MINUS_MEAN, zip_with(max, mean, |a, b| a - b)));
    }
    if let (Some(min), Some(mean)) = (&min, &mean) {
        derived.push((MEAN_MINUS_MIN, zip_with(mean, min, |a, b| a - b)));
        derived.push((
            MEAN_MINUS_MIN_PER_MIN,
            zip_with(mean, min, |a, b| (a - b) / b),
        ));
    }
    if let (Some(min), Some(mean), Some(max)) = (&min, &mean, &max) {
        let spread = zip_with(max, min, |a, b| a - b);
        let excess = zip_with(mean, min, |a, b| a - b);
        derived.push((
            MAX_MINUS_MIN_PER_MIN_PER_MEAN_MINUS_MIN,
            zip_with(&spread, &excess, |a, b| a / b),
        ));
    }
    if let (Some(mean), Some(mean_min_b)) = (&mean, &mean_min_b) {
        derived.push((
            MEAN_MINUS_MEAN_MIN_N_BOARDINGS,
            zip_with(mean_min_b, mean, |a, b| a - b),
        ));
    }
    if let (Some(min), Some(min_min_b)) = (&min, &min_min_b) {
        derived.push((
            MIN_MINUS_MIN_MIN_N_BOARDINGS,
            zip_with(min_min_b, min, |a, b| a - b),
        ));
    }

    let added: Vec<&'static str> = derived.iter().map(|(name, _)| *name).collect();
    for (name, values) in derived {
        stats.insert(name.to_string(), values);
    }
    debug!(?added, "derived observables");
    added
}
