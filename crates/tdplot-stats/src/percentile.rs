//! Percentiles and simple moments
//!
//! Percentiles use linear interpolation between closest ranks, the
//! default of `numpy.percentile`.

use crate::error::{StatsError, StatsResult};

/// Linear-interpolated percentile of an already sorted slice
///
/// `q` is in percent. The slice must be non-empty and free of NaN.
pub fn percentile_sorted(sorted: &[f64], q: f64) -> StatsResult<f64> {
    if !(0.0..=100.0).contains(&q) {
        return Err(StatsError::InvalidPercentile(q));
    }
    if sorted.is_empty() {
        return Err(StatsError::empty("percentile input"));
    }

    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    if lo == hi || frac == 0.0 {
        return Ok(sorted[lo]);
    }

    Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Percentile of an unsorted slice, ignoring NaN
pub fn percentile(values: &[f64], q: f64) -> StatsResult<f64> {
    let sorted = sorted_without_nan(values);
    percentile_sorted(&sorted, q)
}

/// Arithmetic mean
pub fn mean(values: &[f64]) -> StatsResult<f64> {
    if values.is_empty() {
        return Err(StatsError::empty("mean input"));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Largest finite value, if any
pub fn finite_max(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
}

fn sorted_without_nan(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&data, 0.0).unwrap(), 1.0);
        assert_eq!(percentile(&data, 100.0).unwrap(), 4.0);
        assert!((percentile(&data, 50.0).unwrap() - 2.5).abs() < 1e-12);
        // rank = 0.05 * 3 = 0.15
        assert!((percentile(&data, 5.0).unwrap() - 1.15).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_unsorted_input() {
        let data = [10.0, 0.0, 5.0];
        assert!((percentile(&data, 50.0).unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_single_value() {
        assert_eq!(percentile(&[7.0], 95.0).unwrap(), 7.0);
    }

    #[test]
    fn test_percentile_errors() {
        assert!(matches!(
            percentile(&[], 50.0),
            Err(StatsError::EmptyInput { .. })
        ));
        assert!(matches!(
            percentile(&[1.0], 101.0),
            Err(StatsError::InvalidPercentile(_))
        ));
    }

    #[test]
    fn test_mean() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&data).unwrap() - 5.0).abs() < 1e-12);
        assert!(mean(&[]).is_err());
    }

    #[test]
    fn test_finite_max_skips_sentinels() {
        assert_eq!(finite_max(&[1.0, f64::INFINITY, 3.0, f64::NAN]), Some(3.0));
        assert_eq!(finite_max(&[f64::NAN]), None);
    }
}
