//! Sentinel cleansing for observable arrays
//!
//! Upstream routing results mark unreachable origins with NaN or +inf.
//! Cleansing swaps those for a fallback value placed just past the plotted
//! horizon. Anything else that is still not a finite, non-negative number is
//! reported through `tracing` and left in place: how often such values occur
//! upstream is undocumented, so they are surfaced for inspection rather than
//! rejected.

use tracing::warn;

/// Output of [`cleanse`]
#[derive(Debug, Clone, PartialEq)]
pub struct Cleansed {
    pub values: Vec<f64>,
    /// Number of NaN / +inf entries replaced by the fallback
    pub replaced: usize,
    /// Entries that are negative or -inf after replacement, as `(index, value)`
    pub violations: Vec<(usize, f64)>,
}

/// Whether `value` is an unreachable sentinel
pub fn is_sentinel(value: f64) -> bool {
    value.is_nan() || value == f64::INFINITY
}

/// Replace NaN and +inf with `fallback`, reporting leftover anomalies
pub fn cleanse(values: &[f64], fallback: f64) -> Cleansed {
    let mut replaced = 0;
    let cleaned: Vec<f64> = values
        .iter()
        .map(|&v| {
            if is_sentinel(v) {
                replaced += 1;
                fallback
            } else {
                v
            }
        })
        .collect();

    let violations: Vec<(usize, f64)> = cleaned
        .iter()
        .enumerate()
        .filter(|(_, v)| !(v.is_finite() && **v >= 0.0))
        .map(|(i, v)| (i, *v))
        .collect();

    if !violations.is_empty() {
        let preview: Vec<f64> = violations.iter().take(10).map(|(_, v)| *v).collect();
        warn!(
            count = violations.len(),
            ?preview,
            "values remain negative or non-finite after cleansing"
        );
    }

    Cleansed {
        values: cleaned,
        replaced,
        violations,
    }
}

/// `true` where a value is a usable measurement: `0 <= v < +inf`
///
/// NaN compares false and is therefore invalid.
pub fn validity_mask(values: &[f64]) -> Vec<bool> {
    values
        .iter()
        .map(|&v| v >= 0.0 && v < f64::INFINITY)
        .collect()
}

/// Element-wise AND of equally long masks
pub fn combine_masks(masks: &[Vec<bool>]) -> Vec<bool> {
    let Some(first) = masks.first() else {
        return Vec::new();
    };
    let mut combined = first.clone();
    for mask in &masks[1..] {
        for (c, m) in combined.iter_mut().zip(mask) {
            *c &= *m;
        }
    }
    combined
}

/// Keep the values whose mask entry is `true`
pub fn apply_mask(values: &[f64], mask: &[bool]) -> Vec<f64> {
    values
        .iter()
        .zip(mask)
        .filter(|(_, keep)| **keep)
        .map(|(v, _)| *v)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cleanse_replaces_sentinels() {
        let out = cleanse(&[1.0, f64::NAN, f64::INFINITY, 0.0], 181.0);
        assert_eq!(out.values, vec![1.0, 181.0, 181.0, 0.0]);
        assert_eq!(out.replaced, 2);
        assert!(out.violations.is_empty());
    }

    #[test]
    fn test_cleanse_reports_negatives_without_failing() {
        let out = cleanse(&[5.0, -2.0, f64::NEG_INFINITY], 240.0);
        assert_eq!(out.values[1], -2.0);
        assert_eq!(out.violations, vec![(1, -2.0), (2, f64::NEG_INFINITY)]);
    }

    #[test]
    fn test_validity_mask_and_combine() {
        let a = validity_mask(&[1.0, -1.0, f64::NAN, f64::INFINITY, 0.0]);
        assert_eq!(a, vec![true, false, false, false, true]);

        let b = vec![true, true, true, true, false];
        assert_eq!(
            combine_masks(&[a, b]),
            vec![true, false, false, false, false]
        );
        assert!(combine_masks(&[]).is_empty());
    }

    #[test]
    fn test_apply_mask() {
        let kept = apply_mask(&[1.0, 2.0, 3.0], &[true, false, true]);
        assert_eq!(kept, vec![1.0, 3.0]);
    }

    proptest! {
        #[test]
        fn prop_cleanse_removes_every_sentinel(
            raw in proptest::collection::vec(
                prop_oneof![
                    0.0f64..1e6,
                    Just(f64::NAN),
                    Just(f64::INFINITY),
                ],
                0..100,
            )
        ) {
            let out = cleanse(&raw, 240.0);
            prop_assert_eq!(out.values.len(), raw.len());
            for (before, after) in raw.iter().zip(&out.values) {
                prop_assert!(after.is_finite());
                if before.is_finite() {
                    prop_assert_eq!(before.to_bits(), after.to_bits());
                } else {
                    prop_assert_eq!(*after, 240.0);
                }
            }
        }
    }
}
