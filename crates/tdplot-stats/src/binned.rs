//! Binned conditional statistics
//!
//! Groups the values of one variable by which bin another variable falls
//! into, then summarizes each group by its mean and 5th/95th percentiles.
//! Bins without members yield `None`, so a plotted curve shows a gap there
//! instead of a misleading zero.

use serde::{Deserialize, Serialize};

use crate::binning::BinEdges;
use crate::error::{StatsError, StatsResult};
use crate::percentile::{mean, percentile_sorted};

/// Mean and 5th/95th percentile of y, conditioned on the x bin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalSummary {
    /// Mean of x inside each bin, used as the curve abscissa
    pub center: Vec<Option<f64>>,
    pub mean: Vec<Option<f64>>,
    pub p5: Vec<Option<f64>>,
    pub p95: Vec<Option<f64>>,
    /// Number of members per bin
    pub count: Vec<usize>,
}

impl ConditionalSummary {
    /// Summarize `y` over the bins of `x`
    ///
    /// Fails on empty input instead of returning an all-`None` summary.
    pub fn compute(x: &[f64], y: &[f64], x_edges: &BinEdges) -> StatsResult<Self> {
        if x.is_empty() {
            return Err(StatsError::empty("x values of conditional summary"));
        }
        if y.is_empty() {
            return Err(StatsError::empty("y values of conditional summary"));
        }
        if x.len() != y.len() {
            return Err(StatsError::LengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }

        let n = x_edges.num_bins();
        let mut members: Vec<Vec<(f64, f64)>> = vec![Vec::new(); n];
        for (&xv, &yv) in x.iter().zip(y) {
            if let Some(i) = x_edges.locate(xv) {
                members[i].push((xv, yv));
            }
        }

        let mut summary = Self {
            center: Vec::with_capacity(n),
            mean: Vec::with_capacity(n),
            p5: Vec::with_capacity(n),
            p95: Vec::with_capacity(n),
            count: Vec::with_capacity(n),
        };

        for bin in members {
            summary.count.push(bin.len());
            if bin.is_empty() {
                summary.center.push(None);
                summary.mean.push(None);
                summary.p5.push(None);
                summary.p95.push(None);
                continue;
            }
            let xs: Vec<f64> = bin.iter().map(|p| p.0).collect();
            let mut ys: Vec<f64> = bin.iter().map(|p| p.1).collect();
            summary.center.push(Some(mean(&xs)?));
            summary.mean.push(Some(mean(&ys)?));
            ys.sort_by(f64::total_cmp);
            summary.p5.push(Some(percentile_sorted(&ys, 5.0)?));
            summary.p95.push(Some(percentile_sorted(&ys, 95.0)?));
        }

        Ok(summary)
    }

    /// Bins that have at least one member
    pub fn populated_bins(&self) -> usize {
        self.count.iter().filter(|&&c| c > 0).count()
    }

    /// Contiguous runs of `(center, value)` points for one curve
    ///
    /// An empty bin ends the current run, which leaves a gap in the line.
    pub fn segments(&self, series: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
        let mut runs = Vec::new();
        let mut current = Vec::new();
        for (c, v) in self.center.iter().zip(series) {
            match (c, v) {
                (Some(c), Some(v)) => current.push((*c, *v)),
                _ => {
                    if !current.is_empty() {
                        runs.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }
}
