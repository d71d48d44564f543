//! Bin edges shared by the histogram and binned-statistic routines
//!
//! Edges are strictly increasing. Every bin is half-open `[e_i, e_{i+1})`
//! except the last, which also contains its right edge. This matches the
//! convention used by numpy's `histogram` and scipy's `binned_statistic`,
//! so figures line up with the published ones bin for bin.

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};

/// A validated, strictly increasing sequence of bin edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct BinEdges {
    edges: Vec<f64>,
}

impl BinEdges {
    /// Validate and wrap a sequence of edges
    pub fn new(edges: Vec<f64>) -> StatsResult<Self> {
        if edges.len() < 2 {
            return Err(StatsError::bins(format!(
                "need at least 2 edges, got {}",
                edges.len()
            )));
        }
        if let Some(bad) = edges.iter().find(|e| !e.is_finite()) {
            return Err(StatsError::bins(format!("non-finite edge {}", bad)));
        }
        if let Some(w) = edges.windows(2).find(|w| w[1] <= w[0]) {
            return Err(StatsError::bins(format!(
                "edges must be strictly increasing ({} followed by {})",
                w[0], w[1]
            )));
        }
        Ok(Self { edges })
    }

    /// `num` evenly spaced edges from `start` to `stop`, both included
    pub fn linspace(start: f64, stop: f64, num: usize) -> StatsResult<Self> {
        if num < 2 {
            return Err(StatsError::bins(format!(
                "linspace needs at least 2 points, got {}",
                num
            )));
        }
        let step = (stop - start) / (num - 1) as f64;
        let mut edges: Vec<f64> = (0..num).map(|i| start + i as f64 * step).collect();
        // Pin the endpoint so accumulated rounding never drops the last sample.
        edges[num - 1] = stop;
        Self::new(edges)
    }

    /// Edges `start, start + step, ...` strictly below `stop`
    pub fn arange(start: f64, stop: f64, step: f64) -> StatsResult<Self> {
        if !(step > 0.0) {
            return Err(StatsError::bins(format!("step must be positive, got {}", step)));
        }
        let count = ((stop - start) / step).ceil();
        if !count.is_finite() || count < 2.0 {
            return Err(StatsError::bins(format!(
                "arange({}, {}, {}) yields fewer than 2 edges",
                start, stop, step
            )));
        }
        let edges = (0..count as usize)
            .map(|i| start + i as f64 * step)
            .collect();
        Self::new(edges)
    }

    /// Keep every `n`-th edge, starting with the first
    pub fn every_nth(&self, n: usize) -> StatsResult<Self> {
        let n = n.max(1);
        Self::new(self.edges.iter().copied().step_by(n).collect())
    }

    /// Number of bins (one less than the number of edges)
    pub fn num_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// Raw edge values
    pub fn as_slice(&self) -> &[f64] {
        &self.edges
    }

    /// First and last edge
    pub fn range(&self) -> (f64, f64) {
        (self.edges[0], self.edges[self.edges.len() - 1])
    }

    /// Width of every bin
    pub fn widths(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Lower and upper edge of bin `i`
    pub fn bounds(&self, i: usize) -> Option<(f64, f64)> {
        if i < self.num_bins() {
            Some((self.edges[i], self.edges[i + 1]))
        } else {
            None
        }
    }

    /// Index of the bin containing `value`
    ///
    /// Returns `None` for NaN and for values outside `[first, last]`.
    pub fn locate(&self, value: f64) -> Option<usize> {
        let (lo, hi) = self.range();
        if !(value >= lo && value <= hi) {
            return None;
        }
        if value == hi {
            return Some(self.num_bins() - 1);
        }
        Some(self.edges.partition_point(|e| *e <= value) - 1)
    }
}

impl TryFrom<Vec<f64>> for BinEdges {
    type Error = StatsError;

    fn try_from(edges: Vec<f64>) -> StatsResult<Self> {
        Self::new(edges)
    }
}

impl From<BinEdges> for Vec<f64> {
    fn from(bins: BinEdges) -> Self {
        bins.edges
    }
}
