//! One- and two-dimensional histograms over explicit bin edges
//!
//! Both kinds support density normalization: each count is divided by the
//! total number of in-range samples and by the bin area, so the histogram
//! integrates to one over the covered range. Samples outside the edges (and
//! NaN) are excluded and tallied, never treated as errors.

use ndarray::Array2;

use crate::binning::BinEdges;
use crate::error::{StatsError, StatsResult};

/// Counts of a single variable
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram1D {
    edges: BinEdges,
    counts: Vec<u64>,
    excluded: usize,
}

impl Histogram1D {
    /// Count `values` into `edges`
    pub fn from_values(values: &[f64], edges: &BinEdges) -> Self {
        let mut counts = vec![0u64; edges.num_bins()];
        let mut excluded = 0;
        for &v in values {
            match edges.locate(v) {
                Some(i) => counts[i] += 1,
                None => excluded += 1,
            }
        }
        Self {
            edges: edges.clone(),
            counts,
            excluded,
        }
    }

    pub fn edges(&self) -> &BinEdges {
        &self.edges
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Samples that fell inside the edges
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Samples outside the edges or NaN
    pub fn excluded(&self) -> usize {
        self.excluded
    }

    /// Probability density per bin
    pub fn density(&self) -> StatsResult<Vec<f64>> {
        let total = self.total();
        if total == 0 {
            return Err(StatsError::NoSamplesInRange {
                excluded: self.excluded,
            });
        }
        Ok(self
            .counts
            .iter()
            .zip(self.edges.widths())
            .map(|(&c, w)| c as f64 / (total as f64 * w))
            .collect())
    }
}

/// Joint counts of paired samples, indexed `(x_bin, y_bin)`
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram2D {
    x_edges: BinEdges,
    y_edges: BinEdges,
    counts: Array2<u64>,
    excluded: usize,
}

impl Histogram2D {
    /// Count `(x[i], y[i])` pairs into the grid spanned by both edge sets
    ///
    /// A pair is counted only when both coordinates fall inside their edges.
    pub fn from_pairs(
        x: &[f64],
        y: &[f64],
        x_edges: &BinEdges,
        y_edges: &BinEdges,
    ) -> StatsResult<Self> {
        if x.len() != y.len() {
            return Err(StatsError::LengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }

        let mut counts = Array2::<u64>::zeros((x_edges.num_bins(), y_edges.num_bins()));
        let mut excluded = 0;
        for (&xv, &yv) in x.iter().zip(y) {
            match (x_edges.locate(xv), y_edges.locate(yv)) {
                (Some(i), Some(j)) => counts[[i, j]] += 1,
                _ => excluded += 1,
            }
        }

        Ok(Self {
            x_edges: x_edges.clone(),
            y_edges: y_edges.clone(),
            counts,
            excluded,
        })
    }

    pub fn x_edges(&self) -> &BinEdges {
        &self.x_edges
    }

    pub fn y_edges(&self) -> &BinEdges {
        &self.y_edges
    }

    pub fn counts(&self) -> &Array2<u64> {
        &self.counts
    }

    /// Pairs counted inside the grid
    pub fn total(&self) -> u64 {
        self.counts.sum()
    }

    /// Pairs with at least one coordinate out of range or NaN
    pub fn excluded(&self) -> usize {
        self.excluded
    }

    /// Density grid: `count / (total * dx_i * dy_j)`
    pub fn density(&self) -> StatsResult<Array2<f64>> {
        let total = self.total();
        if total == 0 {
            return Err(StatsError::NoSamplesInRange {
                excluded: self.excluded,
            });
        }
        let dx = self.x_edges.widths();
        let dy = self.y_edges.widths();
        let total = total as f64;
        Ok(Array2::from_shape_fn(self.counts.dim(), |(i, j)| {
            self.counts[[i, j]] as f64 / (total * dx[i] * dy[j])
        }))
    }

    /// Density grid with empty cells marked missing
    ///
    /// A `None` cell had no observations at all, which is a different thing
    /// from a cell whose density is merely small.
    pub fn masked_density(&self) -> StatsResult<Array2<Option<f64>>> {
        let density = self.density()?;
        Ok(Array2::from_shape_fn(density.dim(), |(i, j)| {
            if self.counts[[i, j]] == 0 {
                None
            } else {
                Some(density[[i, j]])
            }
        }))
    }
}
