//! Observable matrices assembled from many result files

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{IoError, IoResult};
use crate::stats_file::{read_target_stats, scan_negative_values};

/// One observable across targets: a row per result file, a column per origin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservableMatrix {
    rows: Vec<Vec<f64>>,
}

impl ObservableMatrix {
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// `(rows, columns of the widest row)`
    pub fn shape(&self) -> (usize, usize) {
        (
            self.rows.len(),
            self.rows.iter().map(Vec::len).max().unwrap_or(0),
        )
    }

    /// Entry at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// All values in row-major order
    pub fn flatten(&self) -> Vec<f64> {
        self.rows.iter().flatten().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }
}

/// Read one observable from every file, one matrix row per file
///
/// Files missing the observable abort the load. Negative entries of
/// `min_temporal_distance` are reported for manual inspection.
pub fn compute_observable_matrix(
    files: &[PathBuf],
    observable: &str,
) -> IoResult<ObservableMatrix> {
    let mut rows = Vec::with_capacity(files.len());
    for path in files {
        let stats = read_target_stats(path)?;
        if observable == "min_temporal_distance"
            && scan_negative_values(&stats, observable) == Some(true)
        {
            warn!(
                path = %path.display(),
                target = %stats.target,
                "negative values in result file"
            );
        }
        let values = stats
            .stats
            .get(observable)
            .ok_or_else(|| IoError::ObservableNotFound {
                observable: observable.to_string(),
                path: path.clone(),
            })?;
        rows.push(values.clone());
    }
    let matrix = ObservableMatrix::new(rows);
    info!(observable, shape = ?matrix.shape(), "assembled observable matrix");
    Ok(matrix)
}
