//! Per-target statistics files
//!
//! Each result file is a pickled dict holding the `target` node and a
//! `stats` mapping from observable name to one value per origin node.
//! Values may be floats, ints, or `None`; `None` becomes NaN so it flows
//! through the same sentinel handling as unreachable origins.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_pickle::{DeOptions, SerOptions};
use tracing::debug;

use crate::error::{IoError, IoResult};

/// Identifier of the target node a result file was computed for
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetId {
    Int(i64),
    Name(String),
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetId::Int(id) => write!(f, "{}", id),
            TargetId::Name(name) => f.write_str(name),
        }
    }
}

impl From<i64> for TargetId {
    fn from(id: i64) -> Self {
        TargetId::Int(id)
    }
}

/// Decoded contents of one result file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetStats {
    pub target: TargetId,
    pub stats: BTreeMap<String, Vec<f64>>,
}

#[derive(Deserialize)]
struct RawTargetStats {
    target: TargetId,
    stats: BTreeMap<String, Vec<Option<f64>>>,
}

impl From<RawTargetStats> for TargetStats {
    fn from(raw: RawTargetStats) -> Self {
        let stats = raw
            .stats
            .into_iter()
            .map(|(name, values)| {
                let values = values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
                (name, values)
            })
            .collect();
        Self {
            target: raw.target,
            stats,
        }
    }
}

impl TargetStats {
    /// Values of one observable
    pub fn observable(&self, name: &str) -> Option<&[f64]> {
        self.stats.get(name).map(Vec::as_slice)
    }

}

/// Read and decode a pickled result file
pub fn read_target_stats(path: &Path) -> IoResult<TargetStats> {
    let file = File::open(path).map_err(|e| IoError::open(path, e))?;
    let raw: RawTargetStats = serde_pickle::from_reader(BufReader::new(file), DeOptions::new())
        .map_err(|e| IoError::InvalidFormat {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    let stats = TargetStats::from(raw);
    debug!(
        path = %path.display(),
        target = %stats.target,
        observables = stats.stats.len(),
        "read target statistics"
    );
    Ok(stats)
}

/// Write a result file in the same layout the reader expects
pub fn write_target_stats(path: &Path, stats: &TargetStats) -> IoResult<()> {
    let file = File::create(path).map_err(|e| IoError::open(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_pickle::to_writer(&mut writer, stats, SerOptions::new())?;
    Ok(())
}

/// Whether an observable holds finite negative values
///
/// Returns `None` when the observable is missing from the file.
pub fn scan_negative_values(stats: &TargetStats, observable: &str) -> Option<bool> {
    stats
        .observable(observable)
        .map(|values| values.iter().any(|&v| v.is_finite() && v < 0.0))
}
