//! Node listing reader
//!
//! The listing is a CSV with at least the columns `lat`, `lon` and `desc`;
//! any other columns are ignored. Row order matches the origin order of the
//! per-target statistics arrays.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IoError, IoResult};

/// A stop of the transit network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub desc: String,
}

/// Read every node from a CSV listing
pub fn read_nodes(path: &Path) -> IoResult<Vec<Node>> {
    let file = File::open(path).map_err(|e| IoError::open(path, e))?;
    read_nodes_from(BufReader::new(file))
}

/// Read nodes from any CSV source with a header row
pub fn read_nodes_from<R: std::io::Read>(reader: R) -> IoResult<Vec<Node>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let mut nodes = Vec::new();
    for record in reader.deserialize() {
        nodes.push(record?);
    }
    Ok(nodes)
}
