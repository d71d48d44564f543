//! tdplot-io - Data I/O for transit routing statistics
//!
//! This crate reads the inputs of the figure pipeline:
//!
//! - **Discovery**: shell-style matching of per-target result files
//! - **Statistics files**: pickled `{target, stats}` dicts
//! - **Observable matrices**: one observable across all targets
//! - **Cache**: `fetch_or_compute` over key-addressed stores
//! - **Nodes**: the stop listing used for geographic plots
//!
//! All reads are blocking and sequential; a missing or malformed input
//! file is returned as an error for the caller to propagate.

pub mod cache;
pub mod discovery;
pub mod error;
pub mod matrix;
pub mod nodes;
pub mod stats_file;

pub use cache::*;
pub use discovery::*;
pub use error::*;
pub use matrix::*;
pub use nodes::*;
pub use stats_file::*;
