//! tdplot-stats - Statistical primitives for temporal-distance figures
//!
//! This crate holds the numerical side of the figure pipeline:
//!
//! - **Bin edges**: validated, numpy-compatible edge sequences
//! - **Histograms**: 1D and 2D counts with density normalization
//! - **Binned statistics**: per-bin mean and 5th/95th percentile band
//! - **Cleansing**: sentinel replacement and validity masks
//!
//! Nothing here draws; `tdplot-core` turns these results into figures.

pub mod binned;
pub mod binning;
pub mod cleanse;
pub mod error;
pub mod histogram;
pub mod percentile;

pub use binned::*;
pub use binning::*;
pub use cleanse::*;
pub use error::*;
pub use histogram::*;
pub use percentile::*;
