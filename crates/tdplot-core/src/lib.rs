//! tdplot-core - Figure engine for temporal-distance statistics
//!
//! This crate turns the per-target routing statistics loaded by `tdplot-io`
//! into publication figures.
//!
//! # Key Components
//!
//! - **DensityPlot**: binned bivariate density with mean and percentile overlay
//! - **StepHistogram**: filled step densities sharing one panel
//! - **StopMap / MapGrid**: per-stop observables on a Web Mercator frame
//! - **FlattenedObservables**: all origin/target pairs after sentinel filtering
//! - **Pipeline**: the full figure catalog plus a JSON manifest
//!
//! # Rendering
//!
//! Drawing goes through plotters. Every figure draws onto an arbitrary
//! drawing area, so the same code writes PNG files, SVG files or in-memory
//! buffers. With labels switched off no text is drawn and no fonts are
//! needed.

mod chart;

pub mod colormap;
pub mod config;
pub mod dataset;
pub mod density;
pub mod derived;
pub mod error;
pub mod export;
pub mod figures;
pub mod histogram;
pub mod map;
pub mod pipeline;

pub use chart::{clip_polyline, Limits, LineStyle, ReferenceLine};
pub use colormap::*;
pub use config::*;
pub use dataset::{
    load_flattened, load_quicklook, names, symmetry_pairs, time_bins, FlattenedObservables,
    QuickLook, ALL_TO_ALL_OBSERVABLES, TEMPORAL_OBSERVABLES,
};
pub use density::*;
pub use error::*;
pub use export::*;
pub use figures::*;
pub use histogram::*;
pub use map::*;
pub use pipeline::{run, Pipeline};
