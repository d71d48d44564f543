//! tdplot - temporal-distance figure runner
//!
//! Reads the configuration from the path given as the first argument, else
//! from `TDPLOT_CONFIG`, else from `tdplot.toml` when present, and falls
//! back to the built-in defaults. Log verbosity follows `RUST_LOG`.

use std::path::{Path, PathBuf};

use tdplot_core::{Pipeline, PlotConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_FILE: &str = "tdplot.toml";

fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("TDPLOT_CONFIG").map(PathBuf::from))
        .or_else(|| {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            default.exists().then(|| default.to_path_buf())
        })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match config_path() {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            PlotConfig::from_file(&path)?
        }
        None => PlotConfig::default(),
    };

    let manifest = Pipeline::new(config)?.run()?;
    for figure in &manifest.figures {
        println!("{}", figure.path.display());
    }
    for skipped in &manifest.skipped {
        println!("skipped {}: {}", skipped.name, skipped.reason);
    }
    Ok(())
}
