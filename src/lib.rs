//! # interp-plots
//!
//! Renders the interpretability write-up charts from precomputed result files:
//!
//! - `activation_differences.png`: layerwise cosine similarity and L2 norm
//! - `sae_features.png`: explained variance of the PCA proxy, US vs UK
//! - `projection_feature_correlations.png`: Pearson r per stylometric feature
//!
//! Everything runs on one thread. Any missing file, malformed document or absent
//! key stops the run with a [`RenderError`].

pub mod charts;
pub mod common;
pub mod config;
pub mod parsing;
pub mod report;

pub use config::Config;
pub use report::RenderReport;

use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Errors that can occur while producing the charts
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Parsing error: {0}")]
    Parsing(#[from] parsing::ParsingError),

    #[error("Plot error: {0}")]
    Plot(#[from] common::PlotError),

    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to inspect written image {path}: {source}")]
    Inspect {
        path: PathBuf,
        source: std::io::Error,
    },
}

type Result<T> = core::result::Result<T, RenderError>;

/// Loads both result files and renders the three charts
///
/// Both inputs are parsed before anything is drawn, so a bad input never leaves
/// a partial set of images behind.
///
/// # Returns
/// * `Ok(RenderReport)` - Written images in render order, plus the correlation ranking
/// * `Err(RenderError)` - On the first failure
pub fn run(config: &Config) -> Result<RenderReport> {
    let interpretability = parsing::load_interpretability(&config.interpretability_path)?;
    let correlations = parsing::load_correlations(&config.correlations_path)?;

    std::fs::create_dir_all(&config.output_dir).map_err(|source| RenderError::OutputDir {
        path: config.output_dir.clone(),
        source,
    })?;

    let ranked = charts::ranked_correlations(&correlations);
    let mut report = RenderReport::default();

    let written = [
        charts::activation_differences::render(&interpretability, &config.output_dir)?,
        charts::explained_variance::render(
            &interpretability.sae,
            config.components,
            config.layer,
            &config.output_dir,
        )?,
        charts::correlations::render(
            &ranked,
            config.annotate_top,
            config.layer,
            config.samples,
            &config.output_dir,
        )?,
    ];

    for path in written {
        info!(path = %path.display(), "wrote chart");
        report
            .record(path.clone())
            .map_err(|source| RenderError::Inspect { path, source })?;
    }

    report.correlations = ranked;
    Ok(report)
}
