//! Chart renderers, one module per output image
//!
//! - Activation differences across layers
//! - Explained variance of the PCA proxy
//! - Projection/stylometry correlations

pub mod activation_differences;
pub mod correlations;
pub mod explained_variance;

pub use correlations::{ranked_correlations, RankedCorrelation};
