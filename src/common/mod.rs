//! Common infrastructure modules shared across the charts
//!
//! This module provides reusable infrastructure for:
//! - Data structures mirroring the upstream result files
//! - Palette and canvas constants
//! - Plotting helpers and the shared plot error type

pub mod constants;
pub mod data_structures;
pub mod plots;

// Re-export commonly used items
pub use data_structures::{CorrelationResults, InterpretabilityResults};
pub use plots::PlotError;
