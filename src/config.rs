//! Run configuration and command line arguments
//!
//! Defaults reproduce the published layout: inputs under `results/` and images under
//! `public/images/blog`, both relative to the working directory.

use argh::FromArgs;
use std::path::PathBuf;

pub const DEFAULT_INTERPRETABILITY_PATH: &str =
    "results/interpretability/interpretability_results.json";
pub const DEFAULT_CORRELATIONS_PATH: &str =
    "results/interpretability_pubsolid/projection_feature_correlations.json";
pub const DEFAULT_OUTPUT_DIR: &str = "public/images/blog";

/// Leading PCA components shown in the explained variance chart
pub const DEFAULT_COMPONENTS: usize = 4;

/// Strongest correlations that get a p-value label
pub const DEFAULT_ANNOTATE_TOP: usize = 5;

/// Layer the projection direction and PCA proxy were taken from
pub const DEFAULT_LAYER: u32 = 18;

/// Samples behind the correlation statistics
pub const DEFAULT_SAMPLES: u32 = 300;

/// Everything a run needs; see [`crate::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub interpretability_path: PathBuf,
    pub correlations_path: PathBuf,
    pub output_dir: PathBuf,
    pub components: usize,
    pub annotate_top: usize,
    pub layer: u32,
    pub samples: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interpretability_path: PathBuf::from(DEFAULT_INTERPRETABILITY_PATH),
            correlations_path: PathBuf::from(DEFAULT_CORRELATIONS_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            components: DEFAULT_COMPONENTS,
            annotate_top: DEFAULT_ANNOTATE_TOP,
            layer: DEFAULT_LAYER,
            samples: DEFAULT_SAMPLES,
        }
    }
}

/// Renders interpretability charts from precomputed result files
#[derive(FromArgs, Debug)]
pub struct Args {
    /// interpretability results JSON (.json or .json.zst)
    #[argh(
        option,
        short = 'i',
        default = "PathBuf::from(DEFAULT_INTERPRETABILITY_PATH)"
    )]
    pub interpretability: PathBuf,

    /// projection/feature correlations JSON (.json or .json.zst)
    #[argh(option, short = 'c', default = "PathBuf::from(DEFAULT_CORRELATIONS_PATH)")]
    pub correlations: PathBuf,

    /// directory the PNG files are written to, created if missing
    #[argh(option, short = 'o', default = "PathBuf::from(DEFAULT_OUTPUT_DIR)")]
    pub output_dir: PathBuf,

    /// number of PCA components to plot (default: 4)
    #[argh(option, default = "DEFAULT_COMPONENTS")]
    pub components: usize,

    /// number of strongest correlations to annotate with p-values (default: 5)
    #[argh(option, default = "DEFAULT_ANNOTATE_TOP")]
    pub annotate_top: usize,

    /// layer index shown in chart titles (default: 18)
    #[argh(option, default = "DEFAULT_LAYER")]
    pub layer: u32,

    /// sample count shown in the correlation chart title (default: 300)
    #[argh(option, default = "DEFAULT_SAMPLES")]
    pub samples: u32,

    /// print the ranked correlation table
    #[argh(switch, short = 's')]
    pub summary: bool,

    /// enable debug logging
    #[argh(switch, short = 'v')]
    pub verbose: bool,
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Self {
            interpretability_path: args.interpretability.clone(),
            correlations_path: args.correlations.clone(),
            output_dir: args.output_dir.clone(),
            components: args.components,
            annotate_top: args.annotate_top,
            layer: args.layer,
            samples: args.samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::from_args(&["interp-plots"], args).unwrap()
    }

    #[test]
    fn no_arguments_matches_defaults() {
        let config = Config::from(&parse(&[]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn arguments_override_defaults() {
        let args = parse(&[
            "-i",
            "interp.json.zst",
            "--correlations",
            "corr.json",
            "-o",
            "out",
            "--components",
            "6",
            "--annotate-top",
            "3",
            "--layer",
            "12",
            "--samples",
            "500",
            "--summary",
        ]);
        assert!(args.summary);
        assert!(!args.verbose);

        let config = Config::from(&args);
        assert_eq!(config.interpretability_path, PathBuf::from("interp.json.zst"));
        assert_eq!(config.correlations_path, PathBuf::from("corr.json"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.components, 6);
        assert_eq!(config.annotate_top, 3);
        assert_eq!(config.layer, 12);
        assert_eq!(config.samples, 500);
    }

    #[test]
    fn rejects_non_numeric_components() {
        assert!(Args::from_args(&["interp-plots"], &["--components", "four"]).is_err());
    }
}
