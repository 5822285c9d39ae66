//! Canvas, palette and file name constants for the rendered charts
//!
//! Canvas sizes correspond to the figure sizes of the published charts at 200 dpi.

use plotters::style::RGBColor;

/// Pixels per inch of the published figures
pub const DPI: u32 = 200;

/// Two-panel activation difference figure (10 x 3.2 in)
pub const ACTIVATION_CANVAS: (u32, u32) = (10 * DPI, 16 * DPI / 5);

/// Grouped explained variance bars (7.5 x 3.2 in)
pub const VARIANCE_CANVAS: (u32, u32) = (15 * DPI / 2, 16 * DPI / 5);

/// Ranked correlation bars (10 x 3.8 in)
pub const CORRELATION_CANVAS: (u32, u32) = (10 * DPI, 19 * DPI / 5);

/// Default line color for the first series of a chart
pub const DEFAULT_BLUE: RGBColor = RGBColor(0x1f, 0x77, 0xb4);

/// US condition, and positive correlations
pub const US_BLUE: RGBColor = RGBColor(0x25, 0x63, 0xeb);

/// UK condition, negative correlations, and the L2 norm series
pub const UK_AMBER: RGBColor = RGBColor(0xb4, 0x53, 0x09);

/// Opacity of grid lines
pub const GRID_ALPHA: f64 = 0.3;

pub const FONT_FAMILY: &str = "sans-serif";
pub const SUPTITLE_FONT_SIZE: u32 = 40;
pub const CAPTION_FONT_SIZE: u32 = 34;
pub const AXIS_DESC_FONT_SIZE: u32 = 28;
pub const LABEL_FONT_SIZE: u32 = 24;
pub const ANNOTATION_FONT_SIZE: u32 = 22;

/// Output file names, in render order
pub const ACTIVATION_FILE_NAME: &str = "activation_differences.png";
pub const VARIANCE_FILE_NAME: &str = "sae_features.png";
pub const CORRELATION_FILE_NAME: &str = "projection_feature_correlations.png";
