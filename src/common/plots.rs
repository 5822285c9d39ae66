//! Plotting infrastructure shared by the chart modules
//!
//! Charts are drawn with the [`plotters`] bitmap backend and saved as PNG files.
//! The helpers here cover the parts every chart needs: axis range selection,
//! grid styling and font construction.

use super::constants::{FONT_FAMILY, GRID_ALPHA};
use plotters::prelude::*;
use plotters::style::{FontFamily, FontStyle};
use std::ops::Range;
use thiserror::Error;

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Failed to save plot to file: {0}")]
    FileSave(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = core::result::Result<T, PlotError>;

/// Returns the `min..max` span of `values` widened by `fraction` of its width on each side
///
/// Non-finite values are skipped. An empty input, or one whose values are all equal,
/// falls back to a span of 1.0 either side of the centre so the axis is still drawable.
///
/// # Arguments
/// * `values` - Data plotted along the axis
/// * `fraction` - Relative padding, e.g. `0.05` for 5% of the data span
pub fn padded_range(values: &[f64], fraction: f64) -> Range<f64> {
    let (min, max) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !min.is_finite() || !max.is_finite() {
        return -1.0..1.0;
    }

    let span = max - min;
    if span.abs() < f64::EPSILON {
        return (min - 1.0)..(max + 1.0);
    }

    let pad = span * fraction;
    (min - pad)..(max + pad)
}

/// Inclusive integer axis range with half a unit of room on each side
///
/// Used for the layer and component axes so the end points aren't drawn on the frame.
pub fn index_range(indices: &[f64]) -> Range<f64> {
    let min = indices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = indices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }

    (min - 0.5)..(max + 0.5)
}

/// Most labels put on an integer axis; wider spans fall back to steps of 2, 5, 10...
pub const MAX_INTEGER_TICKS: usize = 16;

/// Number of integers inside `range`, capped at [`MAX_INTEGER_TICKS`]
///
/// Passed to `x_labels` so that plotters places its key points on whole numbers.
pub fn integer_tick_count(range: &Range<f64>) -> usize {
    let first = range.start.ceil();
    let last = range.end.floor();
    if !first.is_finite() || !last.is_finite() || last < first {
        return 1;
    }

    ((last - first) as usize + 1).clamp(1, MAX_INTEGER_TICKS)
}

/// Returns the whole number `x` falls on, if it is one
pub fn integer_tick(x: f64) -> Option<i64> {
    let rounded = x.round();
    ((x - rounded).abs() < 1e-9).then_some(rounded as i64)
}

/// Label for an integer axis; ticks between whole numbers stay blank
pub fn integer_tick_label(x: f64) -> String {
    integer_tick(x)
        .map(|value| value.to_string())
        .unwrap_or_default()
}

/// Formats an axis value with fixed decimals, never printing a negative zero
pub fn axis_value_label(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value);
    match formatted.strip_prefix('-') {
        Some(magnitude) if magnitude.chars().all(|c| c == '0' || c == '.') => {
            magnitude.to_string()
        }
        _ => formatted,
    }
}

/// Faint grid line style
pub fn grid_style() -> ShapeStyle {
    BLACK.mix(GRID_ALPHA).stroke_width(1)
}

/// Plain text style of the given size in the chart font
pub fn font(size: u32) -> TextStyle<'static> {
    TextStyle::from(font_desc(size))
}

/// Font descriptor of the given size, for text that needs a transform applied
pub fn font_desc(size: u32) -> FontDesc<'static> {
    FontDesc::new(FontFamily::Name(FONT_FAMILY), f64::from(size), FontStyle::Normal)
}
