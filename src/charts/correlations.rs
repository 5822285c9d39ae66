//! Projection/stylometry correlation chart
//!
//! Renders one bar per stylometric feature, ranked by correlation magnitude and
//! colored by sign, with p-values annotated on the strongest few.

use crate::common::constants::{
    ANNOTATION_FONT_SIZE, AXIS_DESC_FONT_SIZE, CAPTION_FONT_SIZE, CORRELATION_CANVAS,
    CORRELATION_FILE_NAME, FONT_FAMILY, LABEL_FONT_SIZE, UK_AMBER, US_BLUE,
};
use crate::common::plots::{
    axis_value_label, font, font_desc, grid_style, integer_tick, PlotError,
};
use crate::common::CorrelationResults;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::debug;

type Result<T> = core::result::Result<T, PlotError>;

/// Gap between a positive bar's top and its p-value label
const POSITIVE_LABEL_OFFSET: f64 = 0.02;

/// Gap between a negative bar's bottom and its p-value label
const NEGATIVE_LABEL_OFFSET: f64 = 0.04;

/// Room left above and below the bars for the p-value labels
const VALUE_AXIS_HEADROOM: f64 = 0.08;

/// Bar width in index units; bars are centred on their index
const BAR_WIDTH: f64 = 0.8;

/// Feature names read upwards along the bar axis
const TICK_LABEL_TRANSFORM: FontTransform = FontTransform::Rotate270;

/// One feature's statistics, in ranked position
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCorrelation {
    pub feature: String,
    pub r: f64,
    pub p: f64,
}

/// Orders features by descending `|r|`
///
/// The sort is stable; features of equal magnitude keep their document order.
pub fn ranked_correlations(results: &CorrelationResults) -> Vec<RankedCorrelation> {
    let mut ranked: Vec<RankedCorrelation> = results
        .correlations
        .iter()
        .map(|(feature, stats)| RankedCorrelation {
            feature: feature.clone(),
            r: stats.pearson_r,
            p: stats.pearson_p,
        })
        .collect();

    ranked.sort_by(|a, b| b.r.abs().total_cmp(&a.r.abs()));
    ranked
}

/// Bar color by correlation sign; zero counts as positive
pub fn bar_color(r: f64) -> RGBColor {
    if r >= 0.0 {
        US_BLUE
    } else {
        UK_AMBER
    }
}

/// Formats a p-value in scientific notation with one decimal, e.g. `3.2e-05`
///
/// The exponent always carries a sign and at least two digits so labels line up.
pub fn format_p_value(p: f64) -> String {
    let formatted = format!("{:.1e}", p);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        // NaN and infinities have no exponent
        None => formatted,
    }
}

/// Y axis range: spans zero and every bar, with room for the annotations
pub fn correlation_axis_range(ranked: &[RankedCorrelation]) -> Range<f64> {
    let max = ranked.iter().map(|c| c.r).fold(0.0f64, f64::max);
    let min = ranked.iter().map(|c| c.r).fold(0.0f64, f64::min);
    (min - VALUE_AXIS_HEADROOM)..(max + VALUE_AXIS_HEADROOM)
}

/// X axis range: one unit per feature, centred on indices `0..count`
pub fn feature_axis_range(count: usize) -> Range<f64> {
    -0.5..(count as f64 - 0.5)
}

/// Feature name shown under the bar at index `x`; other ticks stay blank
pub fn feature_tick_label(ranked: &[RankedCorrelation], x: f64) -> String {
    integer_tick(x)
        .and_then(|index| usize::try_from(index).ok())
        .and_then(|index| ranked.get(index))
        .map(|c| c.feature.clone())
        .unwrap_or_default()
}

/// Horizontal extent of the bar at `index`
fn bar_span(index: usize) -> (f64, f64) {
    let centre = index as f64;
    (centre - BAR_WIDTH / 2.0, centre + BAR_WIDTH / 2.0)
}

/// Position and anchor of the p-value label for a bar of height `r`
fn annotation_anchor(r: f64) -> (f64, VPos) {
    if r >= 0.0 {
        (r + POSITIVE_LABEL_OFFSET, VPos::Bottom)
    } else {
        (r - NEGATIVE_LABEL_OFFSET, VPos::Top)
    }
}

/// Renders `projection_feature_correlations.png` into `output_dir`
///
/// # Arguments
/// * `ranked` - Features in ranked order, see [`ranked_correlations`]
/// * `annotate_top` - Number of leading bars that get a p-value label
/// * `layer` - Layer of the projection direction, shown in the title
/// * `samples` - Number of samples the correlations were computed over, shown in the title
/// * `output_dir` - Directory where the PNG file should be saved
pub fn render(
    ranked: &[RankedCorrelation],
    annotate_top: usize,
    layer: u32,
    samples: u32,
    output_dir: &Path,
) -> Result<PathBuf> {
    if ranked.is_empty() {
        return Err(PlotError::InvalidData(
            "correlations contains no features".to_string(),
        ));
    }

    let output_path = output_dir.join(CORRELATION_FILE_NAME);
    let title = format!(
        "Projection onto Δ (layer {}) ↔ stylometry (n={})",
        layer, samples
    );

    debug!(
        features = ranked.len(),
        annotated = annotate_top.min(ranked.len()),
        path = %output_path.display(),
        "rendering feature correlations"
    );

    draw_correlation_chart(ranked, annotate_top, &title, &output_path)?;
    Ok(output_path)
}

fn draw_correlation_chart(
    ranked: &[RankedCorrelation],
    annotate_top: usize,
    title: &str,
    output_path: &Path,
) -> Result<()> {
    let root = BitMapBackend::new(output_path, CORRELATION_CANVAS).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let count = ranked.len();
    let x_range = feature_axis_range(count);
    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT_FAMILY, CAPTION_FONT_SIZE))
        .margin(20)
        .x_label_area_size(220)
        .y_label_area_size(110)
        .build_cartesian_2d(x_range.clone(), correlation_axis_range(ranked))
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    let tick_font = TextStyle::from(font_desc(LABEL_FONT_SIZE).transform(TICK_LABEL_TRANSFORM));
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(count)
        .x_label_formatter(&|x| feature_tick_label(ranked, *x))
        .x_label_style(tick_font)
        .y_desc("Pearson r")
        .axis_desc_style((FONT_FAMILY, AXIS_DESC_FONT_SIZE))
        .y_label_style((FONT_FAMILY, LABEL_FONT_SIZE))
        .y_label_formatter(&|y| axis_value_label(*y, 1))
        .bold_line_style(grid_style())
        .light_line_style(WHITE)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .draw_series(ranked.iter().enumerate().map(|(index, c)| {
            let (left, right) = bar_span(index);
            Rectangle::new([(left, 0.0), (right, c.r)], bar_color(c.r).filled())
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(x_range.start, 0.0), (x_range.end, 0.0)],
            BLACK.stroke_width(2),
        )))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .draw_series(ranked.iter().take(annotate_top).enumerate().map(|(index, c)| {
            let (y, vpos) = annotation_anchor(c.r);
            Text::new(
                format!("p={}", format_p_value(c.p)),
                (index as f64, y),
                font(ANNOTATION_FONT_SIZE).pos(Pos::new(HPos::Center, vpos)),
            )
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::data_structures::FeatureCorrelation;
    use rstest::rstest;
    use std::fs;

    fn results(entries: &[(&str, f64, f64)]) -> CorrelationResults {
        let correlations: Vec<(String, FeatureCorrelation)> = entries
            .iter()
            .map(|&(name, pearson_r, pearson_p)| {
                (
                    name.to_string(),
                    FeatureCorrelation {
                        pearson_r,
                        pearson_p,
                    },
                )
            })
            .collect();
        CorrelationResults { correlations }
    }

    #[test]
    fn ranks_by_descending_magnitude() {
        let data = results(&[
            ("comma_rate", 0.05, 0.4),
            ("avg_word_len", -0.61, 1e-30),
            ("type_token_ratio", 0.33, 2e-9),
            ("exclamation_rate", -0.2, 5e-4),
        ]);

        let ranked = ranked_correlations(&data);
        let names: Vec<&str> = ranked.iter().map(|c| c.feature.as_str()).collect();
        assert_eq!(
            names,
            ["avg_word_len", "type_token_ratio", "exclamation_rate", "comma_rate"]
        );

        for pair in ranked.windows(2) {
            assert!(pair[0].r.abs() >= pair[1].r.abs());
        }
    }

    #[test]
    fn equal_magnitudes_keep_document_order() {
        let data = results(&[("b", -0.2, 0.1), ("a", 0.2, 0.1), ("c", 0.5, 0.1)]);

        let ranked = ranked_correlations(&data);
        let names: Vec<&str> = ranked.iter().map(|c| c.feature.as_str()).collect();
        assert_eq!(names, ["c", "b", "a"]);
    }

    #[test]
    fn nan_magnitudes_do_not_disturb_ranking() {
        let data = results(&[("a", 0.1, 0.1), ("broken", f64::NAN, 0.1), ("b", -0.7, 0.1)]);

        let ranked = ranked_correlations(&data);
        let finite: Vec<&str> = ranked
            .iter()
            .filter(|c| c.r.is_finite())
            .map(|c| c.feature.as_str())
            .collect();
        assert_eq!(ranked.len(), 3);
        assert_eq!(finite, ["b", "a"]);
    }

    #[test]
    fn single_feature_gets_one_centred_bar() {
        let ranked = ranked_correlations(&results(&[("comma_rate", -0.3, 0.01)]));

        let range = feature_axis_range(ranked.len());
        assert_eq!(range, -0.5..0.5);

        let (left, right) = bar_span(0);
        assert!((left + right).abs() < 1e-12);
        assert!(left > range.start && right < range.end);

        assert_eq!(feature_tick_label(&ranked, 0.0), "comma_rate");
        assert_eq!(feature_tick_label(&ranked, -0.5), "");
        assert_eq!(feature_tick_label(&ranked, 0.5), "");
    }

    #[test]
    fn tick_labels_follow_rank_order() {
        let ranked = ranked_correlations(&results(&[
            ("comma_rate", 0.05, 0.4),
            ("avg_word_len", -0.61, 1e-30),
            ("type_token_ratio", 0.33, 2e-9),
        ]));

        let labels: Vec<String> = [0.0, 0.5, 1.0, 2.0, 3.0, -1.0]
            .into_iter()
            .map(|x| feature_tick_label(&ranked, x))
            .collect();
        assert_eq!(
            labels,
            ["avg_word_len", "", "type_token_ratio", "comma_rate", "", ""]
        );
        assert_eq!(feature_axis_range(ranked.len()), -0.5..2.5);
    }

    #[test]
    fn feature_names_read_upwards() {
        assert!(matches!(TICK_LABEL_TRANSFORM, FontTransform::Rotate270));
    }

    #[test]
    fn zero_gridline_label_is_unsigned() {
        let ranked = ranked_correlations(&results(&[("a", -0.4, 0.1), ("b", 0.3, 0.1)]));
        let range = correlation_axis_range(&ranked);
        assert!(range.start < 0.0 && range.end > 0.0);
        assert_eq!(axis_value_label(-0.0, 1), "0.0");
    }

    #[rstest]
    #[case(0.3, US_BLUE)]
    #[case(0.0, US_BLUE)]
    #[case(-0.01, UK_AMBER)]
    fn color_follows_sign(#[case] r: f64, #[case] expected: RGBColor) {
        assert_eq!(bar_color(r), expected);
    }

    #[rstest]
    #[case(3.2e-5, "3.2e-05")]
    #[case(1.0e-120, "1.0e-120")]
    #[case(0.5, "5.0e-01")]
    #[case(0.049, "4.9e-02")]
    #[case(12.0, "1.2e+01")]
    #[case(1.0, "1.0e+00")]
    fn p_values_use_two_digit_exponents(#[case] p: f64, #[case] expected: &str) {
        assert_eq!(format_p_value(p), expected);
    }

    #[test]
    fn annotations_sit_outside_the_bar() {
        let (y, vpos) = annotation_anchor(0.4);
        assert!((y - 0.42).abs() < 1e-12);
        assert!(matches!(vpos, VPos::Bottom));

        let (y, vpos) = annotation_anchor(-0.4);
        assert!((y + 0.44).abs() < 1e-12);
        assert!(matches!(vpos, VPos::Top));
    }

    #[test]
    fn axis_covers_zero_and_annotations() {
        let ranked = ranked_correlations(&results(&[("a", 0.5, 0.1), ("b", 0.25, 0.1)]));
        let range = correlation_axis_range(&ranked);
        assert!(range.start < 0.0);
        assert!(range.end > 0.5 + POSITIVE_LABEL_OFFSET);
    }

    #[test]
    fn empty_correlations_are_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let result = render(&[], 5, 18, 300, dir.path());
        assert!(matches!(result, Err(PlotError::InvalidData(_))));
        assert!(!dir.path().join(CORRELATION_FILE_NAME).exists());
    }

    #[test]
    #[ignore = "Font rendering not available in test environment"]
    fn render_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let ranked = ranked_correlations(&results(&[
            ("avg_word_len", -0.61, 1e-30),
            ("type_token_ratio", 0.33, 2e-9),
            ("comma_rate", 0.05, 0.4),
        ]));

        let path = render(&ranked, 5, 18, 300, dir.path()).unwrap();
        assert_eq!(path, dir.path().join(CORRELATION_FILE_NAME));
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }
}
