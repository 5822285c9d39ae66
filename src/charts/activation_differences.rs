//! Layerwise activation difference chart
//!
//! Renders two side-by-side line charts: cosine similarity and L2 norm of the
//! difference between the two conditions' mean activations, one point per layer.

use crate::common::constants::{
    ACTIVATION_CANVAS, ACTIVATION_FILE_NAME, AXIS_DESC_FONT_SIZE, CAPTION_FONT_SIZE,
    DEFAULT_BLUE, FONT_FAMILY, LABEL_FONT_SIZE, SUPTITLE_FONT_SIZE, UK_AMBER,
};
use crate::common::plots::{
    grid_style, index_range, integer_tick_count, integer_tick_label, padded_range, PlotError,
};
use crate::common::InterpretabilityResults;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::debug;

type Result<T> = core::result::Result<T, PlotError>;

/// Lowest value shown on the cosine similarity axis, relative to the smallest sample
const COSINE_FLOOR_MARGIN: f64 = 0.01;

/// Top of the cosine similarity axis; just above a perfect match
const COSINE_CEILING: f64 = 1.0005;

/// Per-layer values sorted by ascending layer index
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSeries {
    pub layers: Vec<i64>,
    pub cosine: Vec<f64>,
    pub l2: Vec<f64>,
}

impl LayerSeries {
    fn cosine_points(&self) -> impl Iterator<Item = (f64, f64)> + Clone + '_ {
        self.layers.iter().map(|&l| l as f64).zip(self.cosine.iter().copied())
    }

    fn l2_points(&self) -> impl Iterator<Item = (f64, f64)> + Clone + '_ {
        self.layers.iter().map(|&l| l as f64).zip(self.l2.iter().copied())
    }
}

/// Extracts the layer series, ordering layers numerically rather than by their string keys
///
/// # Returns
/// * `Ok(LayerSeries)` - Parallel vectors of layer, cosine similarity and L2 norm
/// * `Err(PlotError::InvalidData)` - If there are no layers or a key isn't an integer
pub fn layer_series(results: &InterpretabilityResults) -> Result<LayerSeries> {
    if results.activation_differences.is_empty() {
        return Err(PlotError::InvalidData(
            "activation_differences contains no layers".to_string(),
        ));
    }

    let mut rows = results
        .activation_differences
        .iter()
        .map(|(key, diff)| {
            key.trim()
                .parse::<i64>()
                .map(|layer| (layer, diff))
                .map_err(|_| {
                    PlotError::InvalidData(format!("Layer key '{}' is not an integer", key))
                })
        })
        .collect::<Result<Vec<_>>>()?;
    rows.sort_unstable_by_key(|(layer, _)| *layer);

    Ok(LayerSeries {
        layers: rows.iter().map(|(layer, _)| *layer).collect(),
        cosine: rows.iter().map(|(_, d)| d.cosine_similarity).collect(),
        l2: rows.iter().map(|(_, d)| d.l2_norm).collect(),
    })
}

/// Y axis range for the cosine similarity panel
///
/// Starts [`COSINE_FLOOR_MARGIN`] below the smallest sample and ends at [`COSINE_CEILING`].
/// Samples above the ceiling (rounding noise) stretch the top so they stay visible.
pub fn cosine_axis_range(cosine: &[f64]) -> Range<f64> {
    let min = cosine.iter().copied().fold(f64::INFINITY, f64::min);
    let max = cosine.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if !min.is_finite() || !max.is_finite() {
        return 0.0..COSINE_CEILING;
    }

    let top = if max > COSINE_CEILING {
        max + COSINE_FLOOR_MARGIN
    } else {
        COSINE_CEILING
    };

    (min - COSINE_FLOOR_MARGIN)..top
}

/// Renders `activation_differences.png` into `output_dir`
///
/// # Returns
/// * `Ok(PathBuf)` - Path of the written image
/// * `Err(PlotError)` - If the data is unusable or drawing failed
pub fn render(results: &InterpretabilityResults, output_dir: &Path) -> Result<PathBuf> {
    let series = layer_series(results)?;
    let output_path = output_dir.join(ACTIVATION_FILE_NAME);

    debug!(
        layers = series.layers.len(),
        path = %output_path.display(),
        "rendering activation differences"
    );

    draw_activation_chart(&series, &output_path)?;

    Ok(output_path)
}

fn draw_activation_chart(series: &LayerSeries, output_path: &Path) -> Result<()> {
    let root = BitMapBackend::new(output_path, ACTIVATION_CANVAS).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let body = root
        .titled(
            "US vs UK internal divergence (mean activations)",
            (FONT_FAMILY, SUPTITLE_FONT_SIZE),
        )
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;
    let panels = body.split_evenly((1, 2));

    let layer_axis: Vec<f64> = series.layers.iter().map(|&l| l as f64).collect();
    let x_range = index_range(&layer_axis);

    draw_layer_panel(
        &panels[0],
        LayerPanel {
            caption: "Layerwise cosine similarity",
            y_desc: "Cosine similarity",
            x_range: x_range.clone(),
            y_range: cosine_axis_range(&series.cosine),
            color: DEFAULT_BLUE,
        },
        series.cosine_points(),
    )?;

    draw_layer_panel(
        &panels[1],
        LayerPanel {
            caption: "L2 norm of mean difference",
            y_desc: "L2 norm",
            x_range,
            y_range: padded_range(&series.l2, 0.05),
            color: UK_AMBER,
        },
        series.l2_points(),
    )?;

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

struct LayerPanel {
    caption: &'static str,
    y_desc: &'static str,
    x_range: Range<f64>,
    y_range: Range<f64>,
    color: RGBColor,
}

/// Draws one line-with-markers panel against the layer axis
fn draw_layer_panel<DB, I>(area: &DrawingArea<DB, Shift>, panel: LayerPanel, points: I) -> Result<()>
where
    DB: DrawingBackend,
    I: Iterator<Item = (f64, f64)> + Clone,
{
    let layer_ticks = integer_tick_count(&panel.x_range);
    let mut chart = ChartBuilder::on(area)
        .caption(panel.caption, (FONT_FAMILY, CAPTION_FONT_SIZE))
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(110)
        .build_cartesian_2d(panel.x_range, panel.y_range)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("Layer")
        .y_desc(panel.y_desc)
        .axis_desc_style((FONT_FAMILY, AXIS_DESC_FONT_SIZE))
        .label_style((FONT_FAMILY, LABEL_FONT_SIZE))
        .x_labels(layer_ticks)
        .x_label_formatter(&|x| integer_tick_label(*x))
        .bold_line_style(grid_style())
        .light_line_style(WHITE)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let color = panel.color;
    chart
        .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .draw_series(points.map(|(x, y)| Circle::new((x, y), 5, color.filled())))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::data_structures::LayerDifference;
    use std::collections::BTreeMap;
    use std::fs;

    fn results(entries: &[(&str, f64, f64)]) -> InterpretabilityResults {
        let activation_differences: BTreeMap<String, LayerDifference> = entries
            .iter()
            .map(|&(key, cosine_similarity, l2_norm)| {
                (
                    key.to_string(),
                    LayerDifference {
                        cosine_similarity,
                        l2_norm,
                    },
                )
            })
            .collect();

        InterpretabilityResults {
            activation_differences,
            sae: Default::default(),
        }
    }

    #[test]
    fn layers_sort_numerically() {
        // String order would put "10" before "2"
        let data = results(&[("10", 0.97, 3.0), ("2", 0.999, 0.5), ("0", 1.0, 0.1)]);

        let series = layer_series(&data).unwrap();
        assert_eq!(series.layers, [0, 2, 10]);
        assert_eq!(series.cosine, [1.0, 0.999, 0.97]);
        assert_eq!(series.l2, [0.1, 0.5, 3.0]);
    }

    #[test]
    fn non_integer_layer_is_rejected() {
        let data = results(&[("0", 1.0, 0.1), ("final", 0.9, 1.0)]);

        let err = layer_series(&data).unwrap_err();
        assert!(matches!(err, PlotError::InvalidData(ref msg) if msg.contains("final")));
    }

    #[test]
    fn empty_layers_are_rejected() {
        let data = results(&[]);
        assert!(matches!(
            layer_series(&data),
            Err(PlotError::InvalidData(_))
        ));
    }

    #[test]
    fn cosine_range_spans_min_to_ceiling() {
        let range = cosine_axis_range(&[0.995, 0.98, 0.999]);
        assert!((range.start - 0.97).abs() < 1e-12);
        assert_eq!(range.end, COSINE_CEILING);
    }

    #[test]
    fn cosine_range_stretches_above_ceiling() {
        let range = cosine_axis_range(&[0.99, 1.002]);
        assert!(range.end > 1.002);
    }

    #[test]
    fn contiguous_layers_label_each_layer_once() {
        let data = results(&[("18", 0.97, 4.0), ("16", 0.99, 2.0), ("17", 0.98, 3.0)]);
        let series = layer_series(&data).unwrap();

        let axis: Vec<f64> = series.layers.iter().map(|&l| l as f64).collect();
        let range = index_range(&axis);
        assert_eq!(integer_tick_count(&range), 3);

        let labels: Vec<String> = [15.5, 16.0, 16.5, 17.0, 17.5, 18.0, 18.5]
            .into_iter()
            .map(integer_tick_label)
            .collect();
        assert_eq!(labels, ["", "16", "", "17", "", "18", ""]);
    }

    #[test]
    fn single_layer_gets_one_tick() {
        let series = layer_series(&results(&[("5", 0.9, 1.0)])).unwrap();
        let range = index_range(&[series.layers[0] as f64]);
        assert_eq!(integer_tick_count(&range), 1);
        assert_eq!(integer_tick_label(5.0), "5");
        assert_eq!(integer_tick_label(5.1), "");
    }

    #[test]
    #[ignore = "Font rendering not available in test environment"]
    fn render_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let data = results(&[("0", 0.9999, 0.2), ("6", 0.998, 1.4), ("12", 0.991, 4.8)]);

        let path = render(&data, dir.path()).unwrap();
        assert_eq!(path, dir.path().join(ACTIVATION_FILE_NAME));
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }
}
