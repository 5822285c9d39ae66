//! Explained variance chart for the PCA proxy of the SAE features
//!
//! Renders grouped bars (US left, UK right) for the leading components of each condition.

use crate::common::constants::{
    AXIS_DESC_FONT_SIZE, CAPTION_FONT_SIZE, FONT_FAMILY, LABEL_FONT_SIZE, UK_AMBER, US_BLUE,
    VARIANCE_CANVAS, VARIANCE_FILE_NAME,
};
use crate::common::data_structures::ExplainedVariance;
use crate::common::plots::{font, grid_style, integer_tick_label, PlotError};
use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

type Result<T> = core::result::Result<T, PlotError>;

/// Width of a single bar in component units; a US/UK pair spans twice this
pub const BAR_WIDTH: f64 = 0.38;

/// Which condition a bar belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Us,
    Uk,
}

impl Condition {
    pub fn label(self) -> &'static str {
        match self {
            Condition::Us => "US",
            Condition::Uk => "UK",
        }
    }

    pub fn color(self) -> RGBColor {
        match self {
            Condition::Us => US_BLUE,
            Condition::Uk => UK_AMBER,
        }
    }

    /// Horizontal extent of the bar for `component`, relative to the component tick
    fn span(self, component: usize) -> (f64, f64) {
        let centre = component as f64;
        match self {
            Condition::Us => (centre - BAR_WIDTH, centre),
            Condition::Uk => (centre, centre + BAR_WIDTH),
        }
    }
}

/// A single bar: 1-based component index and its explained variance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentBar {
    pub condition: Condition,
    pub component: usize,
    pub variance: f64,
}

/// Takes the first `components` values of each condition as bars
///
/// A condition with fewer values contributes only the bars it has.
///
/// # Returns
/// * `Ok(Vec<ComponentBar>)` - US bars followed by UK bars, in component order
/// * `Err(PlotError::InvalidData)` - If neither condition has any values, or `components` is 0
pub fn component_bars(sae: &ExplainedVariance, components: usize) -> Result<Vec<ComponentBar>> {
    if components == 0 {
        return Err(PlotError::InvalidData(
            "Component count must be at least 1".to_string(),
        ));
    }

    let series = [
        (Condition::Us, &sae.explained_variance_us),
        (Condition::Uk, &sae.explained_variance_uk),
    ];

    let mut bars = Vec::with_capacity(components * 2);
    for (condition, values) in series {
        if values.len() < components {
            warn!(
                condition = condition.label(),
                available = values.len(),
                requested = components,
                "fewer explained variance values than components"
            );
        }

        bars.extend(
            values
                .iter()
                .take(components)
                .enumerate()
                .map(|(index, &variance)| ComponentBar {
                    condition,
                    component: index + 1,
                    variance,
                }),
        );
    }

    if bars.is_empty() {
        return Err(PlotError::InvalidData(
            "sae section has no explained variance values".to_string(),
        ));
    }

    Ok(bars)
}

/// Y axis range for the bars: always includes zero, with 5% headroom past the tallest bar
pub fn variance_axis_range(bars: &[ComponentBar]) -> Range<f64> {
    let max = bars.iter().map(|b| b.variance).fold(0.0f64, f64::max);
    let min = bars.iter().map(|b| b.variance).fold(0.0f64, f64::min);

    if max - min <= f64::EPSILON {
        return 0.0..1.0;
    }

    let pad = (max - min) * 0.05;
    let bottom = if min < 0.0 { min - pad } else { 0.0 };
    bottom..(max + pad)
}

/// Renders `sae_features.png` into `output_dir`
///
/// # Arguments
/// * `sae` - Explained variance lists for both conditions
/// * `components` - Number of leading components to draw
/// * `layer` - Layer the PCA proxy was fitted on, shown in the title
/// * `output_dir` - Directory where the PNG file should be saved
pub fn render(
    sae: &ExplainedVariance,
    components: usize,
    layer: u32,
    output_dir: &Path,
) -> Result<PathBuf> {
    let bars = component_bars(sae, components)?;
    let output_path = output_dir.join(VARIANCE_FILE_NAME);
    let title = format!("Layer {} explained variance (PCA proxy)", layer);

    debug!(
        bars = bars.len(),
        path = %output_path.display(),
        "rendering explained variance"
    );

    draw_variance_chart(&bars, components, &title, &output_path)?;
    Ok(output_path)
}

fn draw_variance_chart(
    bars: &[ComponentBar],
    components: usize,
    title: &str,
    output_path: &Path,
) -> Result<()> {
    let root = BitMapBackend::new(output_path, VARIANCE_CANVAS).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let x_range = 0.5..(components as f64 + 0.5);
    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT_FAMILY, CAPTION_FONT_SIZE))
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(110)
        .build_cartesian_2d(x_range, variance_axis_range(bars))
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(components)
        .x_label_formatter(&|x| integer_tick_label(*x))
        .x_desc("Component")
        .y_desc("Explained variance")
        .axis_desc_style((FONT_FAMILY, AXIS_DESC_FONT_SIZE))
        .label_style((FONT_FAMILY, LABEL_FONT_SIZE))
        .bold_line_style(grid_style())
        .light_line_style(WHITE)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    for condition in [Condition::Us, Condition::Uk] {
        let color = condition.color();
        chart
            .draw_series(
                bars.iter()
                    .filter(|bar| bar.condition == condition)
                    .map(|bar| {
                        let (x0, x1) = condition.span(bar.component);
                        Rectangle::new([(x0, 0.0), (x1, bar.variance)], color.filled())
                    }),
            )
            .map_err(|e| PlotError::Drawing(e.to_string()))?
            .label(condition.label())
            .legend(move |(x, y)| Rectangle::new([(x, y - 8), (x + 20, y + 8)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(font(LABEL_FONT_SIZE))
        .background_style(WHITE.mix(0.0))
        .border_style(WHITE.mix(0.0))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}
