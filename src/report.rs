//! Console output for a finished run
//!
//! Provides the list of written images and the optional ranked correlation table,
//! formatted with [`tabled`] like the other research tools.

use crate::charts::correlations::format_p_value;
use crate::charts::RankedCorrelation;
use bytesize::ByteSize;
use std::fmt;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

/// An image written by the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenImage {
    pub path: PathBuf,
    pub size: u64,
}

/// Outcome of a run: images in render order and the ranking behind the correlation chart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    pub images: Vec<WrittenImage>,
    pub correlations: Vec<RankedCorrelation>,
}

impl RenderReport {
    /// Records an image, reading its final size from disk
    pub fn record(&mut self, path: PathBuf) -> std::io::Result<()> {
        let size = std::fs::metadata(&path)?.len();
        self.images.push(WrittenImage { path, size });
        Ok(())
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.images.iter().map(|image| image.path.as_path())
    }
}

impl fmt::Display for RenderReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Wrote:")?;
        for image in &self.images {
            writeln!(
                f,
                " - {} ({})",
                image.path.display(),
                ByteSize::b(image.size)
            )?;
        }
        Ok(())
    }
}

/// One row of the ranked correlation table
#[derive(Debug, Clone, Tabled)]
pub struct CorrelationRow {
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[tabled(rename = "Feature")]
    pub feature: String,
    /// Signed coefficient with three decimals
    #[tabled(rename = "Pearson r")]
    pub r: String,
    #[tabled(rename = "p-value")]
    pub p: String,
}

impl CorrelationRow {
    /// Creates a row for the feature at 1-based `rank`
    pub fn new(rank: usize, correlation: &RankedCorrelation) -> Self {
        Self {
            rank,
            feature: correlation.feature.clone(),
            r: format!("{:+.3}", correlation.r),
            p: format_p_value(correlation.p),
        }
    }
}

/// Formats the ranked correlations as an ASCII table
///
/// # Arguments
/// * `ranked` - Features in ranked order
/// * `title` - Optional title printed above the table
pub fn correlation_table(ranked: &[RankedCorrelation], title: Option<&str>) -> String {
    if ranked.is_empty() {
        return "No correlations available".to_string();
    }

    let rows: Vec<CorrelationRow> = ranked
        .iter()
        .enumerate()
        .map(|(index, correlation)| CorrelationRow::new(index + 1, correlation))
        .collect();
    let table = Table::new(rows).to_string();

    if let Some(title) = title {
        format!("{}\n{}\n{}", title, "=".repeat(title.chars().count()), table)
    } else {
        table
    }
}
