//! File parsing functionality for the upstream result files
//!
//! Both inputs are plain JSON documents. Files ending in `.zst` are read through a
//! ZStandard decoder first, so archived result bundles load the same way.

use crate::common::{CorrelationResults, InterpretabilityResults};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use zstd::Decoder;

/// Errors that can occur during file parsing
#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("Failed to read input file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decompress zstd file {path}: {message}")]
    Decompression { path: PathBuf, message: String },

    #[error("Failed to parse JSON in {path}: {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

type Result<T> = core::result::Result<T, ParsingError>;

/// Loads `interpretability_results.json`
pub fn load_interpretability(file_path: &Path) -> Result<InterpretabilityResults> {
    let results: InterpretabilityResults = load_json(file_path)?;
    debug!(
        layers = results.activation_differences.len(),
        us_components = results.sae.explained_variance_us.len(),
        uk_components = results.sae.explained_variance_uk.len(),
        "loaded interpretability results"
    );
    Ok(results)
}

/// Loads `projection_feature_correlations.json`
pub fn load_correlations(file_path: &Path) -> Result<CorrelationResults> {
    let results: CorrelationResults = load_json(file_path)?;
    debug!(
        features = results.correlations.len(),
        "loaded feature correlations"
    );
    Ok(results)
}

/// Deserializes a JSON document from disk
///
/// This function:
/// - Opens the file
/// - Wraps it in a ZStandard decoder when the extension is `.zst`
/// - Deserializes JSON directly from the reader
///
/// # Arguments
/// * `file_path` - Path to a `.json` or `.json.zst` file
///
/// # Returns
/// * `Ok(T)` - Successfully parsed document
/// * `Err(ParsingError)` - If file reading, decompression, or JSON parsing failed
pub fn load_json<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let file = File::open(file_path).map_err(|source| ParsingError::FileRead {
        path: file_path.to_path_buf(),
        source,
    })?;

    debug!(path = %file_path.display(), "reading input");

    if is_zstd(file_path) {
        let decoder = Decoder::new(file).map_err(|e| ParsingError::Decompression {
            path: file_path.to_path_buf(),
            message: format!("Failed to create decoder: {}", e),
        })?;
        from_reader(decoder, file_path)
    } else {
        from_reader(BufReader::new(file), file_path)
    }
}

fn from_reader<R: Read, T: DeserializeOwned>(reader: R, file_path: &Path) -> Result<T> {
    serde_json::from_reader(reader).map_err(|source| {
        // An I/O failure while streaming out of the decoder means the frame is bad
        if source.is_io() && is_zstd(file_path) {
            ParsingError::Decompression {
                path: file_path.to_path_buf(),
                message: source.to_string(),
            }
        } else {
            ParsingError::JsonParse {
                path: file_path.to_path_buf(),
                source,
            }
        }
    })
}

fn is_zstd(file_path: &Path) -> bool {
    file_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zst"))
}
