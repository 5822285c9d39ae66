use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Comparison between the two conditions' mean activations at a single layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerDifference {
    /// Cosine similarity of the two mean activation vectors
    pub cosine_similarity: f64,
    /// L2 norm of the difference between the two mean activation vectors
    pub l2_norm: f64,
}

/// Per-component explained variance from the PCA proxy, one list per condition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplainedVariance {
    #[serde(default)]
    pub explained_variance_us: Vec<f64>,
    #[serde(default)]
    pub explained_variance_uk: Vec<f64>,
}

/// Contents of `interpretability_results.json`
///
/// Keys of [`activation_differences`] are layer indices stored as strings.
/// Any other top level keys written by the analysis are ignored.
///
/// [`activation_differences`]: InterpretabilityResults::activation_differences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpretabilityResults {
    pub activation_differences: BTreeMap<String, LayerDifference>,
    #[serde(default)]
    pub sae: ExplainedVariance,
}

/// Pearson statistics between the projection score and one stylometric feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureCorrelation {
    /// Correlation coefficient in `[-1, 1]`
    pub pearson_r: f64,
    /// Two-sided significance of [`pearson_r`](Self::pearson_r)
    pub pearson_p: f64,
}

/// Contents of `projection_feature_correlations.json`
///
/// The `correlations` object is read as a list of `(feature, statistics)` pairs in
/// document order, so that equal magnitudes rank the same way the analysis listed them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationResults {
    #[serde(with = "ordered_entries")]
    pub correlations: Vec<(String, FeatureCorrelation)>,
}

/// (De)serializes a JSON object as an ordered list of entries
mod ordered_entries {
    use super::FeatureCorrelation;
    use serde::de::{MapAccess, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(
        entries: &[(String, FeatureCorrelation)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(entries.iter().map(|(name, stats)| (name, stats)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, FeatureCorrelation)>, D::Error> {
        deserializer.deserialize_map(EntriesVisitor)
    }

    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, FeatureCorrelation)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of feature names to correlation statistics")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }
}
