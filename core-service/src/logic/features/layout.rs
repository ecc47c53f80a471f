//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! The classifier consumes columns in this exact order:
//! `[Age] + [normalized numeric] + [one-hot categorical]`.
//! The one-hot part is only known once the encoder artifact is loaded, so the
//! full column list lives in `FeatureSchema`, built and checked at load time.
//!
//! ## Rules (NEVER break these):
//! 1. Add/remove a raw column → increment FEATURE_VERSION
//! 2. Change column order → increment FEATURE_VERSION

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::logic::error::{PipelineError, PipelineResult};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current raw column layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// RAW COLUMN GROUPS (Authoritative source)
// ============================================================================

/// Copied into the vector untouched
pub const PASSTHROUGH_COLUMNS: &[&str] = &["Age"];

/// Standardized by the numeric normalizer, in this order
pub const NUMERIC_COLUMNS: &[&str] = &[
    "Energy_Consumption",
    "Previous_Bills",
    "Average_Temperature",
];

/// One-hot encoded by the categorical encoder, in this order
pub const CATEGORICAL_COLUMNS: &[&str] = &[
    "Location",
    "Time_of_Use",
    "Payment_Method",
    "Consumption_Type",
];

/// Output column name for one category indicator (`Location_Urban`)
pub fn indicator_column(column: &str, category: &str) -> String {
    format!("{}_{}", column, category)
}

/// Check that an artifact declares exactly the expected columns, in order
pub fn expect_columns(artifact: &str, expected: &[&str], actual: &[String]) -> PipelineResult<()> {
    let matches = expected.len() == actual.len()
        && expected.iter().zip(actual.iter()).all(|(e, a)| *e == a.as_str());

    if !matches {
        return Err(PipelineError::artifact(
            artifact,
            format!("expected columns {:?}, artifact declares {:?}", expected, actual),
        ));
    }
    Ok(())
}

// ============================================================================
// FEATURE SCHEMA
// ============================================================================

/// Full ordered column list the classifier was trained on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub version: u8,
    pub columns: Vec<String>,
}

impl FeatureSchema {
    /// Build from the transformers' declared column names
    pub fn new(numeric: &[String], categorical_out: &[String]) -> PipelineResult<Self> {
        expect_columns("numeric_normalizer", NUMERIC_COLUMNS, numeric)?;

        if categorical_out.is_empty() {
            return Err(PipelineError::artifact(
                "categorical_encoder",
                "encoder declares no output columns",
            ));
        }

        let mut columns: Vec<String> = PASSTHROUGH_COLUMNS.iter().map(|s| s.to_string()).collect();
        columns.extend(numeric.iter().cloned());
        columns.extend(categorical_out.iter().cloned());

        Ok(Self {
            version: FEATURE_VERSION,
            columns,
        })
    }

    /// Total vector length L = passthrough + numeric + indicators
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn numeric_range(&self) -> std::ops::Range<usize> {
        let start = PASSTHROUGH_COLUMNS.len();
        start..start + NUMERIC_COLUMNS.len()
    }

    pub fn categorical_range(&self) -> std::ops::Range<usize> {
        self.numeric_range().end..self.columns.len()
    }

    /// Get column index by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Get column name by index
    pub fn column(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    /// CRC32 over version + column names, used to detect layout drift
    pub fn layout_hash(&self) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(&[self.version]);

        for name in &self.columns {
            hasher.update(name.as_bytes());
            hasher.update(&[0]); // Separator
        }

        hasher.finalize()
    }

    /// Validate a classifier's declared input width against this schema
    pub fn validate_width(&self, artifact: &str, width: usize) -> PipelineResult<()> {
        if width != self.columns.len() {
            return Err(PipelineError::artifact(
                artifact,
                format!(
                    "column count mismatch: schema has {}, artifact expects {}",
                    self.columns.len(),
                    width
                ),
            ));
        }
        Ok(())
    }

    /// Validate a classifier's declared input columns against this schema
    pub fn validate_against(&self, artifact: &str, expected: &[String]) -> PipelineResult<()> {
        self.validate_width(artifact, expected.len())?;

        if let Some((index, (ours, theirs))) = self
            .columns
            .iter()
            .zip(expected.iter())
            .enumerate()
            .find(|(_, (a, b))| a != b)
        {
            return Err(PipelineError::artifact(
                artifact,
                format!(
                    "column order mismatch at index {}: schema has '{}', artifact expects '{}'",
                    index, ours, theirs
                ),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn encoder_columns() -> Vec<String> {
        strings(&[
            "Location_Rural",
            "Location_Suburban",
            "Location_Urban",
            "Time_of_Use_Day",
            "Time_of_Use_Night",
        ])
    }

    #[test]
    fn test_schema_layout() {
        let schema = FeatureSchema::new(&strings(NUMERIC_COLUMNS), &encoder_columns()).unwrap();

        assert_eq!(schema.len(), 1 + 3 + 5);
        assert_eq!(schema.column(0), Some("Age"));
        assert_eq!(schema.column(1), Some("Energy_Consumption"));
        assert_eq!(schema.index_of("Location_Rural"), Some(4));
        assert_eq!(schema.numeric_range(), 1..4);
        assert_eq!(schema.categorical_range(), 4..9);
        assert_eq!(schema.index_of("nonexistent"), None);
    }

    #[test]
    fn test_numeric_order_enforced() {
        let swapped = strings(&["Previous_Bills", "Energy_Consumption", "Average_Temperature"]);
        let err = FeatureSchema::new(&swapped, &encoder_columns()).unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactUnavailable { .. }));
    }

    #[test]
    fn test_layout_hash_detects_reorder() {
        let a = FeatureSchema::new(&strings(NUMERIC_COLUMNS), &encoder_columns()).unwrap();

        let mut reordered = encoder_columns();
        reordered.swap(0, 1);
        let b = FeatureSchema::new(&strings(NUMERIC_COLUMNS), &reordered).unwrap();

        assert_eq!(a.layout_hash(), a.clone().layout_hash());
        assert_ne!(a.layout_hash(), b.layout_hash());
    }

    #[test]
    fn test_validate_against() {
        let schema = FeatureSchema::new(&strings(NUMERIC_COLUMNS), &encoder_columns()).unwrap();
        assert!(schema.validate_against("model", &schema.columns.clone()).is_ok());

        let short = schema.columns[..5].to_vec();
        assert!(schema.validate_against("model", &short).is_err());

        let mut swapped = schema.columns.clone();
        swapped.swap(2, 3);
        let err = schema.validate_against("model", &swapped).unwrap_err();
        assert!(err.to_string().contains("index 2"));
    }

    #[test]
    fn test_validate_width() {
        let schema = FeatureSchema::new(&strings(NUMERIC_COLUMNS), &encoder_columns()).unwrap();
        assert!(schema.validate_width("model", 9).is_ok());

        let err = schema.validate_width("model", 14).unwrap_err();
        assert!(err.to_string().contains("schema has 9, artifact expects 14"));
    }

    #[test]
    fn test_indicator_column() {
        assert_eq!(indicator_column("Payment_Method", "Credit Card"), "Payment_Method_Credit Card");
    }
}
