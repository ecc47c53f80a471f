//! Categorical Encoder - One-hot indicators with training-time categories
//!
//! Một cột cho mỗi category đã biết, theo đúng thứ tự artifact.
//! Unknown values are rejected, never encoded as all-zero.

use serde::{Deserialize, Serialize};

use crate::logic::error::{PipelineError, PipelineResult};
use crate::logic::features::layout::{expect_columns, indicator_column, CATEGORICAL_COLUMNS};

pub const ARTIFACT_NAME: &str = "categorical_encoder";

/// Capability: map categorical labels to a fixed-width indicator vector
pub trait CategoricalTransformer: Send + Sync {
    /// Input columns, in the order `transform` expects them
    fn feature_names(&self) -> &[String];

    /// Output indicator columns, in encoding order
    fn feature_names_out(&self) -> Vec<String>;

    fn transform(&self, values: &[&str]) -> PipelineResult<Vec<f64>>;
}

/// One-hot encoder categories từ training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub feature_names_in: Vec<String>,
    /// Known categories per input column, in output column order
    pub categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    pub fn new(feature_names_in: Vec<String>, categories: Vec<Vec<String>>) -> PipelineResult<Self> {
        let encoder = Self { feature_names_in, categories };
        encoder.validate()?;
        Ok(encoder)
    }

    /// Load from a JSON artifact
    pub fn from_json(json: &str) -> PipelineResult<Self> {
        let encoder: Self = serde_json::from_str(json)
            .map_err(|e| PipelineError::artifact(ARTIFACT_NAME, format!("parse error: {}", e)))?;
        encoder.validate()?;
        Ok(encoder)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        expect_columns(ARTIFACT_NAME, CATEGORICAL_COLUMNS, &self.feature_names_in)?;

        if self.categories.len() != self.feature_names_in.len() {
            return Err(PipelineError::artifact(
                ARTIFACT_NAME,
                format!(
                    "{} input columns but {} category lists",
                    self.feature_names_in.len(),
                    self.categories.len()
                ),
            ));
        }

        for (column, known) in self.feature_names_in.iter().zip(self.categories.iter()) {
            if known.is_empty() {
                return Err(PipelineError::artifact(
                    ARTIFACT_NAME,
                    format!("column '{}' has no categories", column),
                ));
            }
            for (i, category) in known.iter().enumerate() {
                if known[..i].contains(category) {
                    return Err(PipelineError::artifact(
                        ARTIFACT_NAME,
                        format!("column '{}' lists category '{}' twice", column, category),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Total number of indicator columns
    pub fn width(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }
}

impl CategoricalTransformer for OneHotEncoder {
    fn feature_names(&self) -> &[String] {
        &self.feature_names_in
    }

    fn feature_names_out(&self) -> Vec<String> {
        self.feature_names_in
            .iter()
            .zip(self.categories.iter())
            .flat_map(|(column, known)| known.iter().map(move |c| indicator_column(column, c)))
            .collect()
    }

    fn transform(&self, values: &[&str]) -> PipelineResult<Vec<f64>> {
        if values.len() != self.categories.len() {
            return Err(PipelineError::schema(
                "<categorical>",
                format!("expected {} values, got {}", self.categories.len(), values.len()),
            ));
        }

        let mut encoded = Vec::with_capacity(self.width());

        for ((column, known), &value) in self
            .feature_names_in
            .iter()
            .zip(self.categories.iter())
            .zip(values.iter())
        {
            let hit = known
                .iter()
                .position(|c| c == value)
                .ok_or_else(|| PipelineError::unknown_category(column.as_str(), value))?;

            encoded.extend((0..known.len()).map(|i| if i == hit { 1.0 } else { 0.0 }));
        }

        Ok(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn encoder() -> OneHotEncoder {
        OneHotEncoder::new(
            strings(CATEGORICAL_COLUMNS),
            vec![
                strings(&["Rural", "Suburban", "Urban"]),
                strings(&["Day", "Night"]),
                strings(&["Cash", "Credit Card", "Debit Card"]),
                strings(&["Commercial", "Residential"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_feature_names_out() {
        let names = encoder().feature_names_out();
        assert_eq!(names.len(), 10);
        assert_eq!(names[0], "Location_Rural");
        assert_eq!(names[5], "Payment_Method_Cash");
        assert_eq!(names[6], "Payment_Method_Credit Card");
        assert_eq!(names[9], "Consumption_Type_Residential");
    }

    #[test]
    fn test_transform_one_hot() {
        let out = encoder()
            .transform(&["Urban", "Night", "Cash", "Residential"])
            .unwrap();
        assert_eq!(out, vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(out.iter().sum::<f64>(), 4.0);
    }

    #[test]
    fn test_unknown_category_is_error() {
        let err = encoder()
            .transform(&["Metropolis", "Night", "Cash", "Residential"])
            .unwrap_err();
        assert_eq!(err, PipelineError::unknown_category("Location", "Metropolis"));
    }

    #[test]
    fn test_rejects_duplicate_categories() {
        let result = OneHotEncoder::new(
            strings(CATEGORICAL_COLUMNS),
            vec![
                strings(&["Rural", "Rural"]),
                strings(&["Day"]),
                strings(&["Cash"]),
                strings(&["Commercial"]),
            ],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_empty_and_missing_lists() {
        let result = OneHotEncoder::new(strings(CATEGORICAL_COLUMNS), vec![strings(&["Rural"])]);
        assert!(result.is_err());

        let result = OneHotEncoder::new(
            strings(CATEGORICAL_COLUMNS),
            vec![vec![], strings(&["Day"]), strings(&["Cash"]), strings(&["Commercial"])],
        );
        assert!(result.is_err());
    }
}
