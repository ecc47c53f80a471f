//! Feature Assembler - RawRecord → FeatureVector
//!
//! `[Age] + normalizer(numeric) + encoder(categorical)`, in schema order.
//! Pure: depends only on the record and the shared read-only transformers.

use std::sync::Arc;

use super::layout::{expect_columns, FeatureSchema, CATEGORICAL_COLUMNS};
use super::record::RawRecord;
use super::vector::FeatureVector;
use crate::logic::error::{PipelineError, PipelineResult};
use crate::logic::model::encoder::{self, CategoricalTransformer};
use crate::logic::model::scaler::NumericTransformer;

pub struct FeatureAssembler {
    numeric: Arc<dyn NumericTransformer>,
    categorical: Arc<dyn CategoricalTransformer>,
    schema: FeatureSchema,
}

impl FeatureAssembler {
    /// Build the schema from the transformers and check their contracts
    pub fn new(
        numeric: Arc<dyn NumericTransformer>,
        categorical: Arc<dyn CategoricalTransformer>,
    ) -> PipelineResult<Self> {
        expect_columns(encoder::ARTIFACT_NAME, CATEGORICAL_COLUMNS, categorical.feature_names())?;
        let schema = FeatureSchema::new(numeric.feature_names(), &categorical.feature_names_out())?;

        Ok(Self {
            numeric,
            categorical,
            schema,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn assemble(&self, record: &RawRecord) -> PipelineResult<FeatureVector> {
        record.validate()?;

        let normalized = self.numeric.transform(&record.numeric_values())?;
        let encoded = self.categorical.transform(&record.categorical_values())?;

        let mut values = Vec::with_capacity(self.schema.len());
        values.extend_from_slice(&record.passthrough_values());
        values.extend(normalized);
        values.extend(encoded);

        // Transformer outputs must fill the schema exactly
        if values.len() != self.schema.len() {
            return Err(PipelineError::Inference(format!(
                "assembled {} values for a {}-column schema",
                values.len(),
                self.schema.len()
            )));
        }

        let vector = FeatureVector::new(&self.schema, values);
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("Assembled features: {}", vector.to_log_entry(&self.schema));
        }

        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::layout::NUMERIC_COLUMNS;
    use crate::logic::features::record::{ConsumptionType, Location, PaymentMethod, TimeOfUse};
    use crate::logic::model::encoder::OneHotEncoder;
    use crate::logic::model::scaler::StandardScaler;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn assembler(locations: &[&str]) -> FeatureAssembler {
        let scaler = StandardScaler::new(
            strings(NUMERIC_COLUMNS),
            vec![700.0, 180.0, 24.0],
            vec![450.0, 90.0, 6.0],
        )
        .unwrap();
        let encoder = OneHotEncoder::new(
            strings(CATEGORICAL_COLUMNS),
            vec![
                strings(locations),
                strings(&["Day", "Night"]),
                strings(&["Cash", "Credit Card", "Debit Card"]),
                strings(&["Commercial", "Residential"]),
            ],
        )
        .unwrap();

        FeatureAssembler::new(Arc::new(scaler), Arc::new(encoder)).unwrap()
    }

    fn record() -> RawRecord {
        RawRecord {
            age: 35.0,
            energy_consumption: 1600.0,
            previous_bills: 90.0,
            average_temperature: 24.0,
            location: Location::Suburban,
            time_of_use: TimeOfUse::Night,
            payment_method: PaymentMethod::DebitCard,
            consumption_type: ConsumptionType::Commercial,
        }
    }

    #[test]
    fn test_assemble_order() {
        let a = assembler(&["Rural", "Suburban", "Urban"]);
        let vector = a.assemble(&record()).unwrap();

        assert_eq!(
            vector.values,
            vec![35.0, 2.0, -1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0]
        );
        assert!(vector.matches(a.schema()));
    }

    #[test]
    fn test_length_tracks_encoder_categories() {
        // L = 1 + 3 + sum(categories)
        assert_eq!(assembler(&["Rural", "Suburban", "Urban"]).schema().len(), 14);
        assert_eq!(assembler(&["Suburban", "Urban"]).schema().len(), 13);
    }

    #[test]
    fn test_category_unknown_to_encoder() {
        // Valid enum value, but the encoder was never trained on it
        let a = assembler(&["Rural", "Urban"]);
        let err = a.assemble(&record()).unwrap_err();
        assert_eq!(err, PipelineError::unknown_category("Location", "Suburban"));
    }

    #[test]
    fn test_age_passthrough_unscaled() {
        let a = assembler(&["Rural", "Suburban", "Urban"]);
        let mut r = record();
        r.age = 72.0;
        assert_eq!(a.assemble(&r).unwrap().get_by_name(a.schema(), "Age"), Some(72.0));
    }

    #[test]
    fn test_invalid_record_rejected() {
        let a = assembler(&["Rural", "Suburban", "Urban"]);
        let mut r = record();
        r.previous_bills = -5.0;
        assert!(matches!(a.assemble(&r), Err(PipelineError::Schema { .. })));
    }
}
