//! Feature Vector - Core data structure for ML input
//!
//! Values are ordered by `FeatureSchema::columns`; the vector carries the
//! schema's layout hash and `InferencePipeline::predict_vector` refuses a
//! vector assembled against another artifact set.

use serde::{Deserialize, Serialize};

use super::layout::FeatureSchema;

/// Ordered classifier input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// CRC32 hash of the schema this vector was assembled against
    pub layout_hash: u32,
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(schema: &FeatureSchema, values: Vec<f64>) -> Self {
        Self {
            layout_hash: schema.layout_hash(),
            values,
        }
    }

    /// Get values as slice
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get feature by index
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Get feature by column name
    pub fn get_by_name(&self, schema: &FeatureSchema, name: &str) -> Option<f64> {
        schema.index_of(name).and_then(|i| self.get(i))
    }

    /// Check this vector was assembled against `schema`
    pub fn matches(&self, schema: &FeatureSchema) -> bool {
        self.layout_hash == schema.layout_hash() && self.values.len() == schema.len()
    }

    /// Values narrowed to f32 for tensor runtimes
    pub fn to_f32(&self) -> Vec<f32> {
        self.values.iter().map(|&v| v as f32).collect()
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self, schema: &FeatureSchema) -> serde_json::Value {
        serde_json::json!({
            "layout_hash": format!("{:08x}", self.layout_hash),
            "values": self.values,
            "named_values": schema.columns.iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.clone(), serde_json::Value::from(*value)))
                .collect::<serde_json::Map<_, _>>(),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
