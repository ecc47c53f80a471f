//! Logic Module - Feature Normalization & Inference Decision
//!
//! - `features/` - RawRecord, schema, feature assembly
//! - `model/` - transformers, classifier backends, decision policy
//! - `pipeline` - composition + hot-swappable artifact registry

pub mod error;
pub mod features;
pub mod model;
pub mod pipeline;
