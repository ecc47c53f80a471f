//! Energy Theft Detection - Inference Core
//!
//! Turns a customer's raw attributes into the exact feature vector the trained
//! classifier expects, runs it, and applies the fixed decision threshold.
//!
//! ```text
//! RawRecord ─► FeatureAssembler ─► FeatureVector ─► Classifier ─► DecisionPolicy ─► String
//!               (normalizer, encoder)                (abnormal, normal)
//! ```

pub mod constants;
pub mod logic;

pub use logic::error::{PipelineError, PipelineResult};
pub use logic::features::{FeatureSchema, FeatureVector, RawInput, RawRecord};
pub use logic::model::{ArtifactConfig, Verdict, VerdictLabel};
pub use logic::pipeline::{ArtifactRegistry, InferencePipeline, PipelineStats};
