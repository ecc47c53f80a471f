//! Model Module - Artifacts & Decision
//!
//! Normalizer, encoder, classifier là artifact bên ngoài (chỉ đọc).
//! Dễ dàng swap backend (JSON weights / ONNX) qua các trait.

pub mod scaler;
pub mod encoder;
pub mod classifier;
pub mod onnx;
pub mod artifacts;
pub mod threshold;

// Re-export common types
pub use artifacts::{ArtifactConfig, ArtifactInfo, ArtifactSet};
pub use classifier::{ClassProbabilities, LogisticRegression, ProbabilisticClassifier};
pub use encoder::{CategoricalTransformer, OneHotEncoder};
pub use onnx::OnnxClassifier;
pub use scaler::{NumericTransformer, StandardScaler};
pub use threshold::{decide, format_percentage, Verdict, VerdictLabel, ABNORMAL_THRESHOLD};
