//! Features Module - Feature Assembly Engine
//!
//! Tách logic chuẩn hoá input khỏi model.
//! RawRecord → FeatureVector theo đúng schema lúc training.

pub mod record;
pub mod layout;
pub mod vector;
pub mod assembler;


// Re-export common types
pub use assembler::FeatureAssembler;
pub use layout::FeatureSchema;
pub use record::{ConsumptionType, Location, PaymentMethod, RawInput, RawRecord, TimeOfUse};
pub use vector::FeatureVector;
