pub mod error;
pub mod evaluator;
pub mod history;
pub mod policy;
pub mod presets;


pub use error::FineError;
pub use evaluator::{evaluate_fine, FineAssessment, FineBreakdown, FineEvaluator};
pub use policy::{ExponentialRate, FinePolicy, PolicyKind, ProgressiveRate, TieredRate};
pub use presets::PolicyPreset;
