pub mod classification;
pub mod public_result;
pub mod scene_analysis;

pub use classification::{Category, ClassificationResult, SeverityLevel};
pub use public_result::PublicResult;
pub use scene_analysis::SceneAnalysis;
