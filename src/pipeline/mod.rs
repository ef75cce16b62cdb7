pub mod context;
pub mod domain;
pub mod orchestration;

pub use context::{AnalysisContext, PipelineState};
pub use domain::{Category, ClassificationResult, PublicResult, SceneAnalysis, SeverityLevel};
pub use orchestration::{ClassificationPipeline, ClassificationPipelineBuilder};
