pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;

pub use config::Configuration;
pub use error::{AppError, ConfigError, ModelError, PipelineError, StageError};

pub use model::{OpenAiChatModel, VisionModel};
pub use pipeline::{
    AnalysisContext, Category, ClassificationPipeline, ClassificationPipelineBuilder,
    PublicResult, SeverityLevel,
};
