pub mod instrumented_step;
pub mod processing_pipeline;
pub mod processing_step;
pub mod prompts;
pub mod step;

pub use instrumented_step::{InstrumentedStep, StepInstrumentation};
pub use processing_pipeline::{ClassificationPipeline, ClassificationPipelineBuilder};
pub use processing_step::ProcessingStep;
