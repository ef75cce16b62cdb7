pub mod classifier;
pub mod output_formatter;
pub mod scene_analyzer;

pub use classifier::ClassificationStep;
pub use output_formatter::OutputFormatter;
pub use scene_analyzer::SceneAnalysisStep;
