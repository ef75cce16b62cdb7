use std::fmt;

/// Where an invocation stands, derived from what the context holds.
///
/// `Started -> Analyzed | AnalysisFailed -> Classified | ClassificationFailed -> Formatted`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Started,
    Analyzed,
    AnalysisFailed,
    Classified,
    ClassificationFailed,
    Formatted,
}

impl PipelineState {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Started => "Started",
            PipelineState::Analyzed => "Analyzed",
            PipelineState::AnalysisFailed => "AnalysisFailed",
            PipelineState::Classified => "Classified",
            PipelineState::ClassificationFailed => "ClassificationFailed",
            PipelineState::Formatted => "Formatted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Formatted)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The fixed stages of the classification pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProcessingStage {
    SceneAnalysis,
    Classification,
    OutputFormatting,
}

impl ProcessingStage {
    pub fn name(&self) -> &'static str {
        match self {
            ProcessingStage::SceneAnalysis => "SceneAnalysis",
            ProcessingStage::Classification => "Classification",
            ProcessingStage::OutputFormatting => "OutputFormatting",
        }
    }
}
