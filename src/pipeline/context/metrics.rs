use super::state::ProcessingStage;
use std::time::Duration;

/// Per-stage wall-clock durations collected during one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageMetrics {
    analysis_duration: Option<Duration>,
    classification_duration: Option<Duration>,
    formatting_duration: Option<Duration>,
}

impl StageMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_duration(&mut self, stage: ProcessingStage, duration: Duration) {
        match stage {
            ProcessingStage::SceneAnalysis => self.analysis_duration = Some(duration),
            ProcessingStage::Classification => self.classification_duration = Some(duration),
            ProcessingStage::OutputFormatting => self.formatting_duration = Some(duration),
        }
    }

    pub fn duration(&self, stage: ProcessingStage) -> Option<Duration> {
        match stage {
            ProcessingStage::SceneAnalysis => self.analysis_duration,
            ProcessingStage::Classification => self.classification_duration,
            ProcessingStage::OutputFormatting => self.formatting_duration,
        }
    }

    pub fn total(&self) -> Duration {
        [
            self.analysis_duration,
            self.classification_duration,
            self.formatting_duration,
        ]
        .into_iter()
        .flatten()
        .sum()
    }
}
