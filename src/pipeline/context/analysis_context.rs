use crate::error::StageError;
use crate::pipeline::context::metrics::StageMetrics;
use crate::pipeline::context::state::{PipelineState, ProcessingStage};
use crate::pipeline::domain::{ClassificationResult, PublicResult, SceneAnalysis};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// The unit of work threaded through the stages for a single image.
///
/// Stages never mutate a context they were handed; each `with_*` call
/// consumes the value and returns the updated one. The image payload is
/// shared, so clones are cheap.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    request_id: Uuid,
    received_at: DateTime<Utc>,
    processing_start: Instant,
    image_data: Arc<str>,
    analysis: Option<SceneAnalysis>,
    classification: Option<ClassificationResult>,
    errors: Vec<StageError>,
    formatted_result: Option<PublicResult>,
    metrics: StageMetrics,
}

impl AnalysisContext {
    pub fn new(image_data: impl Into<Arc<str>>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            received_at: Utc::now(),
            processing_start: Instant::now(),
            image_data: image_data.into(),
            analysis: None,
            classification: None,
            errors: Vec::new(),
            formatted_result: None,
            metrics: StageMetrics::new(),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn image_data(&self) -> &str {
        &self.image_data
    }

    pub fn shared_image_data(&self) -> Arc<str> {
        self.image_data.clone()
    }

    pub fn analysis(&self) -> Option<&SceneAnalysis> {
        self.analysis.as_ref()
    }

    pub fn classification(&self) -> Option<&ClassificationResult> {
        self.classification.as_ref()
    }

    /// The most recent stage failure.
    pub fn error(&self) -> Option<&StageError> {
        self.errors.last()
    }

    /// Every stage failure in the order it happened; the first one is the root cause.
    pub fn errors(&self) -> &[StageError] {
        &self.errors
    }

    pub fn formatted_result(&self) -> Option<&PublicResult> {
        self.formatted_result.as_ref()
    }

    pub fn metrics(&self) -> &StageMetrics {
        &self.metrics
    }

    pub fn elapsed(&self) -> Duration {
        self.processing_start.elapsed()
    }

    pub fn state(&self) -> PipelineState {
        if self.formatted_result.is_some() {
            PipelineState::Formatted
        } else if self.classification.is_some() {
            PipelineState::Classified
        } else if !self.errors.is_empty() && self.analysis.is_some() {
            PipelineState::ClassificationFailed
        } else if !self.errors.is_empty() {
            PipelineState::AnalysisFailed
        } else if self.analysis.is_some() {
            PipelineState::Analyzed
        } else {
            PipelineState::Started
        }
    }

    pub fn with_analysis(mut self, analysis: SceneAnalysis) -> Self {
        self.analysis = Some(analysis);
        self
    }

    pub fn with_classification(mut self, classification: ClassificationResult) -> Self {
        self.classification = Some(classification);
        self
    }

    /// Records a stage failure. The latest failure becomes `error()`; the
    /// earlier ones stay in `errors()`. Nothing in the pipeline clears them.
    pub fn with_error(mut self, error: StageError) -> Self {
        if let Some(previous) = self.errors.last() {
            tracing::debug!(
                request_id = %self.request_id,
                "Error '{}' follows earlier error '{}'",
                error,
                previous
            );
        }
        self.errors.push(error);
        self
    }

    pub fn with_formatted_result(mut self, result: PublicResult) -> Self {
        self.formatted_result = Some(result);
        self
    }

    pub fn with_stage_duration(mut self, stage: ProcessingStage, duration: Duration) -> Self {
        self.metrics.record_duration(stage, duration);
        self
    }
}
