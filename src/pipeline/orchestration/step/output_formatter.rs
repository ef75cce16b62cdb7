use crate::error::StageError;
use crate::pipeline::context::{AnalysisContext, ProcessingStage};
use crate::pipeline::domain::PublicResult;
use crate::pipeline::domain::classification::MAX_SEVERITY;
use crate::pipeline::orchestration::ProcessingStep;
use async_trait::async_trait;

/// Reduces the context to the four public fields.
///
/// Any recorded error collapses to the safe reject payload, and so does a
/// context that somehow has neither an error nor a classification.
#[derive(Debug, Default, Clone, Copy)]
pub struct OutputFormatter;

impl OutputFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format(&self, context: &AnalysisContext) -> Result<PublicResult, StageError> {
        if context.error().is_some() {
            return Ok(PublicResult::safe_reject());
        }

        let Some(classification) = context.classification() else {
            tracing::warn!(
                request_id = %context.request_id(),
                "No classification and no error recorded, returning reject"
            );
            return Ok(PublicResult::safe_reject());
        };

        let result = PublicResult::from(classification);
        if !result.is_consistent() {
            return Err(StageError::Formatting(format!(
                "{} result has inconsistent severity fields",
                result.category
            )));
        }
        if result.severity.is_some_and(|severity| severity > MAX_SEVERITY) {
            return Err(StageError::Formatting(format!(
                "severity {:?} is outside 0-{MAX_SEVERITY}",
                result.severity
            )));
        }
        Ok(result)
    }
}

#[async_trait]
impl ProcessingStep for OutputFormatter {
    async fn process(&self, context: AnalysisContext) -> AnalysisContext {
        match self.format(&context) {
            Ok(result) => context.with_formatted_result(result),
            Err(error) => context
                .with_error(error)
                .with_formatted_result(PublicResult::safe_reject()),
        }
    }

    fn name(&self) -> &'static str {
        "OutputFormatter"
    }

    fn stage(&self) -> ProcessingStage {
        ProcessingStage::OutputFormatting
    }
}
