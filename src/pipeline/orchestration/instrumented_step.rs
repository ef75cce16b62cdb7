use crate::pipeline::context::{AnalysisContext, ProcessingStage};
use crate::pipeline::orchestration::ProcessingStep;
use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// A wrapper that instruments a ProcessingStep with timing and failure logging
pub struct InstrumentedStep<S> {
    inner: S,
}

impl<S> InstrumentedStep<S> {
    pub fn new(step: S) -> Self {
        Self { inner: step }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S> ProcessingStep for InstrumentedStep<S>
where
    S: ProcessingStep,
{
    #[instrument(
        skip(self, context),
        fields(stage = self.inner.name(), request_id = %context.request_id())
    )]
    async fn process(&self, context: AnalysisContext) -> AnalysisContext {
        let start = Instant::now();
        debug!("Starting stage: {}", self.inner.name());

        let errors_before = context.errors().len();
        let context = self.inner.process(context).await;
        let duration = start.elapsed();

        match context.error() {
            Some(error) if context.errors().len() > errors_before => {
                warn!(
                    "Stage '{}' failed after {:?}: {}",
                    self.inner.name(),
                    duration,
                    error
                );
            }
            _ => {
                debug!(
                    "Completed stage '{}' in {:?} ({})",
                    self.inner.name(),
                    duration,
                    context.state()
                );
            }
        }

        context.with_stage_duration(self.inner.stage(), duration)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn stage(&self) -> ProcessingStage {
        self.inner.stage()
    }
}

/// Extension trait to easily wrap steps with instrumentation
pub trait StepInstrumentation: Sized {
    fn instrumented(self) -> InstrumentedStep<Self>;
}

impl<S> StepInstrumentation for S
where
    S: ProcessingStep,
{
    fn instrumented(self) -> InstrumentedStep<Self> {
        InstrumentedStep::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StageError;

    struct FailingStep;

    #[async_trait]
    impl ProcessingStep for FailingStep {
        async fn process(&self, context: AnalysisContext) -> AnalysisContext {
            context.with_error(StageError::MissingAnalysis)
        }

        fn name(&self) -> &'static str {
            "FailingStep"
        }

        fn stage(&self) -> ProcessingStage {
            ProcessingStage::Classification
        }
    }

    #[tokio::test]
    async fn records_duration_for_the_stage() {
        let step = FailingStep.instrumented();
        assert_eq!(step.name(), "FailingStep");

        let context = step.process(AnalysisContext::new("aGVsbG8=")).await;

        assert!(context.metrics().duration(ProcessingStage::Classification).is_some());
        assert!(context.metrics().duration(ProcessingStage::SceneAnalysis).is_none());
        assert_eq!(context.error(), Some(&StageError::MissingAnalysis));
    }
}
