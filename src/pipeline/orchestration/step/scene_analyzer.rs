use crate::error::{ModelError, StageError};
use crate::model::{ModelRequest, StructuredModel};
use crate::pipeline::context::{AnalysisContext, ProcessingStage};
use crate::pipeline::domain::SceneAnalysis;
use crate::pipeline::orchestration::ProcessingStep;
use crate::pipeline::orchestration::prompts::ANALYSIS_PROMPT;
use async_trait::async_trait;

/// Vision call producing the structured scene evidence.
pub struct SceneAnalysisStep {
    model: StructuredModel,
    temperature: f64,
}

impl SceneAnalysisStep {
    pub fn new(model: StructuredModel) -> Self {
        Self {
            model,
            temperature: 0.9,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub async fn analyze(&self, context: &AnalysisContext) -> Result<SceneAnalysis, ModelError> {
        if context.image_data().trim().is_empty() {
            return Err(ModelError::Service("image payload is empty".to_string()));
        }

        let request = ModelRequest::for_output::<SceneAnalysis>(ANALYSIS_PROMPT, self.temperature)
            .with_image(context.shared_image_data());
        self.model.invoke(request).await
    }
}

#[async_trait]
impl ProcessingStep for SceneAnalysisStep {
    async fn process(&self, context: AnalysisContext) -> AnalysisContext {
        match self.analyze(&context).await {
            Ok(analysis) => {
                tracing::debug!(
                    environment = %analysis.environment_type,
                    indoor_household = analysis.is_indoor_household,
                    objects = analysis.objects_detected.len(),
                    "Scene analysis complete"
                );
                context.with_analysis(analysis)
            }
            Err(error) => context.with_error(StageError::Analysis(error)),
        }
    }

    fn name(&self) -> &'static str {
        "SceneAnalysisStep"
    }

    fn stage(&self) -> ProcessingStage {
        ProcessingStage::SceneAnalysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing::{Scripted, ScriptedModel, analysis_json};
    use crate::pipeline::context::PipelineState;
    use std::sync::Arc;

    fn step(model: Arc<ScriptedModel>) -> SceneAnalysisStep {
        SceneAnalysisStep::new(StructuredModel::new(model))
    }

    #[tokio::test]
    async fn stores_the_analysis_on_success() {
        let model = Arc::new(ScriptedModel::new(vec![Scripted::Reply(analysis_json(false))]));

        let context = step(model.clone())
            .process(AnalysisContext::new("aGVsbG8="))
            .await;

        assert_eq!(context.state(), PipelineState::Analyzed);
        assert!(context.error().is_none());
        let request = &model.requests()[0];
        assert_eq!(request.image_base64.as_deref(), Some("aGVsbG8="));
        assert_eq!(request.prompt, ANALYSIS_PROMPT);
        assert_eq!(request.temperature, 0.9);
    }

    #[tokio::test]
    async fn network_failure_is_recorded_not_raised() {
        let model = Arc::new(ScriptedModel::new(vec![Scripted::Fail(ModelError::Transport(
            "connection reset".into(),
        ))]));

        let context = step(model).process(AnalysisContext::new("aGVsbG8=")).await;

        assert!(context.analysis().is_none());
        assert_eq!(
            context.error().map(ToString::to_string).as_deref(),
            Some("Error in image analysis: transport error: connection reset")
        );
        assert_eq!(context.state(), PipelineState::AnalysisFailed);
    }

    #[tokio::test]
    async fn partial_output_leaves_no_analysis() {
        let model = Arc::new(ScriptedModel::new(vec![Scripted::Reply(
            r#"{"description": "half", "is_indoor_household": false}"#.into(),
        )]));

        let context = step(model).process(AnalysisContext::new("aGVsbG8=")).await;

        assert!(context.analysis().is_none());
        assert!(matches!(
            context.error(),
            Some(StageError::Analysis(ModelError::SchemaViolation(_)))
        ));
    }

    #[tokio::test]
    async fn empty_image_skips_the_model() {
        let model = Arc::new(ScriptedModel::new(vec![]));

        let context = step(model.clone()).process(AnalysisContext::new("")).await;

        assert_eq!(model.call_count(), 0);
        assert!(matches!(context.error(), Some(StageError::Analysis(_))));
    }
}
