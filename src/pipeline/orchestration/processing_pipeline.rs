use crate::config::Configuration;
use crate::error::{ConfigError, PipelineError};
use crate::model::{OpenAiChatModel, StructuredModel, VisionModel};
use crate::pipeline::context::AnalysisContext;
use crate::pipeline::domain::PublicResult;
use crate::pipeline::orchestration::ProcessingStep;
use crate::pipeline::orchestration::instrumented_step::StepInstrumentation;
use crate::pipeline::orchestration::step::{ClassificationStep, OutputFormatter, SceneAnalysisStep};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// The classification engine: scene analysis, then classification, then
/// output formatting, in that order for every image.
///
/// Built once and shared; every call owns its own [`AnalysisContext`], so
/// concurrent `process_image` calls never share mutable state.
pub struct ClassificationPipeline {
    steps: Vec<Box<dyn ProcessingStep>>,
}

impl ClassificationPipeline {
    pub fn builder() -> ClassificationPipelineBuilder {
        ClassificationPipelineBuilder::new()
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    /// Runs every stage and returns the final context, including the
    /// analysis, the full classification and any recorded error.
    pub async fn classify(
        &self,
        image_base64: impl Into<Arc<str>>,
    ) -> Result<AnalysisContext, PipelineError> {
        let context = AnalysisContext::new(image_base64);
        let request_id = context.request_id();

        let context = AssertUnwindSafe(self.run_steps(context))
            .catch_unwind()
            .await
            .map_err(|panic| PipelineError::StagePanicked(panic_message(panic.as_ref())))?;

        tracing::info!(
            request_id = %request_id,
            state = %context.state(),
            category = ?context.formatted_result().map(|result| result.category),
            failed = context.error().is_some(),
            elapsed = ?context.elapsed(),
            "Image processed"
        );
        Ok(context)
    }

    /// The tagged outcome: the formatted result, or why there is none.
    pub async fn run(&self, image_base64: impl Into<Arc<str>>) -> Result<PublicResult, PipelineError> {
        let context = self.classify(image_base64).await?;
        context
            .formatted_result()
            .cloned()
            .ok_or(PipelineError::MissingFormattedResult)
    }

    /// Public entry point. Never fails: anything that goes wrong inside the
    /// pipeline comes back as the safe reject payload.
    pub async fn process_image(&self, image_base64: impl Into<Arc<str>>) -> PublicResult {
        match self.run(image_base64).await {
            Ok(result) => result,
            Err(error) => {
                tracing::error!("Pipeline failed, returning reject: {}", error);
                PublicResult::safe_reject()
            }
        }
    }

    async fn run_steps(&self, mut context: AnalysisContext) -> AnalysisContext {
        for step in &self.steps {
            tracing::debug!("Processing step: {}", step.name());
            context = step.process(context).await;
        }
        context
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

pub struct ClassificationPipelineBuilder {
    configuration: Configuration,
    model: Option<Arc<dyn VisionModel>>,
}

impl ClassificationPipelineBuilder {
    pub fn new() -> Self {
        Self {
            configuration: Configuration::default(),
            model: None,
        }
    }

    // Replaces the default configuration.
    pub fn configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }

    // Injects the external model; otherwise an OpenAI client is built from the configuration.
    pub fn model(mut self, model: Arc<dyn VisionModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn build(self) -> Result<ClassificationPipeline, ConfigError> {
        self.configuration.validate()?;

        let model = match self.model {
            Some(model) => model,
            None => {
                let client = OpenAiChatModel::new(&self.configuration).map_err(|e| {
                    ConfigError::Invalid(format!("failed to build model client: {e}"))
                })?;
                Arc::new(client) as Arc<dyn VisionModel>
            }
        };

        // One limiter for both calls of every invocation.
        let structured = StructuredModel::from_configuration(model, &self.configuration);
        tracing::info!(
            model = structured.model_name(),
            timeout = ?self.configuration.request_timeout(),
            max_attempts = self.configuration.max_attempts,
            "Classification pipeline ready"
        );

        let steps: Vec<Box<dyn ProcessingStep>> = vec![
            Box::new(
                SceneAnalysisStep::new(structured.clone())
                    .with_temperature(self.configuration.analysis_temperature)
                    .instrumented(),
            ),
            Box::new(
                ClassificationStep::new(structured)
                    .with_temperature(self.configuration.classification_temperature)
                    .instrumented(),
            ),
            Box::new(OutputFormatter::new().instrumented()),
        ];

        Ok(ClassificationPipeline { steps })
    }
}

impl Default for ClassificationPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ModelError, StageError};
    use crate::model::testing::{Scripted, ScriptedModel, analysis_json, classification_json};
    use crate::pipeline::context::{PipelineState, ProcessingStage};
    use crate::pipeline::domain::{Category, SeverityLevel};

    const IMAGE: &str = "/9j/4AAQSkZJRgABAQAAAQABAAD/2wBDAA==";

    fn pipeline(model: Arc<ScriptedModel>) -> ClassificationPipeline {
        ClassificationPipeline::builder()
            .configuration(Configuration::default().with_max_attempts(1))
            .model(model)
            .build()
            .unwrap()
    }

    #[test]
    fn stages_run_in_fixed_order() {
        let pipeline = pipeline(Arc::new(ScriptedModel::new(vec![])));
        assert_eq!(
            pipeline.stage_names(),
            vec!["SceneAnalysisStep", "ClassificationStep", "OutputFormatter"]
        );
    }

    #[test]
    fn invalid_configuration_is_refused() {
        let result = ClassificationPipeline::builder()
            .configuration(Configuration::default().with_request_timeout_secs(0))
            .model(Arc::new(ScriptedModel::new(vec![])))
            .build();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[tokio::test]
    async fn indoor_household_image_is_rejected() {
        let model = Arc::new(ScriptedModel::new(vec![Scripted::Reply(analysis_json(true))]));

        let result = pipeline(model.clone()).process_image(IMAGE).await;

        assert_eq!(result, PublicResult::safe_reject());
        // Only the vision call happened; the gate made the decision.
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn outdoor_pothole_is_reported_exactly() {
        let model = Arc::new(ScriptedModel::new(vec![
            Scripted::Reply(analysis_json(false)),
            Scripted::Reply(classification_json(
                "potholes",
                Some(65),
                Some("moderate-high"),
                Some("large pothole"),
            )),
        ]));

        let result = pipeline(model.clone()).process_image(IMAGE).await;

        assert_eq!(
            result,
            PublicResult {
                category: Category::Potholes,
                severity: Some(65),
                severity_level: Some(SeverityLevel::ModerateHigh),
                scale: Some("large pothole".to_string()),
            }
        );
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn analysis_failure_never_reaches_the_decision_model() {
        let model = Arc::new(ScriptedModel::new(vec![Scripted::Fail(ModelError::Transport(
            "network unreachable".into(),
        ))]));

        let context = pipeline(model.clone()).classify(IMAGE).await.unwrap();

        assert_eq!(model.call_count(), 1);
        assert_eq!(context.formatted_result(), Some(&PublicResult::safe_reject()));
        assert_eq!(context.error(), Some(&StageError::MissingAnalysis));
        assert_eq!(
            context.errors().first(),
            Some(&StageError::Analysis(ModelError::Transport(
                "network unreachable".into()
            )))
        );
        assert!(context.analysis().is_none());
        assert!(context.classification().is_none());
        assert!(context.metrics().duration(ProcessingStage::Classification).is_some());
    }

    #[tokio::test]
    async fn model_reject_with_severity_is_cleaned() {
        let model = Arc::new(ScriptedModel::new(vec![
            Scripted::Reply(analysis_json(false)),
            Scripted::Reply(classification_json("reject", Some(50), None, None)),
        ]));

        let result = pipeline(model).process_image(IMAGE).await;

        assert_eq!(result, PublicResult::safe_reject());
        assert_eq!(result.severity, None);
    }

    #[tokio::test]
    async fn classification_failure_collapses_to_reject() {
        let model = Arc::new(ScriptedModel::new(vec![
            Scripted::Reply(analysis_json(false)),
            Scripted::Reply("{\"category\": \"volcano\"}".into()),
        ]));

        let context = pipeline(model).classify(IMAGE).await.unwrap();

        assert_eq!(context.state(), PipelineState::Formatted);
        assert_eq!(context.formatted_result(), Some(&PublicResult::safe_reject()));
        assert!(matches!(
            context.error(),
            Some(StageError::Classification(ModelError::SchemaViolation(_)))
        ));
    }

    #[tokio::test]
    async fn panicking_stage_is_contained() {
        let outcome = pipeline(Arc::new(ScriptedModel::new(vec![Scripted::Panic])))
            .run(IMAGE)
            .await;
        assert!(matches!(
            outcome,
            Err(PipelineError::StagePanicked(message)) if message.contains("scripted")
        ));

        let result = pipeline(Arc::new(ScriptedModel::new(vec![Scripted::Panic])))
            .process_image(IMAGE)
            .await;
        assert_eq!(result, PublicResult::safe_reject());
    }

    #[tokio::test]
    async fn shared_pipeline_serves_concurrent_calls() {
        let mut script = Vec::new();
        for _ in 0..4 {
            script.push(Scripted::Reply(analysis_json(true)));
        }
        let model = Arc::new(ScriptedModel::new(script));
        let pipeline = Arc::new(pipeline(model.clone()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pipeline = pipeline.clone();
                tokio::spawn(async move { pipeline.process_image(IMAGE).await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), PublicResult::safe_reject());
        }
        assert_eq!(model.call_count(), 4);
    }

    #[test]
    fn panic_messages_are_extracted() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&String::from("bang")), "bang");
        assert_eq!(panic_message(&42_u8), "unknown panic");
    }
}
