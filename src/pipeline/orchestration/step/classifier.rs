use crate::error::{ModelError, StageError};
use crate::model::{ModelRequest, StructuredModel};
use crate::pipeline::context::{AnalysisContext, ProcessingStage};
use crate::pipeline::domain::{ClassificationResult, SceneAnalysis};
use crate::pipeline::orchestration::ProcessingStep;
use crate::pipeline::orchestration::prompts::classification_prompt;
use async_trait::async_trait;

/// Decision stage: category, severity, level and scale from the analysis.
///
/// Indoor/household scenes are rejected here without consulting the model,
/// and a model reject never keeps its severity fields.
pub struct ClassificationStep {
    model: StructuredModel,
    temperature: f64,
}

impl ClassificationStep {
    pub fn new(model: StructuredModel) -> Self {
        Self {
            model,
            temperature: 0.8,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub async fn classify(&self, analysis: &SceneAnalysis) -> Result<ClassificationResult, ModelError> {
        if analysis.is_indoor_household {
            return Ok(ClassificationResult::indoor_household_reject());
        }

        let request = ModelRequest::for_output::<ClassificationResult>(
            classification_prompt(analysis),
            self.temperature,
        );
        let decision: ClassificationResult = self.model.invoke(request).await?;

        Ok(decision.enforce_reject_invariant().normalize_severity_level())
    }
}

#[async_trait]
impl ProcessingStep for ClassificationStep {
    async fn process(&self, context: AnalysisContext) -> AnalysisContext {
        let Some(analysis) = context.analysis() else {
            return context.with_error(StageError::MissingAnalysis);
        };

        match self.classify(analysis).await {
            Ok(classification) => {
                tracing::debug!(
                    category = %classification.category,
                    confidence = classification.confidence,
                    reasoning = %classification.reasoning,
                    "Classification complete"
                );
                context.with_classification(classification)
            }
            Err(error) => context.with_error(StageError::Classification(error)),
        }
    }

    fn name(&self) -> &'static str {
        "ClassificationStep"
    }

    fn stage(&self) -> ProcessingStage {
        ProcessingStage::Classification
    }
}
