use crate::pipeline::context::{AnalysisContext, ProcessingStage};
use async_trait::async_trait;

/// One stage of the classification pipeline.
///
/// A step takes ownership of the context and hands back the updated one.
/// Steps never fail past their own boundary: failures are recorded on the
/// context and later steps check their own preconditions.
#[async_trait]
pub trait ProcessingStep: Send + Sync {
    async fn process(&self, context: AnalysisContext) -> AnalysisContext;
    fn name(&self) -> &'static str;
    fn stage(&self) -> ProcessingStage;
}
