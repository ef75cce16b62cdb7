use crate::error::ModelError;
use crate::model::structured::StructuredOutput;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// One schema-constrained invocation: a prompt, an optional image and the
/// JSON schema the reply must follow.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub schema_name: &'static str,
    pub schema: Value,
    pub prompt: String,
    pub image_base64: Option<Arc<str>>,
    pub temperature: f64,
}

impl ModelRequest {
    pub fn for_output<T: StructuredOutput>(prompt: impl Into<String>, temperature: f64) -> Self {
        Self {
            schema_name: T::SCHEMA_NAME,
            schema: T::json_schema(),
            prompt: prompt.into(),
            image_base64: None,
            temperature,
        }
    }

    pub fn with_image(mut self, image_base64: Arc<str>) -> Self {
        self.image_base64 = Some(image_base64);
        self
    }

    pub fn has_image(&self) -> bool {
        self.image_base64.is_some()
    }
}

/// An external vision-capable language model.
///
/// Implementations return the raw text of the reply; decoding against the
/// schema happens in [`crate::model::StructuredModel`].
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn complete(&self, request: ModelRequest) -> Result<String, ModelError>;
    fn name(&self) -> &str;
}
