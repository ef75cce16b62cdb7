use crate::config::Configuration;
use crate::error::ModelError;
use crate::model::client::{ModelRequest, VisionModel};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

const MAX_ERROR_BODY: usize = 512;

/// Chat-completions client for OpenAI-compatible endpoints using
/// `json_schema` structured outputs.
pub struct OpenAiChatModel {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

impl OpenAiChatModel {
    pub fn new(configuration: &Configuration) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(configuration.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: configuration.base_url.trim_end_matches('/').to_string(),
            api_key: configuration.api_key.clone(),
            model: configuration.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_payload(&self, request: &ModelRequest) -> Value {
        let content = match &request.image_base64 {
            Some(image) => json!([
                { "type": "text", "text": request.prompt },
                {
                    "type": "image_url",
                    "image_url": { "url": format!("data:image/jpeg;base64,{image}") }
                }
            ]),
            None => Value::String(request.prompt.clone()),
        };

        json!({
            "model": self.model,
            "temperature": request.temperature,
            "messages": [{ "role": "user", "content": content }],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": request.schema_name,
                    "strict": true,
                    "schema": request.schema
                }
            }
        })
    }
}

fn parse_completion(body: &str) -> Result<String, ModelError> {
    let response: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| ModelError::Service(format!("malformed completion envelope: {e}")))?;

    let message = response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or(ModelError::EmptyResponse)?;

    if let Some(refusal) = message.refusal.filter(|r| !r.trim().is_empty()) {
        return Err(ModelError::Refusal(refusal));
    }

    message
        .content
        .filter(|content| !content.trim().is_empty())
        .ok_or(ModelError::EmptyResponse)
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((index, _)) => format!("{}...", &body[..index]),
        None => body.to_string(),
    }
}

#[async_trait]
impl VisionModel for OpenAiChatModel {
    async fn complete(&self, request: ModelRequest) -> Result<String, ModelError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ModelError::MissingApiKey)?;

        let payload = self.build_payload(&request);
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ModelError::Status {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        parse_completion(&body)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
