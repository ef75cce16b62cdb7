use std::time::Duration;
use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("API key not configured. Set OPENAI_API_KEY or ECO_TRIAGE_API_KEY.")]
    MissingApiKey,
    #[error("Usage: {0}")]
    Usage(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// Failures of a single external model invocation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("model API key is not configured")]
    MissingApiKey,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("model service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),
    #[error("model refused the request: {0}")]
    Refusal(String),
    #[error("model returned an empty response")]
    EmptyResponse,
    #[error("output does not match schema: {0}")]
    SchemaViolation(String),
    #[error("model service error: {0}")]
    Service(String),
}

impl ModelError {
    /// Whether another attempt at the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ModelError::Transport(_)
            | ModelError::Timeout(_)
            | ModelError::EmptyResponse
            | ModelError::SchemaViolation(_) => true,
            ModelError::Status { status, .. } => *status == 429 || *status >= 500,
            ModelError::MissingApiKey | ModelError::Refusal(_) | ModelError::Service(_) => false,
        }
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(error: reqwest::Error) -> Self {
        ModelError::Transport(error.to_string())
    }
}

// Failures recorded on the analysis context by the stages
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    #[error("Error in image analysis: {0}")]
    Analysis(ModelError),
    #[error("No analysis available for classification")]
    MissingAnalysis,
    #[error("Error in image classification: {0}")]
    Classification(ModelError),
    #[error("Error formatting output: {0}")]
    Formatting(String),
}

// Engine-internal failures, collapsed to the safe reject payload at the boundary
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("stage panicked: {0}")]
    StagePanicked(String),
    #[error("pipeline finished without a formatted result")]
    MissingFormattedResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors_are_transient_ones() {
        assert!(ModelError::Transport("reset".into()).is_retryable());
        assert!(ModelError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(ModelError::SchemaViolation("missing field".into()).is_retryable());
        assert!(ModelError::Status { status: 503, body: String::new() }.is_retryable());
        assert!(ModelError::Status { status: 429, body: String::new() }.is_retryable());
        assert!(!ModelError::Status { status: 401, body: String::new() }.is_retryable());
        assert!(!ModelError::MissingApiKey.is_retryable());
        assert!(!ModelError::Refusal("no".into()).is_retryable());
    }

    #[test]
    fn stage_errors_carry_descriptive_messages() {
        assert_eq!(
            StageError::MissingAnalysis.to_string(),
            "No analysis available for classification"
        );
        let err = StageError::Analysis(ModelError::Transport("connection refused".into()));
        assert_eq!(
            err.to_string(),
            "Error in image analysis: transport error: connection refused"
        );
    }
}
