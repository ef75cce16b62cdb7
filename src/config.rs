use crate::error::ConfigError;
use serde::Deserialize;
use std::time::Duration;

const CONFIG_FILE: &str = "eco-triage";
const ENV_PREFIX: &str = "ECO_TRIAGE";
const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub analysis_temperature: f64,
    pub classification_temperature: f64,
    pub request_timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
    pub max_concurrent_requests: usize,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            // Richer scene descriptions from the vision call, steadier decisions.
            analysis_temperature: 0.9,
            classification_temperature: 0.8,
            request_timeout_secs: 60,
            max_attempts: 3,
            retry_backoff_ms: 500,
            max_concurrent_requests: 4,
        }
    }
}

impl Configuration {
    /// Layered load: defaults, then `eco-triage.toml` if present, then
    /// `ECO_TRIAGE_*` environment variables. `OPENAI_API_KEY` fills the
    /// key when nothing else did.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let mut configuration: Configuration = settings.try_deserialize()?;
        if configuration.api_key.is_none() {
            configuration.api_key = std::env::var(OPENAI_API_KEY_VAR)
                .ok()
                .filter(|key| !key.trim().is_empty());
        }
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    // Overrides used by tests and embedding callers.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_retry_backoff_ms(mut self, retry_backoff_ms: u64) -> Self {
        self.retry_backoff_ms = retry_backoff_ms;
        self
    }

    pub fn with_request_timeout_secs(mut self, request_timeout_secs: u64) -> Self {
        self.request_timeout_secs = request_timeout_secs;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("Model name must not be empty".to_string()));
        }

        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("Base URL must not be empty".to_string()));
        }

        for (name, temperature) in [
            ("Analysis temperature", self.analysis_temperature),
            ("Classification temperature", self.classification_temperature),
        ] {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be between 0.0 and 2.0"
                )));
            }
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "Max attempts must be greater than 0".to_string(),
            ));
        }

        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::Invalid(
                "Max concurrent requests must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
