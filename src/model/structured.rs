use crate::config::Configuration;
use crate::error::ModelError;
use crate::model::client::{ModelRequest, VisionModel};
use crate::model::retry::RetryPolicy;
use crate::model::service::ModelService;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::{BoxError, ServiceBuilder, ServiceExt};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_CONCURRENCY: usize = 4;

/// A shape the model must produce, with the schema sent along with the
/// request and the checks serde alone cannot express.
pub trait StructuredOutput: DeserializeOwned + Send + 'static {
    const SCHEMA_NAME: &'static str;

    fn json_schema() -> Value;

    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Strict decode-and-validate of a raw model reply.
pub fn decode<T: StructuredOutput>(raw: &str) -> Result<T, ModelError> {
    let value: T = serde_json::from_str(raw.trim())
        .map_err(|e| ModelError::SchemaViolation(format!("{}: {}", T::SCHEMA_NAME, e)))?;
    value
        .validate()
        .map_err(|e| ModelError::SchemaViolation(format!("{}: {}", T::SCHEMA_NAME, e)))?;
    Ok(value)
}

/// Schema-constrained access to a [`VisionModel`].
///
/// Every call goes through a timeout and a concurrency limit shared by all
/// clones, and call + decode is retried under the [`RetryPolicy`].
#[derive(Clone)]
pub struct StructuredModel {
    model: Arc<dyn VisionModel>,
    limiter: Arc<Semaphore>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl StructuredModel {
    pub fn new(model: Arc<dyn VisionModel>) -> Self {
        Self {
            model,
            limiter: Arc::new(Semaphore::new(DEFAULT_CONCURRENCY)),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::none(),
        }
    }

    pub fn from_configuration(model: Arc<dyn VisionModel>, configuration: &Configuration) -> Self {
        Self::new(model)
            .with_timeout(configuration.request_timeout())
            .with_concurrency_limit(configuration.max_concurrent_requests)
            .with_retry(RetryPolicy::new(
                configuration.max_attempts,
                configuration.retry_backoff(),
            ))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency_limit(mut self, max_in_flight: usize) -> Self {
        self.limiter = Arc::new(Semaphore::new(max_in_flight.max(1)));
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub async fn invoke<T: StructuredOutput>(&self, request: ModelRequest) -> Result<T, ModelError> {
        self.retry
            .run(|attempt| {
                let request = request.clone();
                async move {
                    tracing::debug!(
                        "Invoking {} for {} (attempt {})",
                        self.model.name(),
                        T::SCHEMA_NAME,
                        attempt
                    );
                    let raw = self.call(request).await?;
                    decode::<T>(&raw)
                }
            })
            .await
    }

    async fn call(&self, request: ModelRequest) -> Result<String, ModelError> {
        let service = ServiceBuilder::new()
            .layer(GlobalConcurrencyLimitLayer::with_semaphore(self.limiter.clone()))
            .timeout(self.timeout)
            .service(ModelService::new(self.model.clone()));

        service
            .oneshot(request)
            .await
            .map_err(|error| self.map_service_error(error))
    }

    fn map_service_error(&self, error: BoxError) -> ModelError {
        if error.is::<tower::timeout::error::Elapsed>() {
            return ModelError::Timeout(self.timeout);
        }
        match error.downcast::<ModelError>() {
            Ok(model_error) => *model_error,
            Err(other) => ModelError::Service(other.to_string()),
        }
    }
}
