use crate::error::ModelError;
use crate::model::client::{ModelRequest, VisionModel};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;

/// Adapts a [`VisionModel`] into a `tower::Service` so timeouts and
/// concurrency limits can be layered around every call.
#[derive(Clone)]
pub struct ModelService {
    inner: Arc<dyn VisionModel>,
}

impl ModelService {
    pub fn new(inner: Arc<dyn VisionModel>) -> Self {
        Self { inner }
    }
}

impl Service<ModelRequest> for ModelService {
    type Response = String;
    type Error = ModelError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: ModelRequest) -> Self::Future {
        let inner = self.inner.clone();
        Box::pin(async move { inner.complete(request).await })
    }
}
