pub mod client;
pub mod openai;
pub mod retry;
pub mod service;
pub mod structured;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ModelRequest, VisionModel};
pub use openai::OpenAiChatModel;
pub use retry::RetryPolicy;
pub use service::ModelService;
pub use structured::{StructuredModel, StructuredOutput, decode};
