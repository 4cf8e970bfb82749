// Chat model module
// Capability trait for the LLM calls made by the query orchestrator

pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::GeminiChatModel;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Chat API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Chat network error: {0}")]
    Network(String),

    #[error("Invalid chat response: {0}")]
    InvalidResponse(String),
}

impl From<LlmError> for crate::ShopError {
    #[inline]
    fn from(err: LlmError) -> Self {
        crate::ShopError::Llm(err.to_string())
    }
}

/// Capability interface for single-turn text generation.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a completion for one prompt.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
