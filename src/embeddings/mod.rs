// Embedding generation module
// Defines the embedding capability trait and the hosted-API client

pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::GeminiEmbedder;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Embedding API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Embedding network error: {0}")]
    Network(String),

    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),
}

impl From<EmbeddingError> for crate::ShopError {
    #[inline]
    fn from(err: EmbeddingError) -> Self {
        crate::ShopError::Embedding(err.to_string())
    }
}

/// Capability interface for converting text into vector embeddings.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Embed a batch of texts in one provider call.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Embed a single query string.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Dimension of the produced vectors.
    fn dimension(&self) -> usize;
}

/// Predicate deciding whether an embedding failure signals quota
/// exhaustion. The exact signature is provider-specific, so the markers
/// are configuration rather than hardcoded matching.
#[derive(Debug, Clone)]
pub struct QuotaSignature {
    markers: Vec<String>,
}

impl QuotaSignature {
    #[inline]
    pub fn new(markers: Vec<String>) -> Self {
        Self { markers }
    }

    /// True when the error looks like a rate-limit/quota condition.
    #[inline]
    pub fn matches(&self, err: &EmbeddingError) -> bool {
        if let EmbeddingError::Api { status: 429, .. } = err {
            return true;
        }

        let text = err.to_string();
        self.markers.iter().any(|marker| text.contains(marker))
    }
}

impl Default for QuotaSignature {
    #[inline]
    fn default() -> Self {
        Self {
            markers: vec!["RESOURCE_EXHAUSTED".to_string(), "429".to_string()],
        }
    }
}
