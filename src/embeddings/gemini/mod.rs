
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EmbeddingError, EmbeddingModel};
use crate::config::GeminiConfig;

/// Embedding client for the Google Generative Language API.
#[derive(Debug, Clone)]
pub struct GeminiEmbedder {
    api_base: String,
    model: String,
    api_key: String,
    dimension: usize,
    http_client: reqwest::Client,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    content: Content,
}

#[derive(Debug, Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedRequest>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

impl GeminiEmbedder {
    #[inline]
    pub fn new(config: &GeminiConfig, api_key: String) -> Self {
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.embedding_model.clone(),
            api_key,
            dimension: config.embedding_dimension as usize,
            http_client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, operation: &str) -> String {
        format!(
            "{}/v1beta/models/{}:{}?key={}",
            self.api_base, self.model, operation, self.api_key
        )
    }

    fn content_for(text: &str) -> Content {
        Content {
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }

    async fn post_json<T: Serialize>(
        &self,
        url: &str,
        request: &T,
    ) -> Result<reqwest::Response, EmbeddingError> {
        let resp = self
            .http_client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| EmbeddingError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api { status, message });
        }

        Ok(resp)
    }
}

#[async_trait]
impl EmbeddingModel for GeminiEmbedder {
    #[inline]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedRequest {
                    model: format!("models/{}", self.model),
                    content: Self::content_for(text),
                })
                .collect(),
        };

        let url = self.endpoint("batchEmbedContents");
        let resp = self.post_json(&url, &request).await?;

        let response: BatchEmbedResponse = resp
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        if response.embeddings.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "Mismatch between request and response counts: {} vs {}",
                texts.len(),
                response.embeddings.len()
            )));
        }

        let vectors: Vec<Vec<f32>> = response
            .embeddings
            .into_iter()
            .map(|e| e.values)
            .collect();

        for vector in &vectors {
            if vector.len() != self.dimension {
                return Err(EmbeddingError::InvalidResponse(format!(
                    "Embedding dimension mismatch: expected {}, got {}",
                    self.dimension,
                    vector.len()
                )));
            }
        }

        debug!("Generated {} embeddings", vectors.len());
        Ok(vectors)
    }

    #[inline]
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        debug!("Generating embedding for query (length: {})", text.len());

        let request = EmbedRequest {
            model: format!("models/{}", self.model),
            content: Self::content_for(text),
        };

        let url = self.endpoint("embedContent");
        let resp = self.post_json(&url, &request).await?;

        let response: EmbedContentResponse = resp
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        if response.embedding.values.len() != self.dimension {
            return Err(EmbeddingError::InvalidResponse(format!(
                "Embedding dimension mismatch: expected {}, got {}",
                self.dimension,
                response.embedding.values.len()
            )));
        }

        Ok(response.embedding.values)
    }

    #[inline]
    fn dimension(&self) -> usize {
        self.dimension
    }
}
