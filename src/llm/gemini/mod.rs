
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatModel, LlmError};
use crate::config::GeminiConfig;

/// Chat client for the Google Generative Language API.
#[derive(Debug, Clone)]
pub struct GeminiChatModel {
    api_base: String,
    model: String,
    api_key: String,
    temperature: f64,
    http_client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct RequestContent {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: RequestContent,
}

impl GeminiChatModel {
    #[inline]
    pub fn new(config: &GeminiConfig, api_key: String) -> Self {
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.chat_model.clone(),
            api_key,
            temperature: config.temperature,
            http_client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        )
    }
}

#[async_trait]
impl ChatModel for GeminiChatModel {
    #[inline]
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        debug!("Generating completion (prompt length: {})", prompt.len());

        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let resp = self
            .http_client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, message });
        }

        let response: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| LlmError::InvalidResponse("Response has no candidates".to_string()))?;

        debug!("Generated completion (length: {})", text.len());
        Ok(text)
    }
}
