//! OpenAI-compatible HTTP backend.
//!
//! Speaks the `/embeddings` and `/chat/completions` surface of the OpenAI
//! API (and compatible gateways). This type is the raw transport; the
//! capability gating and degradation policy live in
//! [`crate::provider::AiProvider`].

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use quill_core::{AiConfig, Error, Result, Vector};

/// OpenAI-compatible inference backend.
#[derive(Debug)]
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    base_url: String,
    embed_model: String,
    chat_model: String,
    embed_timeout: Duration,
    chat_timeout: Duration,
}

impl OpenAiBackend {
    /// Build a backend from configuration.
    ///
    /// Fails with [`Error::Config`] when no credential is present — callers
    /// gate on [`AiConfig::is_enabled`] first.
    pub fn new(config: &AiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is not set".to_string()))?;

        let client = Client::builder()
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        debug!(
            subsystem = "inference",
            component = "openai",
            op = "init",
            model = %config.embed_model,
            "Initialized OpenAI-compatible backend"
        );

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            embed_model: config.embed_model.clone(),
            chat_model: config.chat_model.clone(),
            embed_timeout: Duration::from_secs(config.embed_timeout_secs),
            chat_timeout: Duration::from_secs(config.chat_timeout_secs),
        })
    }

    /// The embedding model in use.
    pub fn embed_model(&self) -> &str {
        &self.embed_model
    }

    /// The chat model in use.
    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    /// Compute an embedding vector for one text.
    pub async fn embed_text(&self, text: &str) -> Result<Vector> {
        let start = Instant::now();
        let request = EmbeddingRequest {
            model: self.embed_model.clone(),
            input: text.to_string(),
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.embed_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "Provider returned {}: {}",
                status, body
            )));
        }

        let result: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("Failed to parse response: {}", e)))?;

        let embedding = result
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::Embedding("Empty embedding response".to_string()))?;

        debug!(
            subsystem = "inference",
            component = "openai",
            op = "embed_text",
            duration_ms = start.elapsed().as_millis() as u64,
            "Embedding complete"
        );
        Ok(Vector::from(embedding))
    }

    /// Generate a plain chat completion for `prompt`.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        self.chat_internal(None, prompt, None).await
    }

    /// Generate a completion constrained to a JSON schema, returning the
    /// parsed JSON payload.
    pub async fn complete_structured(
        &self,
        system: &str,
        prompt: &str,
        schema_name: &str,
        schema: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let format = serde_json::json!({
            "type": "json_schema",
            "json_schema": {
                "name": schema_name,
                "strict": true,
                "schema": schema,
            }
        });
        let content = self.chat_internal(Some(system), prompt, Some(format)).await?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Inference(format!("Structured output was not valid JSON: {}", e)))
    }

    async fn chat_internal(
        &self,
        system: Option<&str>,
        prompt: &str,
        response_format: Option<serde_json::Value>,
    ) -> Result<String> {
        let start = Instant::now();

        let mut messages = Vec::new();
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });

        let request = ChatRequest {
            model: self.chat_model.clone(),
            messages,
            response_format,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.chat_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "Provider returned {}: {}",
                status, body
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        let content = result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Inference("Empty completion response".to_string()))?;

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            subsystem = "inference",
            component = "openai",
            op = "complete",
            prompt_len = prompt.len(),
            duration_ms = elapsed,
            "Completion complete"
        );
        if elapsed > 30_000 {
            warn!(
                subsystem = "inference",
                component = "openai",
                duration_ms = elapsed,
                prompt_len = prompt.len(),
                "Slow completion"
            );
        }
        Ok(content)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    input: String,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
