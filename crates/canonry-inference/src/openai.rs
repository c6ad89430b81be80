//! OpenAI-compatible embedding backend (feature `openai`).
//!
//! Works with any `/v1/embeddings`-shaped endpoint: the OpenAI cloud API,
//! Ollama in compatibility mode, vLLM, LocalAI, etc.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

use canonry_core::{defaults, EmbeddingBackend, Embedding, Error, Result};

/// Default OpenAI API base URL.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default embedding model.
pub const DEFAULT_EMBED_MODEL: &str = "text-embedding-3-small";

/// Default embedding dimension for text-embedding-3-small.
pub const DEFAULT_DIMENSION: usize = 1536;

/// Configuration for the OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Base URL including the `/v1` path segment.
    pub base_url: String,
    /// API key; optional for local deployments.
    pub api_key: Option<String>,
    /// Model to use for embeddings.
    pub model: String,
    /// Embedding vector dimension.
    pub dimension: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_URL.to_string(),
            api_key: None,
            model: DEFAULT_EMBED_MODEL.to_string(),
            dimension: DEFAULT_DIMENSION,
            timeout_secs: defaults::EMBED_TIMEOUT_SECS,
        }
    }
}

/// OpenAI-compatible embedding backend.
pub struct OpenAIBackend {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIBackend {
    /// Create a backend from an explicit configuration.
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing OpenAI backend: url={}, model={}",
            config.base_url, config.model
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `CANONRY_OPENAI_URL` | `https://api.openai.com/v1` |
    /// | `CANONRY_OPENAI_KEY` | (none) |
    /// | `CANONRY_EMBED_MODEL` | `text-embedding-3-small` |
    /// | `CANONRY_EMBED_DIM` | 1536 |
    pub fn from_env() -> Result<Self> {
        let config = OpenAIConfig {
            base_url: std::env::var("CANONRY_OPENAI_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_URL.to_string()),
            api_key: std::env::var("CANONRY_OPENAI_KEY").ok(),
            model: std::env::var("CANONRY_EMBED_MODEL")
                .unwrap_or_else(|_| DEFAULT_EMBED_MODEL.to_string()),
            dimension: std::env::var("CANONRY_EMBED_DIM")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_DIMENSION),
            timeout_secs: std::env::var("CANONRY_EMBED_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults::EMBED_TIMEOUT_SECS),
        };
        Self::with_config(config)
    }

    /// Override the model after construction (CLI `--model` flag).
    pub fn set_model(&mut self, model: String) {
        info!(
            "Switching embedding model from {} to {}",
            self.config.model, model
        );
        self.config.model = model;
    }

    fn build_request(&self, path: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.post(format!("{}{}", self.config.base_url, path));
        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }
        req
    }
}

#[derive(Serialize)]
struct EmbeddingsRequest {
    model: String,
    input: Vec<String>,
    encoding_format: &'static str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

#[async_trait]
impl EmbeddingBackend for OpenAIBackend {
    #[instrument(skip(self, texts), fields(subsystem = "inference", component = "openai", op = "embed_texts", model = %self.config.model, input_count = texts.len()))]
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let request = EmbeddingsRequest {
            model: self.config.model.clone(),
            input: texts.to_vec(),
            encoding_format: "float",
        };

        let response = self
            .build_request("/embeddings")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ApiErrorResponse>()
                .await
                .map(|b| b.error.message)
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Embedding(format!(
                "OpenAI returned {}: {}",
                status, message
            )));
        }

        let result: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("Failed to parse response: {}", e)))?;

        // The API may return items out of order; sort by index to keep the
        // result aligned with the input batch.
        let mut data = result.data;
        data.sort_by_key(|d| d.index);

        if data.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "OpenAI returned {} embeddings for {} inputs",
                data.len(),
                texts.len()
            )));
        }

        debug!(result_count = data.len(), "Embedding complete");
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }

    /// Probe the endpoint with a tiny embed so a bad key, URL, or model
    /// name aborts the run before any real batch is sent.
    async fn ensure_available(&self) -> Result<()> {
        self.embed_texts(&["ping".to_string()])
            .await
            .map_err(|e| Error::ModelUnavailable(e.to_string()))?;
        Ok(())
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OpenAIConfig::default();
        assert_eq!(config.base_url, DEFAULT_OPENAI_URL);
        assert!(config.api_key.is_none());
        assert_eq!(config.model, DEFAULT_EMBED_MODEL);
        assert_eq!(config.dimension, DEFAULT_DIMENSION);
    }

    #[test]
    fn test_backend_exposes_config() {
        let backend = OpenAIBackend::with_config(OpenAIConfig {
            model: "custom-embed".to_string(),
            dimension: 384,
            ..OpenAIConfig::default()
        })
        .unwrap();
        assert_eq!(backend.model_name(), "custom-embed");
        assert_eq!(backend.dimension(), 384);
    }

    #[test]
    fn test_embeddings_request_serialization() {
        let request = EmbeddingsRequest {
            model: "text-embedding-3-small".to_string(),
            input: vec!["a".to_string(), "b".to_string()],
            encoding_format: "float",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["encoding_format"], "float");
        assert_eq!(json["input"].as_array().unwrap().len(), 2);
    }
}
