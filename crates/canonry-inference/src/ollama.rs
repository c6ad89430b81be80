//! Ollama embedding backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use canonry_core::{defaults, EmbeddingBackend, Embedding, Error, Result};

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = defaults::OLLAMA_URL;

/// Default embedding model.
pub const DEFAULT_EMBED_MODEL: &str = defaults::EMBED_MODEL;

/// Default embedding dimension for the default model.
pub const DEFAULT_DIMENSION: usize = defaults::EMBED_DIMENSION;

/// Ollama embedding backend.
pub struct OllamaBackend {
    client: Client,
    base_url: String,
    model: String,
    dimension: usize,
    timeout_secs: u64,
}

impl OllamaBackend {
    /// Create a new Ollama backend with default settings.
    pub fn new() -> Self {
        Self::with_config(
            DEFAULT_OLLAMA_URL.to_string(),
            DEFAULT_EMBED_MODEL.to_string(),
            DEFAULT_DIMENSION,
        )
    }

    /// Create a new Ollama backend with custom configuration.
    pub fn with_config(base_url: String, model: String, dimension: usize) -> Self {
        let timeout_secs = std::env::var("CANONRY_EMBED_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::EMBED_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        info!(
            "Initializing Ollama backend: url={}, model={}",
            base_url, model
        );

        Self {
            client,
            base_url,
            model,
            dimension,
            timeout_secs,
        }
    }

    /// Create from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `CANONRY_OLLAMA_URL` | `http://localhost:11434` |
    /// | `CANONRY_EMBED_MODEL` | `paraphrase-multilingual` |
    /// | `CANONRY_EMBED_DIM` | 768 |
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("CANONRY_OLLAMA_URL").unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string());
        let model = std::env::var("CANONRY_EMBED_MODEL")
            .unwrap_or_else(|_| DEFAULT_EMBED_MODEL.to_string());
        let dimension = std::env::var("CANONRY_EMBED_DIM")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_DIMENSION);

        Self::with_config(base_url, model, dimension)
    }

    /// Override the model after construction (CLI `--model` flag).
    pub fn set_model(&mut self, model: String) {
        info!("Switching embedding model from {} to {}", self.model, model);
        self.model = model;
    }
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Response from the Ollama `/api/tags` endpoint.
#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<TagModel>,
}

#[derive(Deserialize)]
struct TagModel {
    name: String,
}

#[async_trait]
impl EmbeddingBackend for OllamaBackend {
    #[instrument(skip(self, texts), fields(subsystem = "inference", component = "ollama", op = "embed_texts", model = %self.model, input_count = texts.len()))]
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let start = Instant::now();

        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let result: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("Failed to parse response: {}", e)))?;

        if result.embeddings.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "Ollama returned {} embeddings for {} inputs",
                result.embeddings.len(),
                texts.len()
            )));
        }

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            result_count = result.embeddings.len(),
            duration_ms = elapsed,
            "Embedding complete"
        );
        if elapsed > defaults::SLOW_EMBED_MS {
            warn!(
                duration_ms = elapsed,
                input_count = texts.len(),
                slow = true,
                "Slow embedding operation"
            );
        }
        Ok(result.embeddings)
    }

    /// Probe `/api/tags` and verify the configured model is actually pulled.
    #[instrument(skip(self), fields(subsystem = "inference", component = "ollama", op = "ensure_available", model = %self.model))]
    async fn ensure_available(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| {
                Error::ModelUnavailable(format!("Ollama unreachable at {}: {}", self.base_url, e))
            })?;

        if !response.status().is_success() {
            return Err(Error::ModelUnavailable(format!(
                "Ollama returned {} from /api/tags",
                response.status()
            )));
        }

        let tags: TagsResponse = response.json().await.map_err(|e| {
            Error::ModelUnavailable(format!("Failed to parse /api/tags response: {}", e))
        })?;

        // Ollama reports models as "name:tag"; accept a bare-name match.
        let present = tags.models.iter().any(|m| {
            m.name == self.model || m.name.split(':').next() == Some(self.model.as_str())
        });
        if !present {
            return Err(Error::ModelUnavailable(format!(
                "model '{}' is not served by Ollama at {} (pull it first)",
                self.model, self.base_url
            )));
        }

        info!("Ollama model available");
        Ok(())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration() {
        let backend = OllamaBackend::new();
        assert_eq!(backend.base_url, DEFAULT_OLLAMA_URL);
        assert_eq!(backend.model_name(), DEFAULT_EMBED_MODEL);
        assert_eq!(backend.dimension(), DEFAULT_DIMENSION);
    }

    #[test]
    fn test_with_config() {
        let backend =
            OllamaBackend::with_config("http://10.0.0.2:11434".to_string(), "labse".to_string(), 768);
        assert_eq!(backend.base_url, "http://10.0.0.2:11434");
        assert_eq!(backend.model_name(), "labse");
    }

    #[test]
    fn test_set_model() {
        let mut backend = OllamaBackend::new();
        backend.set_model("labse".to_string());
        assert_eq!(backend.model_name(), "labse");
    }

    #[test]
    fn test_embedding_request_serialization() {
        let request = EmbeddingRequest {
            model: "labse".to_string(),
            input: vec!["Alpha North".to_string()],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "labse");
        assert_eq!(json["input"][0], "Alpha North");
    }

    #[tokio::test]
    async fn test_embed_empty_batch_skips_request() {
        // Unroutable URL: any actual request would error out.
        let backend =
            OllamaBackend::with_config("http://192.0.2.1:1".to_string(), "labse".to_string(), 4);
        let result = backend.embed_texts(&[]).await.unwrap();
        assert!(result.is_empty());
    }
}
