//! Mock embedding backend for deterministic testing.
//!
//! Default embeddings are character histograms: each character hashes into
//! a bucket and counts occurrences. Lightly perturbed strings therefore
//! stay geometrically close to their source, which is the property pipeline
//! tests need from a stand-in for a semantic model, with no model downloads
//! and full determinism.
//!
//! ## Usage
//!
//! ```rust
//! use canonry_inference::mock::MockEmbeddingBackend;
//! use canonry_core::EmbeddingBackend;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let backend = MockEmbeddingBackend::new().with_dimension(64);
//! let out = backend.embed_texts(&["Alpha North".to_string()]).await.unwrap();
//! assert_eq!(out[0].len(), 64);
//! # }
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use canonry_core::{EmbeddingBackend, Embedding, Error, Result};

/// Mock embedding backend for testing.
#[derive(Clone)]
pub struct MockEmbeddingBackend {
    config: Arc<MockConfig>,
    batches: Arc<Mutex<Vec<Vec<String>>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    dimension: usize,
    fixed_vectors: HashMap<String, Embedding>,
    fail_embeds: bool,
    unavailable: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            dimension: 64,
            fixed_vectors: HashMap::new(),
            fail_embeds: false,
            unavailable: false,
        }
    }
}

impl MockEmbeddingBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            batches: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the embedding dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        Arc::make_mut(&mut self.config).dimension = dimension;
        self
    }

    /// Pin the exact vector returned for a specific input text.
    pub fn with_fixed_vector(mut self, text: impl Into<String>, vector: Embedding) -> Self {
        Arc::make_mut(&mut self.config)
            .fixed_vectors
            .insert(text.into(), vector);
        self
    }

    /// Make every embed call fail, for testing error propagation.
    pub fn with_failing_embeds(mut self) -> Self {
        Arc::make_mut(&mut self.config).fail_embeds = true;
        self
    }

    /// Make `ensure_available` fail, for testing the model-load abort path.
    pub fn with_unavailable_model(mut self) -> Self {
        Arc::make_mut(&mut self.config).unavailable = true;
        self
    }

    /// Batches received so far, in call order.
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }

    /// Number of embed calls made.
    pub fn embed_call_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }

    fn histogram(&self, text: &str) -> Embedding {
        let dim = self.config.dimension;
        let mut v = vec![0.0f32; dim];
        for ch in text.chars().filter(|c| !c.is_whitespace()) {
            for lower in ch.to_lowercase() {
                v[(lower as usize) % dim] += 1.0;
            }
        }
        v
    }
}

impl Default for MockEmbeddingBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingBackend for MockEmbeddingBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        self.batches.lock().unwrap().push(texts.to_vec());

        if self.config.fail_embeds {
            return Err(Error::Embedding("mock backend failure injected".to_string()));
        }

        Ok(texts
            .iter()
            .map(|t| {
                self.config
                    .fixed_vectors
                    .get(t)
                    .cloned()
                    .unwrap_or_else(|| self.histogram(t))
            })
            .collect())
    }

    async fn ensure_available(&self) -> Result<()> {
        if self.config.unavailable {
            return Err(Error::ModelUnavailable(
                "mock model configured as unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn model_name(&self) -> &str {
        "mock-embed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        dot / (na * nb)
    }

    #[tokio::test]
    async fn test_deterministic_and_aligned() {
        let backend = MockEmbeddingBackend::new();
        let texts = vec!["Alpha North".to_string(), "Beta South".to_string()];
        let a = backend.embed_texts(&texts).await.unwrap();
        let b = backend.embed_texts(&texts).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert_eq!(backend.embed_call_count(), 2);
    }

    #[tokio::test]
    async fn test_perturbed_text_stays_closest_to_origin() {
        let backend = MockEmbeddingBackend::new();
        let texts = vec![
            "Alpha North".to_string(),
            "Beta South".to_string(),
            "Alpna North".to_string(), // one substitution off the first
        ];
        let out = backend.embed_texts(&texts).await.unwrap();
        let to_alpha = cosine(&out[2], &out[0]);
        let to_beta = cosine(&out[2], &out[1]);
        assert!(to_alpha > to_beta);
    }

    #[tokio::test]
    async fn test_case_insensitive_histogram() {
        let backend = MockEmbeddingBackend::new();
        let out = backend
            .embed_texts(&["ALPHA".to_string(), "alpha".to_string()])
            .await
            .unwrap();
        assert_eq!(out[0], out[1]);
    }

    #[tokio::test]
    async fn test_fixed_vector_override() {
        let backend =
            MockEmbeddingBackend::new().with_fixed_vector("pinned", vec![1.0, 0.0, 0.0]);
        let out = backend.embed_texts(&["pinned".to_string()]).await.unwrap();
        assert_eq!(out[0], vec![1.0, 0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let backend = MockEmbeddingBackend::new().with_failing_embeds();
        let err = backend.embed_texts(&["x".to_string()]).await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }

    #[tokio::test]
    async fn test_unavailable_model() {
        let backend = MockEmbeddingBackend::new().with_unavailable_model();
        let err = backend.ensure_available().await.unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable(_)));
    }
}
