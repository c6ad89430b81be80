//! # canonry-inference
//!
//! Embedding backend abstraction for canonry.
//!
//! This crate provides:
//! - Ollama implementation of `EmbeddingBackend` (default)
//! - OpenAI-compatible implementation (optional, feature `openai`)
//! - Deterministic mock backend for tests (feature `mock`)
//! - Provider selection and backend construction from the environment
//!
//! # Feature Flags
//!
//! - `ollama` (default): Enable Ollama backend
//! - `openai`: Enable OpenAI-compatible backend
//! - `mock`: Enable the mock backend outside `cfg(test)`
//!
//! # Example
//!
//! ```rust,no_run
//! use canonry_inference::OllamaBackend;
//! use canonry_core::EmbeddingBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OllamaBackend::from_env();
//!     let texts = vec!["Alpha North".to_string()];
//!     let embeddings = backend.embed_texts(&texts).await.unwrap();
//!     assert_eq!(embeddings.len(), 1);
//! }
//! ```

pub mod provider;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use canonry_core::{EmbeddingBackend, Error, Result};

pub use provider::{backend_from_env, EmbeddingProvider};

#[cfg(feature = "ollama")]
pub use ollama::OllamaBackend;

#[cfg(feature = "openai")]
pub use openai::{OpenAIBackend, OpenAIConfig};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbeddingBackend;
