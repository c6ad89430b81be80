//! Core traits for canonry abstractions.
//!
//! The embedding model is the one expensive shared resource in a run. It
//! sits behind [`EmbeddingBackend`] so pipeline logic never touches a
//! concrete model implementation and tests can swap in a mock.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Embedding;

/// A text-to-vector capability backed by a pretrained model.
///
/// Implementations are created once per run (model load is expensive) and
/// treated as read-only afterwards. Unless a backend documents otherwise,
/// callers must not invoke it concurrently; the pipeline serializes all
/// batches through a single owner.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Embed a batch of strings. The result is index-aligned with the
    /// input: one vector per string, each of [`dimension`](Self::dimension)
    /// length. An empty batch yields an empty result without a model call.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Verify the backend is reachable and the model is actually loadable.
    ///
    /// Called once before the first embed batch so a missing model aborts
    /// the run with `Error::ModelUnavailable` instead of failing midway.
    async fn ensure_available(&self) -> Result<()> {
        Ok(())
    }

    /// Embedding vector length produced by this backend.
    fn dimension(&self) -> usize;

    /// Name of the underlying model.
    fn model_name(&self) -> &str;
}
