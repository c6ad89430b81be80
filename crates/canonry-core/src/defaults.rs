//! Centralized default constants for canonry.
//!
//! **This module is the single source of truth** for shared default values.
//! All crates and the CLI reference these constants instead of defining
//! their own magic numbers.

// =============================================================================
// MATCHING
// =============================================================================

/// Candidates returned per query by the similarity index. Resolution always
/// uses the rank-1 candidate; the rest exist for diagnostics.
pub const TOP_K: usize = 5;

// =============================================================================
// AUGMENTATION
// =============================================================================

/// Synthetic noisy variants generated per reference entity.
pub const AUGMENT_COUNT: usize = 10;

/// Minimum character edits per variant.
pub const AUGMENT_MIN_EDITS: usize = 1;

/// Maximum character edits per variant. Kept small: variants should stay
/// recognizable perturbations of the source title.
pub const AUGMENT_MAX_EDITS: usize = 3;

// =============================================================================
// EMBEDDING
// =============================================================================

/// Default Ollama endpoint.
pub const OLLAMA_URL: &str = "http://localhost:11434";

/// Default embedding model name (Ollama). Registry names are frequently
/// Cyrillic, so the default is a multilingual sentence model.
pub const EMBED_MODEL: &str = "paraphrase-multilingual";

/// Default embedding vector dimension for paraphrase-multilingual.
pub const EMBED_DIMENSION: usize = 768;

/// Timeout for embedding requests (seconds).
pub const EMBED_TIMEOUT_SECS: u64 = 120;

/// Embedding batch duration above which a slow-operation warning is logged
/// (milliseconds).
pub const SLOW_EMBED_MS: u64 = 5000;
