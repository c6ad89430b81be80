//! # canonry-match
//!
//! In-memory similarity index for canonry.
//!
//! This crate provides exact top-K nearest-neighbor retrieval over the
//! reference registry's embeddings:
//! - Corpus vectors unit-normalized once at build time
//! - Cosine similarity as a dot product over normalized vectors
//! - Stable tie-break by corpus insertion order
//!
//! Brute-force scan is the reference semantics. An approximate index would
//! be an optimization, not a behavioral change, and is deliberately absent:
//! top-K results must be exact and deterministic.

pub mod index;
pub mod scoring;

// Re-export core types
pub use canonry_core::{MatchResult, RankedCandidate};

pub use index::SimilarityIndex;
pub use scoring::{cosine_similarity, unit_normalize};
