//! # canonry-core
//!
//! Core types, traits, and abstractions for the canonry name-resolution
//! pipeline.
//!
//! This crate provides the foundational data structures and trait
//! definitions that other canonry crates depend on:
//! - Typed records for the reference registry and raw input rows
//! - The `EmbeddingBackend` trait implemented by canonry-inference
//! - Field normalization and key-based deduplication
//! - Schema-checked tabular input
//! - The shared error taxonomy and structured-logging field constants

pub mod dedup;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod table;
pub mod traits;

// Re-export commonly used types at crate root
pub use dedup::dedup_by_key;
pub use error::{Error, Result};
pub use models::{
    AugmentedVariant, Embedding, MatchResult, RankedCandidate, RawRecord, ReferenceEntity,
};
pub use normalize::normalize;
pub use table::Table;
pub use traits::EmbeddingBackend;
