//! # canonry-pipeline
//!
//! Batch orchestration for the canonry name-resolution pipeline.
//!
//! This crate provides:
//! - Synthetic noise augmentation of canonical titles (self-validation)
//! - Accuracy scoring of match results against known identities
//! - The linear pipeline orchestrator: normalize → dedup → augment →
//!   embed → match → evaluate → join
//! - The `canonry` CLI binary (CSV in/out wrapper around the pipeline)

pub mod augment;
pub mod eval;
pub mod pipeline;

// Re-export core types
pub use canonry_core::{Error, Result};

pub use augment::{AugmentConfig, Augmenter};
pub use eval::{accuracy, hit_rate};
pub use pipeline::{EnrichedRecord, Pipeline, PipelineConfig, PipelineOutcome, Stage};
