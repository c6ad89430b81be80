//! The linear name-resolution pipeline.
//!
//! `Loaded → Normalized → Deduplicated → Augmented → Embedded → Matched →
//! Evaluated → Joined → Done`, no branching back-edges. Each stage consumes
//! only the previous stage's output; the first error aborts the run and is
//! wrapped with the stage name it surfaced in. There is no partial-result
//! fallback and no log-and-continue.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use canonry_core::{
    dedup_by_key, defaults, AugmentedVariant, EmbeddingBackend, Embedding, Error, RawRecord,
    ReferenceEntity, Result,
};
use canonry_match::SimilarityIndex;

use crate::augment::{AugmentConfig, Augmenter};
use crate::eval::{accuracy, hit_rate};

/// Pipeline stages, in execution order. Used for stage-tagged errors and
/// logging; the orchestrator itself is a straight line of function calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loaded,
    Normalized,
    Deduplicated,
    Augmented,
    Embedded,
    Matched,
    Evaluated,
    Joined,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Loaded => "loaded",
            Stage::Normalized => "normalized",
            Stage::Deduplicated => "deduplicated",
            Stage::Augmented => "augmented",
            Stage::Embedded => "embedded",
            Stage::Matched => "matched",
            Stage::Evaluated => "evaluated",
            Stage::Joined => "joined",
            Stage::Done => "done",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recognized pipeline options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Candidates considered per query; resolution always uses rank-1.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Augmentation settings (variant count, edit magnitude, seed).
    #[serde(default)]
    pub augment: AugmentConfig,
    /// Minimum rank-1 similarity to accept a prediction. `None` always
    /// takes rank-1; below-threshold rows keep null predicted fields
    /// rather than a forced guess.
    #[serde(default)]
    pub min_score: Option<f32>,
}

fn default_top_k() -> usize {
    defaults::TOP_K
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            augment: AugmentConfig::default(),
            min_score: None,
        }
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::Config("top_k must be at least 1".to_string()));
        }
        if self.augment.max_edits < self.augment.min_edits {
            return Err(Error::Config(format!(
                "max_edits ({}) is below min_edits ({})",
                self.augment.max_edits, self.augment.min_edits
            )));
        }
        Ok(())
    }
}

/// One raw row with resolved identity joined on.
///
/// Left-join semantics: every raw row survives; rows without an accepted
/// prediction keep `None` in both predicted fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub entity_id: Option<String>,
    pub name: String,
    pub extra: Vec<(String, String)>,
    pub predicted_entity_id: Option<String>,
    pub predicted_title: Option<String>,
}

/// Terminal output of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    /// Enriched raw rows, in (deduplicated) input order.
    pub records: Vec<EnrichedRecord>,
    /// Rank-1 recall over the synthetic variants. Robustness to the noise
    /// model only, not a real-world quality metric.
    pub train_accuracy: f64,
    /// Rank-1 accuracy over labeled raw rows; `None` when no row carries a
    /// label.
    pub test_accuracy: Option<f64>,
    /// Registry size after deduplication.
    pub reference_count: usize,
    /// Synthetic variants scored.
    pub variant_count: usize,
}

/// The pipeline orchestrator. Owns the configuration and the single shared
/// embedding backend for the run.
pub struct Pipeline {
    config: PipelineConfig,
    backend: Arc<dyn EmbeddingBackend>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, backend: Arc<dyn EmbeddingBackend>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, backend })
    }

    /// Run the full pipeline over a loaded registry and raw batch.
    #[instrument(skip_all, fields(subsystem = "pipeline", op = "run", model = %self.backend.model_name(), top_k = self.config.top_k))]
    pub async fn run(
        &self,
        reference: Vec<ReferenceEntity>,
        raw: Vec<RawRecord>,
    ) -> Result<PipelineOutcome> {
        let run_start = Instant::now();
        info!(
            stage = %Stage::Loaded,
            reference_rows = reference.len(),
            raw_rows = raw.len(),
            "Pipeline starting"
        );

        let (reference, raw) = self.normalize_stage(reference, raw);
        let (reference, raw) = self.dedup_stage(reference, raw)?;
        let variants = self.augment_stage(&reference)?;
        let (corpus, variant_vecs, raw_vecs) =
            self.embed_stage(&reference, &variants, &raw).await?;
        let (variant_results, raw_results) =
            self.match_stage(&reference, corpus, &variant_vecs, &raw_vecs)?;

        // Apply the acceptance threshold once; evaluation and the join both
        // see the same final predictions.
        let predictions: Vec<Option<(String, String)>> = raw_results
            .iter()
            .map(|result| {
                result
                    .resolved()
                    .filter(|c| self.config.min_score.map_or(true, |min| c.score >= min))
                    .map(|c| {
                        (
                            c.entity_id.clone(),
                            reference[c.corpus_index].canonical_title.clone(),
                        )
                    })
            })
            .collect();

        let (train_accuracy, test_accuracy) =
            self.evaluate_stage(&variants, &variant_results, &raw, &predictions)?;
        let records = self.join_stage(raw, predictions);

        info!(
            stage = %Stage::Done,
            duration_ms = run_start.elapsed().as_millis() as u64,
            result_count = records.len(),
            train_accuracy,
            "Pipeline complete"
        );

        Ok(PipelineOutcome {
            records,
            train_accuracy,
            test_accuracy,
            reference_count: reference.len(),
            variant_count: variants.len(),
        })
    }

    fn normalize_stage(
        &self,
        reference: Vec<ReferenceEntity>,
        raw: Vec<RawRecord>,
    ) -> (Vec<ReferenceEntity>, Vec<RawRecord>) {
        let start = Instant::now();
        let reference: Vec<_> = reference.iter().map(ReferenceEntity::normalized).collect();
        let raw: Vec<_> = raw.iter().map(RawRecord::normalized).collect();
        info!(
            stage = %Stage::Normalized,
            duration_ms = start.elapsed().as_millis() as u64,
            "Fields normalized"
        );
        (reference, raw)
    }

    fn dedup_stage(
        &self,
        reference: Vec<ReferenceEntity>,
        raw: Vec<RawRecord>,
    ) -> Result<(Vec<ReferenceEntity>, Vec<RawRecord>)> {
        let start = Instant::now();
        let before_ref = reference.len();
        let before_raw = raw.len();

        let reference = dedup_by_key(reference, |e| e.canonical_title.clone());
        let raw = dedup_by_key(raw, |r| r.clone());

        if reference.is_empty() {
            return Err(Error::EmptyDataset(
                "reference registry has no rows after deduplication".to_string(),
            )
            .at_stage(Stage::Deduplicated.as_str()));
        }
        if raw.is_empty() {
            return Err(Error::EmptyDataset(
                "raw input has no rows after deduplication".to_string(),
            )
            .at_stage(Stage::Deduplicated.as_str()));
        }

        info!(
            stage = %Stage::Deduplicated,
            duration_ms = start.elapsed().as_millis() as u64,
            reference_rows = reference.len(),
            reference_dropped = before_ref - reference.len(),
            raw_rows = raw.len(),
            raw_dropped = before_raw - raw.len(),
            "Duplicates removed"
        );
        Ok((reference, raw))
    }

    fn augment_stage(&self, reference: &[ReferenceEntity]) -> Result<Vec<AugmentedVariant>> {
        let start = Instant::now();
        let mut augmenter = Augmenter::new(self.config.augment.clone());
        let variants = augmenter.variants_for_all(reference);

        if variants.is_empty() {
            return Err(Error::EmptyDataset(
                "augmentation produced zero variants".to_string(),
            )
            .at_stage(Stage::Augmented.as_str()));
        }

        info!(
            stage = %Stage::Augmented,
            duration_ms = start.elapsed().as_millis() as u64,
            variant_count = variants.len(),
            "Variants generated"
        );
        Ok(variants)
    }

    async fn embed_stage(
        &self,
        reference: &[ReferenceEntity],
        variants: &[AugmentedVariant],
        raw: &[RawRecord],
    ) -> Result<(Vec<Embedding>, Vec<Embedding>, Vec<Embedding>)> {
        let stage = Stage::Embedded.as_str();
        let start = Instant::now();

        self.backend
            .ensure_available()
            .await
            .map_err(|e| e.at_stage(stage))?;

        let titles: Vec<String> = reference
            .iter()
            .map(|e| e.canonical_title.clone())
            .collect();
        let variant_texts: Vec<String> = variants.iter().map(|v| v.text.clone()).collect();
        let raw_names: Vec<String> = raw.iter().map(|r| r.name.clone()).collect();

        // The backend is not assumed reentrant; the three batches go
        // through it one at a time.
        let corpus = self
            .backend
            .embed_texts(&titles)
            .await
            .map_err(|e| e.at_stage(stage))?;
        let variant_vecs = self
            .backend
            .embed_texts(&variant_texts)
            .await
            .map_err(|e| e.at_stage(stage))?;
        let raw_vecs = self
            .backend
            .embed_texts(&raw_names)
            .await
            .map_err(|e| e.at_stage(stage))?;

        info!(
            stage = %Stage::Embedded,
            duration_ms = start.elapsed().as_millis() as u64,
            input_count = titles.len() + variant_texts.len() + raw_names.len(),
            "Embeddings computed"
        );
        Ok((corpus, variant_vecs, raw_vecs))
    }

    fn match_stage(
        &self,
        reference: &[ReferenceEntity],
        corpus: Vec<Embedding>,
        variant_vecs: &[Embedding],
        raw_vecs: &[Embedding],
    ) -> Result<(Vec<canonry_core::MatchResult>, Vec<canonry_core::MatchResult>)> {
        let stage = Stage::Matched.as_str();
        let start = Instant::now();

        let entity_ids: Vec<String> = reference.iter().map(|e| e.entity_id.clone()).collect();
        let index = SimilarityIndex::build(entity_ids, corpus).map_err(|e| e.at_stage(stage))?;

        let variant_results = index
            .search_batch(variant_vecs, self.config.top_k)
            .map_err(|e| e.at_stage(stage))?;
        let raw_results = index
            .search_batch(raw_vecs, self.config.top_k)
            .map_err(|e| e.at_stage(stage))?;

        info!(
            stage = %Stage::Matched,
            duration_ms = start.elapsed().as_millis() as u64,
            corpus_size = index.len(),
            query_count = variant_results.len() + raw_results.len(),
            "Nearest neighbors retrieved"
        );
        Ok((variant_results, raw_results))
    }

    fn evaluate_stage(
        &self,
        variants: &[AugmentedVariant],
        variant_results: &[canonry_core::MatchResult],
        raw: &[RawRecord],
        predictions: &[Option<(String, String)>],
    ) -> Result<(f64, Option<f64>)> {
        let stage = Stage::Evaluated.as_str();
        let start = Instant::now();

        let origins: Vec<String> = variants
            .iter()
            .map(|v| v.origin_entity_id.clone())
            .collect();
        let train_accuracy =
            accuracy(variant_results, &origins).map_err(|e| e.at_stage(stage))?;

        let labeled: Vec<(Option<String>, String)> = raw
            .iter()
            .zip(predictions.iter())
            .filter_map(|(record, prediction)| {
                record.entity_id.clone().map(|label| {
                    (prediction.as_ref().map(|(id, _)| id.clone()), label)
                })
            })
            .collect();
        let test_accuracy = if labeled.is_empty() {
            debug!("No labeled raw rows; test accuracy not computed");
            None
        } else {
            Some(hit_rate(&labeled).map_err(|e| e.at_stage(stage))?)
        };

        info!(
            stage = %Stage::Evaluated,
            duration_ms = start.elapsed().as_millis() as u64,
            train_accuracy,
            test_accuracy = test_accuracy.unwrap_or(f64::NAN),
            labeled_rows = labeled.len(),
            "Accuracy computed"
        );
        Ok((train_accuracy, test_accuracy))
    }

    fn join_stage(
        &self,
        raw: Vec<RawRecord>,
        predictions: Vec<Option<(String, String)>>,
    ) -> Vec<EnrichedRecord> {
        let start = Instant::now();
        let records: Vec<EnrichedRecord> = raw
            .into_iter()
            .zip(predictions)
            .map(|(record, prediction)| {
                let (predicted_entity_id, predicted_title) = match prediction {
                    Some((id, title)) => (Some(id), Some(title)),
                    None => (None, None),
                };
                EnrichedRecord {
                    entity_id: record.entity_id,
                    name: record.name,
                    extra: record.extra,
                    predicted_entity_id,
                    predicted_title,
                }
            })
            .collect();

        info!(
            stage = %Stage::Joined,
            duration_ms = start.elapsed().as_millis() as u64,
            result_count = records.len(),
            "Predictions joined onto raw rows"
        );
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Deduplicated.to_string(), "deduplicated");
        assert_eq!(Stage::Done.to_string(), "done");
    }

    #[test]
    fn test_config_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.top_k, defaults::TOP_K);
        assert_eq!(config.augment.count, defaults::AUGMENT_COUNT);
        assert!(config.min_score.is_none());
    }

    #[test]
    fn test_config_validation() {
        let bad_k = PipelineConfig {
            top_k: 0,
            ..PipelineConfig::default()
        };
        assert!(bad_k.validate().is_err());

        let bad_edits = PipelineConfig {
            augment: AugmentConfig {
                min_edits: 3,
                max_edits: 1,
                ..AugmentConfig::default()
            },
            ..PipelineConfig::default()
        };
        assert!(bad_edits.validate().is_err());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.top_k, defaults::TOP_K);

        let config: PipelineConfig =
            serde_json::from_str(r#"{"top_k": 3, "augment": {"count": 2, "seed": 9}}"#).unwrap();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.augment.count, 2);
        assert_eq!(config.augment.seed, Some(9));
    }
}
