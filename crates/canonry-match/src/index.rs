//! Exact top-K similarity index over reference embeddings.

use tracing::{debug, instrument};

use canonry_core::{Embedding, Error, MatchResult, RankedCandidate, Result};

use crate::scoring::unit_normalize;

/// An immutable similarity index over the reference corpus.
///
/// Built once per run from the deduplicated registry's embeddings,
/// index-aligned with the entities they were computed from. Queries return
/// exact top-K candidates by cosine similarity; when scores are exactly
/// equal the earlier corpus entry ranks first, so repeated searches over
/// the same corpus are fully deterministic.
#[derive(Debug)]
pub struct SimilarityIndex {
    entity_ids: Vec<String>,
    /// Unit-normalized corpus vectors; cosine reduces to a dot product.
    vectors: Vec<Embedding>,
    dimension: usize,
}

impl SimilarityIndex {
    /// Build an index from entity ids and their embeddings.
    ///
    /// The two slices must be index-aligned and non-empty, and every vector
    /// must share one dimension.
    pub fn build(entity_ids: Vec<String>, embeddings: Vec<Embedding>) -> Result<Self> {
        if entity_ids.len() != embeddings.len() {
            return Err(Error::InvalidInput(format!(
                "{} entity ids for {} embeddings",
                entity_ids.len(),
                embeddings.len()
            )));
        }
        if embeddings.is_empty() {
            return Err(Error::EmptyDataset(
                "cannot build a similarity index over an empty corpus".to_string(),
            ));
        }

        let dimension = embeddings[0].len();
        if dimension == 0 {
            return Err(Error::InvalidInput(
                "corpus embeddings have zero dimension".to_string(),
            ));
        }
        if let Some(pos) = embeddings.iter().position(|v| v.len() != dimension) {
            return Err(Error::InvalidInput(format!(
                "corpus embedding {} has dimension {}, expected {}",
                pos,
                embeddings[pos].len(),
                dimension
            )));
        }

        let vectors = embeddings.iter().map(unit_normalize).collect();
        debug!(
            corpus_size = entity_ids.len(),
            dimension, "Similarity index built"
        );

        Ok(Self {
            entity_ids,
            vectors,
            dimension,
        })
    }

    /// Number of corpus entries.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// True when the index holds no vectors (never, post-build).
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Embedding dimension the index was built with.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Entity id at a corpus position.
    pub fn entity_id(&self, corpus_index: usize) -> Option<&str> {
        self.entity_ids.get(corpus_index).map(String::as_str)
    }

    /// Top-K corpus entries for one query, best first.
    pub fn search(&self, query: &Embedding, k: usize) -> Result<Vec<RankedCandidate>> {
        if k == 0 {
            return Err(Error::InvalidInput("top_k must be at least 1".to_string()));
        }
        if query.len() != self.dimension {
            return Err(Error::InvalidInput(format!(
                "query has dimension {}, index expects {}",
                query.len(),
                self.dimension
            )));
        }

        let query = unit_normalize(query);
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, v.iter().zip(query.iter()).map(|(x, y)| x * y).sum()))
            .collect();

        // Score descending; equal scores fall back to corpus insertion order.
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(corpus_index, score)| RankedCandidate {
                corpus_index,
                entity_id: self.entity_ids[corpus_index].clone(),
                score,
            })
            .collect())
    }

    /// Top-K candidates for a batch of queries, index-aligned with the
    /// input.
    #[instrument(skip(self, queries), fields(subsystem = "match", component = "index", op = "search_batch", corpus_size = self.len(), query_count = queries.len(), top_k = k))]
    pub fn search_batch(&self, queries: &[Embedding], k: usize) -> Result<Vec<MatchResult>> {
        queries
            .iter()
            .enumerate()
            .map(|(query_index, q)| {
                Ok(MatchResult {
                    query_index,
                    candidates: self.search(q, k)?,
                })
            })
            .collect()
    }
}
