//! Data model for the name-resolution pipeline.
//!
//! The reference registry is the single source of truth for canonical
//! identities; everything else points at it by `entity_id` and never
//! mutates it. Records are plain owned structs; pipeline stages take them
//! by value and return new collections, so each stage is independently
//! testable.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::normalize::normalize;
use crate::table::Table;

/// A fixed-length embedding vector, 1:1 with a piece of text.
pub type Embedding = Vec<f32>;

/// A canonical entity from the reference registry.
///
/// `canonical_title` is the matching key: the normalized name and region
/// joined by a single space. It is unique after deduplication; `entity_id`
/// is the immutable key consumers join against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntity {
    pub entity_id: String,
    pub name: String,
    pub region: String,
    pub canonical_title: String,
}

impl ReferenceEntity {
    /// Build an entity from raw field values. The canonical title is
    /// derived immediately so the struct is never half-initialized.
    pub fn new(
        entity_id: impl Into<String>,
        name: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let region = region.into();
        let canonical_title = Self::title_of(&name, &region);
        Self {
            entity_id: entity_id.into(),
            name,
            region,
            canonical_title,
        }
    }

    fn title_of(name: &str, region: &str) -> String {
        format!("{} {}", name, region).trim().to_string()
    }

    /// A copy with every field normalized and the canonical title rebuilt
    /// from the normalized name and region.
    pub fn normalized(&self) -> Self {
        let name = normalize(&self.name);
        let region = normalize(&self.region);
        let canonical_title = Self::title_of(&name, &region);
        Self {
            entity_id: normalize(&self.entity_id),
            name,
            region,
            canonical_title,
        }
    }

    /// Convert a loaded table into entities, validating the schema once.
    ///
    /// Required columns: `entity_id`, `name`, `region`.
    pub fn from_table(table: &Table) -> Result<Vec<Self>> {
        let id_col = table.require_column("entity_id", "reference")?;
        let name_col = table.require_column("name", "reference")?;
        let region_col = table.require_column("region", "reference")?;

        Ok(table
            .rows()
            .iter()
            .map(|row| Self::new(&row[id_col], &row[name_col], &row[region_col]))
            .collect())
    }
}

/// A raw input row to be resolved against the registry.
///
/// Has no identity beyond its content, so deduplication uses full-row
/// equality. `entity_id` is an optional ground-truth label used only for
/// evaluation; `extra` carries any additional caller columns through
/// unchanged, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawRecord {
    pub entity_id: Option<String>,
    pub name: String,
    pub extra: Vec<(String, String)>,
}

impl RawRecord {
    /// A copy with every field normalized.
    pub fn normalized(&self) -> Self {
        Self {
            entity_id: self.entity_id.as_deref().map(normalize),
            name: normalize(&self.name),
            extra: self
                .extra
                .iter()
                .map(|(k, v)| (k.clone(), normalize(v)))
                .collect(),
        }
    }

    /// Convert a loaded table into raw records, validating the schema once.
    ///
    /// Required column: `name`. `entity_id` is picked up when present; all
    /// other columns become passthrough extras.
    pub fn from_table(table: &Table) -> Result<Vec<Self>> {
        let name_col = table.require_column("name", "raw")?;
        let id_col = table.column("entity_id");

        let extra_cols: Vec<usize> = (0..table.headers().len())
            .filter(|&i| i != name_col && Some(i) != id_col)
            .collect();

        Ok(table
            .rows()
            .iter()
            .map(|row| Self {
                entity_id: id_col.map(|i| row[i].clone()).filter(|v| !v.is_empty()),
                name: row[name_col].clone(),
                extra: extra_cols
                    .iter()
                    .map(|&i| (table.headers()[i].clone(), row[i].clone()))
                    .collect(),
            })
            .collect())
    }
}

/// A synthetic noisy variant of a canonical title.
///
/// Exists only transiently for self-validation: the origin is known, so the
/// matcher's output can be scored without external labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AugmentedVariant {
    pub origin_entity_id: String,
    pub origin_title: String,
    pub text: String,
}

/// One corpus entry ranked against a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// Position of the entity in the corpus the index was built from.
    pub corpus_index: usize,
    pub entity_id: String,
    /// Cosine similarity in [-1, 1].
    pub score: f32,
}

/// Top-K candidates for a single query, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Position of the query in the batch it was searched with.
    pub query_index: usize,
    pub candidates: Vec<RankedCandidate>,
}

impl MatchResult {
    /// The resolved identity: the rank-1 candidate, if any.
    pub fn resolved(&self) -> Option<&RankedCandidate> {
        self.candidates.first()
    }
}
