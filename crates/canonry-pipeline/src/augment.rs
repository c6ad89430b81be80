//! Synthetic noise augmentation of canonical titles.
//!
//! No labeled noisy data exists for the raw input, so matching quality is
//! estimated against variants we generate ourselves: each canonical title
//! is perturbed by a few random character edits, and since every variant
//! knows its origin entity the matcher's output can be scored exactly.
//!
//! Variants measure robustness to *this* noise model only. That makes the
//! resulting train accuracy a sanity check, not a real-world quality
//! metric.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use canonry_core::{defaults, AugmentedVariant, ReferenceEntity};

/// Characters drawn for insertions and substitutions. Latin and Cyrillic,
/// matching the charset that survives normalization.
const EDIT_CHARS: &str = "abcdefghijklmnopqrstuvwxyzабвгдежзийклмнопрстуфхцчшщъыьэюя0123456789";

/// Configuration for the augmenter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AugmentConfig {
    /// Variants generated per reference entity.
    #[serde(default = "default_count")]
    pub count: usize,
    /// Minimum character edits per variant.
    #[serde(default = "default_min_edits")]
    pub min_edits: usize,
    /// Maximum character edits per variant.
    #[serde(default = "default_max_edits")]
    pub max_edits: usize,
    /// RNG seed. `None` draws OS entropy; a fixed seed makes runs
    /// reproducible.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_count() -> usize {
    defaults::AUGMENT_COUNT
}

fn default_min_edits() -> usize {
    defaults::AUGMENT_MIN_EDITS
}

fn default_max_edits() -> usize {
    defaults::AUGMENT_MAX_EDITS
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            min_edits: default_min_edits(),
            max_edits: default_max_edits(),
            seed: None,
        }
    }
}

/// Generates noisy variants of canonical titles by random character edits:
/// insertion, deletion, substitution, or transposition at random positions.
pub struct Augmenter {
    rng: StdRng,
    config: AugmentConfig,
    edit_chars: Vec<char>,
}

impl Augmenter {
    pub fn new(config: AugmentConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            config,
            edit_chars: EDIT_CHARS.chars().collect(),
        }
    }

    /// Produce exactly `count` variants of one entity's canonical title.
    ///
    /// Each variant is an independent perturbation; duplicates across
    /// variants are permitted and deliberately not removed.
    pub fn variants(&mut self, entity: &ReferenceEntity) -> Vec<AugmentedVariant> {
        (0..self.config.count)
            .map(|_| AugmentedVariant {
                origin_entity_id: entity.entity_id.clone(),
                origin_title: entity.canonical_title.clone(),
                text: self.perturb(&entity.canonical_title),
            })
            .collect()
    }

    /// Produce variants for every entity in registry order.
    pub fn variants_for_all(&mut self, entities: &[ReferenceEntity]) -> Vec<AugmentedVariant> {
        entities.iter().flat_map(|e| self.variants(e)).collect()
    }

    fn random_char(&mut self) -> char {
        self.edit_chars[self.rng.gen_range(0..self.edit_chars.len())]
    }

    fn perturb(&mut self, text: &str) -> String {
        let mut chars: Vec<char> = text.chars().collect();
        let max = self.config.max_edits.max(self.config.min_edits);
        let edits = self.rng.gen_range(self.config.min_edits..=max);

        for _ in 0..edits {
            match self.rng.gen_range(0..4u8) {
                // Deletion; skipped for very short strings so variants
                // never collapse to empty.
                0 if chars.len() > 1 => {
                    let pos = self.rng.gen_range(0..chars.len());
                    chars.remove(pos);
                }
                1 if !chars.is_empty() => {
                    let pos = self.rng.gen_range(0..chars.len());
                    let replacement = self.random_char();
                    chars[pos] = replacement;
                }
                2 if chars.len() > 1 => {
                    let pos = self.rng.gen_range(0..chars.len() - 1);
                    chars.swap(pos, pos + 1);
                }
                // Insertion, and the fallback when the string is too short
                // for the other edits.
                _ => {
                    let pos = self.rng.gen_range(0..=chars.len());
                    let inserted = self.random_char();
                    chars.insert(pos, inserted);
                }
            }
        }

        chars.into_iter().collect()
    }
}
