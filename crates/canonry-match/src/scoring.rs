//! Vector similarity primitives.

use canonry_core::Embedding;

/// Cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched lengths, empty, or zero-magnitude inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Scale a vector to unit length. Zero vectors are returned unchanged so
/// they score 0.0 against everything instead of producing NaN.
pub fn unit_normalize(v: &Embedding) -> Embedding {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        v.clone()
    } else {
        v.iter().map(|x| x / norm).collect()
    }
}
