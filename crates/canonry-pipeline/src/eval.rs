//! Accuracy scoring of match results against known identities.
//!
//! Two flavors, kept deliberately distinct:
//! - `accuracy` over augmented variants (every variant knows its origin):
//!   robustness to the synthetic noise model, a sanity check only.
//! - `hit_rate` over raw records that carry a ground-truth label, scored on
//!   the final (threshold-filtered) predictions.
//!
//! Empty input is an error, never a silent NaN.

use canonry_core::{Error, MatchResult, Result};

/// Fraction of results whose rank-1 candidate matches the expected id.
///
/// `results` and `expected` are index-aligned. A result with no candidates
/// counts as a miss.
pub fn accuracy(results: &[MatchResult], expected: &[String]) -> Result<f64> {
    if results.is_empty() {
        return Err(Error::EmptyDataset(
            "no match results to score".to_string(),
        ));
    }
    if results.len() != expected.len() {
        return Err(Error::InvalidInput(format!(
            "{} match results for {} expected ids",
            results.len(),
            expected.len()
        )));
    }

    let hits = results
        .iter()
        .zip(expected.iter())
        .filter(|(result, want)| {
            result
                .resolved()
                .map(|c| &c.entity_id == *want)
                .unwrap_or(false)
        })
        .count();

    Ok(hits as f64 / results.len() as f64)
}

/// Fraction of labeled rows whose final prediction equals the label.
///
/// `pairs` holds (prediction, ground truth); a `None` prediction counts as
/// a miss (the matcher declined rather than guessed).
pub fn hit_rate(pairs: &[(Option<String>, String)]) -> Result<f64> {
    if pairs.is_empty() {
        return Err(Error::EmptyDataset("no labeled rows to score".to_string()));
    }

    let hits = pairs
        .iter()
        .filter(|(predicted, want)| predicted.as_deref() == Some(want.as_str()))
        .count();

    Ok(hits as f64 / pairs.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use canonry_core::RankedCandidate;

    fn result(query_index: usize, entity_id: &str) -> MatchResult {
        MatchResult {
            query_index,
            candidates: vec![RankedCandidate {
                corpus_index: 0,
                entity_id: entity_id.to_string(),
                score: 0.9,
            }],
        }
    }

    #[test]
    fn test_perfect_recall_is_one() {
        let results = vec![result(0, "1"), result(1, "2")];
        let expected = vec!["1".to_string(), "2".to_string()];
        assert_eq!(accuracy(&results, &expected).unwrap(), 1.0);
    }

    #[test]
    fn test_single_entity_single_variant() {
        let results = vec![result(0, "1")];
        let expected = vec!["1".to_string()];
        assert_eq!(accuracy(&results, &expected).unwrap(), 1.0);
    }

    #[test]
    fn test_fractional_accuracy() {
        let results = vec![result(0, "1"), result(1, "9"), result(2, "3"), result(3, "9")];
        let expected = vec![
            "1".to_string(),
            "2".to_string(),
            "3".to_string(),
            "4".to_string(),
        ];
        assert_eq!(accuracy(&results, &expected).unwrap(), 0.5);
    }

    #[test]
    fn test_empty_results_is_an_error() {
        let err = accuracy(&[], &[]).unwrap_err();
        assert!(matches!(err, Error::EmptyDataset(_)));
    }

    #[test]
    fn test_misaligned_inputs_rejected() {
        let results = vec![result(0, "1")];
        let err = accuracy(&results, &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_candidateless_result_is_a_miss() {
        let results = vec![MatchResult {
            query_index: 0,
            candidates: vec![],
        }];
        let expected = vec!["1".to_string()];
        assert_eq!(accuracy(&results, &expected).unwrap(), 0.0);
    }

    #[test]
    fn test_hit_rate_counts_declined_predictions_as_misses() {
        let pairs = vec![
            (Some("1".to_string()), "1".to_string()),
            (None, "2".to_string()),
        ];
        assert_eq!(hit_rate(&pairs).unwrap(), 0.5);
    }

    #[test]
    fn test_hit_rate_empty_is_an_error() {
        let err = hit_rate(&[]).unwrap_err();
        assert!(matches!(err, Error::EmptyDataset(_)));
    }
}
