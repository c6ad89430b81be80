//! Key-based deduplication.
//!
//! The reference registry is deduplicated by canonical title so the
//! similarity index holds at most one vector per canonical identity, keeping
//! rank-1 resolution unambiguous. Raw records are deduplicated by full-row
//! equality.

use std::collections::HashSet;
use std::hash::Hash;

/// Remove items with duplicate keys, keeping the first occurrence.
///
/// Order is otherwise preserved. Idempotent: deduping an already-deduped
/// sequence returns it unchanged.
pub fn dedup_by_key<T, K, F>(items: Vec<T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_occurrence_wins() {
        let items = vec![("a", 1), ("b", 2), ("a", 3), ("c", 4), ("b", 5)];
        let deduped = dedup_by_key(items, |(k, _)| *k);
        assert_eq!(deduped, vec![("a", 1), ("b", 2), ("c", 4)]);
    }

    #[test]
    fn test_order_preserved() {
        let items = vec![3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5];
        let deduped = dedup_by_key(items, |n| *n);
        assert_eq!(deduped, vec![3, 1, 4, 5, 9, 2, 6]);
    }

    #[test]
    fn test_idempotent() {
        let items = vec!["x", "y", "x", "z"];
        let once = dedup_by_key(items, |s| s.to_string());
        let twice = dedup_by_key(once.clone(), |s| s.to_string());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input() {
        let deduped: Vec<i32> = dedup_by_key(vec![], |n: &i32| *n);
        assert!(deduped.is_empty());
    }

    #[test]
    fn test_full_row_equality_key() {
        // Raw records dedupe on the whole row, not a single column.
        let items = vec![("alpha", "north"), ("alpha", "south"), ("alpha", "north")];
        let deduped = dedup_by_key(items, |row| *row);
        assert_eq!(deduped, vec![("alpha", "north"), ("alpha", "south")]);
    }
}
