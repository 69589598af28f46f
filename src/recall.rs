//! Recall measurement against ground-truth neighbor ids.

use crate::index::QueryResult;

/// Fraction of `found`'s top-k ids that appear in `ground_truth`'s
/// corresponding row, averaged over all queries.
///
/// `ground_truth` is a borrowed row-major buffer shaped
/// `(found.len(), k)`: row `i`'s true nearest neighbors are
/// `ground_truth[i * k..(i + 1) * k]`. No owning variant is exposed —
/// callers hold the ground-truth table themselves, typically produced by
/// a brute-force pass outside this crate.
///
/// # Panics
///
/// Panics if `ground_truth.len() != found.len() * k`.
#[must_use]
pub fn recall(found: &[Vec<QueryResult>], ground_truth: &[u32], k: usize) -> f64 {
    assert_eq!(
        ground_truth.len(),
        found.len() * k,
        "ground_truth must be shaped (found.len(), k)"
    );
    if found.is_empty() || k == 0 {
        return 0.0;
    }
    let mut hits = 0usize;
    for (i, results) in found.iter().enumerate() {
        let row = &ground_truth[i * k..(i + 1) * k];
        hits += results.iter().filter(|r| row.contains(&r.id)).count();
    }
    hits as f64 / (found.len() * k) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: u32) -> QueryResult {
        QueryResult { id, dist: 0.0 }
    }

    #[test]
    fn perfect_match_is_one() {
        let found = vec![vec![result(1), result(2), result(3)]];
        let gt = vec![1, 2, 3];
        assert_eq!(recall(&found, &gt, 3), 1.0);
    }

    #[test]
    fn no_overlap_is_zero() {
        let found = vec![vec![result(1), result(2)]];
        let gt = vec![9, 8];
        assert_eq!(recall(&found, &gt, 2), 0.0);
    }

    #[test]
    fn partial_overlap_averages_across_queries() {
        let found = vec![vec![result(1), result(2)], vec![result(3), result(4)]];
        let gt = vec![1, 9, 3, 4];
        // query 0: 1/2 hit, query 1: 2/2 hit -> 3 hits out of 4 total slots
        assert!((recall(&found, &gt, 2) - 0.75).abs() < 1e-9);
    }

    #[test]
    #[should_panic(expected = "shaped")]
    fn mismatched_shape_panics() {
        let found = vec![vec![result(1)]];
        recall(&found, &[1, 2], 1);
    }
}
