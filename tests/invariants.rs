//! Property-style sweeps over invariants the graph must hold regardless
//! of insertion order or vector content.

use hnswx_core::{IndexConfig, SequentialIndex, SpaceKind};
use proptest::prelude::*;

fn build(vectors: &[Vec<f32>], m_max: usize, seed: u64) -> SequentialIndex {
    let dim = vectors[0].len();
    let config = IndexConfig::new(dim, SpaceKind::Euclidean, m_max, 64, vectors.len() as u32 + 1, seed)
        .unwrap();
    let index = SequentialIndex::new(config).unwrap();
    for v in vectors {
        index.push(v).unwrap();
    }
    index
}

proptest! {
    /// Invariant: query results are ascending by distance, contain no
    /// duplicate ids, and every id is within the pushed range.
    #[test]
    fn query_results_are_ascending_unique_and_in_range(
        vectors in prop::collection::vec(prop::collection::vec(-100.0f32..100.0, 3), 5..40),
        seed in 0u64..1000,
    ) {
        let index = build(&vectors, 8, seed);
        let results = index.query(&vectors[0], 5, 40).unwrap();

        for pair in results.windows(2) {
            prop_assert!(pair[0].dist <= pair[1].dist);
        }
        let mut ids: Vec<u32> = results.iter().map(|r| r.id).collect();
        let before = ids.len();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len(), before);
        for r in &results {
            prop_assert!((r.id as usize) < vectors.len());
        }
    }

    /// Invariant: self-query at k=1 always returns the pushed element
    /// itself at distance (approximately) zero.
    #[test]
    fn self_query_at_k1_is_exact_match(
        vectors in prop::collection::vec(prop::collection::vec(-50.0f32..50.0, 4), 3..30),
        seed in 0u64..1000,
    ) {
        let index = build(&vectors, 8, seed);
        for (id, v) in vectors.iter().enumerate() {
            let results = index.query(v, 1, 50).unwrap();
            prop_assert_eq!(results[0].id, id as u32);
            prop_assert!(results[0].dist < 1e-3);
        }
    }

    /// Invariant: two sequential builds from the same seed and push order
    /// are bitwise reproducible.
    #[test]
    fn sequential_build_is_deterministic(
        vectors in prop::collection::vec(prop::collection::vec(-20.0f32..20.0, 3), 5..25),
        seed in 0u64..1000,
    ) {
        let a = build(&vectors, 6, seed);
        let b = build(&vectors, 6, seed);
        let query = &vectors[vectors.len() / 2];
        let ra = a.query(query, 5, 40).unwrap();
        let rb = b.query(query, 5, 40).unwrap();
        prop_assert_eq!(ra, rb);
    }
}
