//! Deterministic single-threaded builder.

use std::cell::{Cell, RefCell};

use super::{query_one, QueryResult};
use crate::config::IndexConfig;
use crate::connections::{ConnectionBackend, SingleWriterConnections};
use crate::distance::Kernel;
use crate::error::{Error, Result};
use crate::insert::{insert_element, insert_first};
use crate::level_gen::LevelGenerator;
use crate::vector_store::VectorStore;

/// Single-threaded HNSW builder. Two runs with the same [`IndexConfig`]
/// (same seed) and the same push order produce bitwise-identical graphs.
pub struct SequentialIndex {
    config: IndexConfig,
    store: VectorStore,
    conns: SingleWriterConnections,
    kernel: Kernel,
    level_gen: RefCell<LevelGenerator>,
    entry: Cell<Option<(u32, usize)>>,
    count: Cell<u32>,
}

impl SequentialIndex {
    /// Builds an empty index from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedSimdTier`] if `config.simd_tier` is not
    /// supported by the running CPU.
    pub fn new(config: IndexConfig) -> Result<Self> {
        let kernel = Kernel::build(config.simd_tier, config.dim)?;
        let store = VectorStore::new(config.dim, config.space_kind, config.max_elem_count);
        let conns = SingleWriterConnections::init(config.max_elem_count, config.m_max0());
        let level_gen = RefCell::new(LevelGenerator::new(config.seed, config.level_mult()));
        tracing::info!(
            dim = config.dim,
            m_max = config.m_max,
            ef_construction = config.ef_construction,
            tier = ?kernel.resolved_tier(),
            "built sequential index"
        );
        Ok(Self { config, store, conns, kernel, level_gen, entry: Cell::new(None), count: Cell::new(0) })
    }

    /// Number of elements currently held.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.count.get()
    }

    /// Whether the index holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count.get() == 0
    }

    /// Inserts `vector`, returning its assigned element id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `vector.len()` does not match the
    /// configured dimension, or [`Error::Capacity`] if the index is full.
    pub fn push(&self, vector: &[f32]) -> Result<u32> {
        if vector.len() != self.config.dim {
            return Err(Error::Config(format!(
                "expected vector of length {}, got {}",
                self.config.dim,
                vector.len()
            )));
        }
        let count = self.count.get();
        if count >= self.config.max_elem_count {
            return Err(Error::Capacity { current: count, requested: 1, max: self.config.max_elem_count });
        }

        let id = count;
        self.store.push_vector(id, vector);
        let level = self.level_gen.borrow_mut().next_level();

        match self.entry.get() {
            None => {
                self.entry.set(Some(insert_first(&self.conns, &self.config, id, level)));
            }
            Some((entry_id, entry_level)) => {
                if let Some(promoted) = insert_element(
                    &self.store,
                    &self.conns,
                    &self.kernel,
                    &self.config,
                    entry_id,
                    entry_level,
                    id,
                    level,
                ) {
                    self.entry.set(Some(promoted));
                }
            }
        }

        self.count.set(count + 1);
        tracing::trace!(id, level, "inserted element");
        Ok(id)
    }

    /// Finds the `k` nearest neighbors of `query`, searching with
    /// candidate-list size `ef` (widened to `k` if smaller).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `k == 0` or `query.len()` does not
    /// match the configured dimension.
    pub fn query(&self, query: &[f32], k: usize, ef: usize) -> Result<Vec<QueryResult>> {
        if k == 0 {
            return Err(Error::Config("k must be non-zero".into()));
        }
        if query.len() != self.config.dim {
            return Err(Error::Config(format!(
                "expected query of length {}, got {}",
                self.config.dim,
                query.len()
            )));
        }
        let Some((entry_id, entry_level)) = self.entry.get() else {
            return Ok(Vec::new());
        };
        Ok(query_one(
            &self.store,
            &self.conns,
            &self.kernel,
            entry_id,
            entry_level,
            query.to_vec(),
            k,
            ef,
            self.config.max_elem_count as usize,
        ))
    }

    /// Runs [`Self::query`] over each row of `queries` in turn.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered, matching [`Self::query`]'s
    /// error conditions.
    pub fn query_batch(&self, queries: &[Vec<f32>], k: usize, ef: usize) -> Result<Vec<Vec<QueryResult>>> {
        queries.iter().map(|q| self.query(q, k, ef)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::SpaceKind;

    fn config() -> IndexConfig {
        IndexConfig::new(4, SpaceKind::Euclidean, 8, 50, 1000, 42).unwrap()
    }

    #[test]
    fn empty_index_query_returns_empty() {
        let index = SequentialIndex::new(config()).unwrap();
        assert_eq!(index.query(&[0.0, 0.0, 0.0, 0.0], 5, 10).unwrap(), Vec::new());
    }

    #[test]
    fn single_element_push_then_self_query() {
        let index = SequentialIndex::new(config()).unwrap();
        let id = index.push(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        let results = index.query(&[1.0, 2.0, 3.0, 4.0], 1, 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, id);
        assert!(results[0].dist.abs() < 1e-6);
    }

    #[test]
    fn query_results_ascending_and_capped_at_k() {
        let index = SequentialIndex::new(config()).unwrap();
        for i in 0..30u32 {
            index.push(&[i as f32, 0.0, 0.0, 0.0]).unwrap();
        }
        let results = index.query(&[0.0, 0.0, 0.0, 0.0], 5, 30).unwrap();
        assert_eq!(results.len(), 5);
        for pair in results.windows(2) {
            assert!(pair[0].dist <= pair[1].dist);
        }
        let mut ids: Vec<u32> = results.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn ef_below_k_behaves_as_ef_equal_k() {
        let index = SequentialIndex::new(config()).unwrap();
        for i in 0..20u32 {
            index.push(&[i as f32, 0.0, 0.0, 0.0]).unwrap();
        }
        let results = index.query(&[0.0, 0.0, 0.0, 0.0], 8, 1).unwrap();
        assert_eq!(results.len(), 8);
    }

    #[test]
    fn rejects_wrong_dimension_push() {
        let index = SequentialIndex::new(config()).unwrap();
        assert!(index.push(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn rejects_zero_k() {
        let index = SequentialIndex::new(config()).unwrap();
        index.push(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!(index.query(&[1.0, 2.0, 3.0, 4.0], 0, 10).is_err());
    }

    #[test]
    fn same_seed_same_order_is_bitwise_reproducible() {
        let a = SequentialIndex::new(config()).unwrap();
        let b = SequentialIndex::new(config()).unwrap();
        let vectors: Vec<Vec<f32>> =
            (0..50).map(|i| vec![i as f32 * 0.3, (i as f32).sin(), 1.0, -1.0]).collect();
        for v in &vectors {
            a.push(v).unwrap();
            b.push(v).unwrap();
        }
        let query = [5.0, 0.5, 1.0, -1.0];
        let ra = a.query(&query, 10, 50).unwrap();
        let rb = b.query(&query, 10, 50).unwrap();
        assert_eq!(ra, rb);
    }
}
