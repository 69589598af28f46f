//! Multi-worker builder.
//!
//! True OS threads, not a thread pool crate: a `thread::scope` per
//! `push`/`query_batch` call, joined before the call returns. Workers pull
//! from a shared mutex-protected cursor; the vector store needs no lock
//! because ids are assigned disjointly before any worker touches them;
//! the connection store locks per element; the entry point is the one
//! globally shared mutable scalar, behind its own mutex. A worker holds
//! that mutex across its whole insertion whenever its draw could promote
//! the entry (`level > entry_level`), so no concurrent insert ever
//! observes a stale entry point or a half-applied promotion; a
//! non-promoting insertion releases the lock immediately and proceeds
//! unsynchronized, since it can't race on the entry point.

use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;

use parking_lot::Mutex;

use super::{query_one, QueryResult};
use crate::config::IndexConfig;
use crate::connections::{ConnectionBackend, MultiWriterConnections};
use crate::distance::Kernel;
use crate::error::{Error, Result};
use crate::insert::{insert_element, insert_first};
use crate::level_gen::LevelGenerator;
use crate::vector_store::VectorStore;

/// Multi-worker HNSW builder. Recall is within 1% of a [`super::SequentialIndex`]
/// built from the same data; bitwise reproducibility is not guaranteed,
/// since workers race to process the shared queue of elements.
pub struct ParallelIndex {
    config: IndexConfig,
    store: VectorStore,
    conns: MultiWriterConnections,
    kernel: Kernel,
    entry: Mutex<Option<(u32, usize)>>,
    count: AtomicU32,
}

impl ParallelIndex {
    /// Builds an empty index from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedSimdTier`] if `config.simd_tier` is not
    /// supported by the running CPU.
    pub fn new(config: IndexConfig) -> Result<Self> {
        let kernel = Kernel::build(config.simd_tier, config.dim)?;
        let store = VectorStore::new(config.dim, config.space_kind, config.max_elem_count);
        let conns = MultiWriterConnections::init(config.max_elem_count, config.m_max0());
        tracing::info!(
            dim = config.dim,
            m_max = config.m_max,
            ef_construction = config.ef_construction,
            workers = config.workers,
            tier = ?kernel.resolved_tier(),
            "built parallel index"
        );
        Ok(Self { config, store, conns, kernel, entry: Mutex::new(None), count: AtomicU32::new(0) })
    }

    /// Number of elements currently held.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }

    /// Whether the index holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts `vectors` using `config.workers` worker threads, returning
    /// the assigned element ids in input order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if any vector's length does not match the
    /// configured dimension, or [`Error::Capacity`] if the batch would
    /// exceed `max_elem_count`.
    pub fn push(&self, vectors: &[Vec<f32>]) -> Result<Vec<u32>> {
        let n = vectors.len();
        if n == 0 {
            return Ok(Vec::new());
        }
        for v in vectors {
            if v.len() != self.config.dim {
                return Err(Error::Config(format!(
                    "expected vector of length {}, got {}",
                    self.config.dim,
                    v.len()
                )));
            }
        }
        let base_count = self.count.load(Ordering::SeqCst);
        if base_count as usize + n > self.config.max_elem_count as usize {
            return Err(Error::Capacity {
                current: base_count,
                requested: n as u32,
                max: self.config.max_elem_count,
            });
        }

        // Bootstrap the very first element on this thread before workers
        // start, so there is always a valid entry point for them to race
        // against.
        let mut start = 0usize;
        {
            let mut entry = self.entry.lock();
            if entry.is_none() {
                let id = base_count;
                self.store.push_vector(id, &vectors[0]);
                let mut level_gen = LevelGenerator::new(self.config.seed, self.config.level_mult());
                let level = level_gen.next_level();
                *entry = Some(insert_first(&self.conns, &self.config, id, level));
                start = 1;
                tracing::trace!(id, level, "bootstrapped entry point");
            }
        }

        let cursor = Mutex::new(start..n);

        thread::scope(|scope| {
            for worker in 0..self.config.workers {
                let cursor = &cursor;
                let seed = self.config.seed.wrapping_add(worker as u64 + 1);
                scope.spawn(move || {
                    tracing::trace!(worker, "spawned insert worker");
                    let mut level_gen = LevelGenerator::new(seed, self.config.level_mult());
                    loop {
                        let idx = {
                            let mut cursor = cursor.lock();
                            cursor.next()
                        };
                        let Some(idx) = idx else { break };
                        let id = base_count + idx as u32;
                        self.store.push_vector(id, &vectors[idx]);
                        let level = level_gen.next_level();

                        // Acquire the entry mutex, read the current entry,
                        // and decide under that same lock whether this
                        // insertion could promote it. If it could, hold the
                        // lock across the whole insertion so no concurrent
                        // insert observes a stale entry or a partially
                        // applied promotion; otherwise release it before
                        // inserting, since a non-promoting insertion doesn't
                        // need to serialize against others.
                        let mut entry_guard = self.entry.lock();
                        let (entry_id, entry_level) = entry_guard.expect("entry bootstrapped");

                        if level > entry_level {
                            if let Some(candidate) = insert_element(
                                &self.store,
                                &self.conns,
                                &self.kernel,
                                &self.config,
                                entry_id,
                                entry_level,
                                id,
                                level,
                            ) {
                                *entry_guard = Some(candidate);
                            }
                        } else {
                            drop(entry_guard);
                            insert_element(
                                &self.store,
                                &self.conns,
                                &self.kernel,
                                &self.config,
                                entry_id,
                                entry_level,
                                id,
                                level,
                            );
                        }
                    }
                    tracing::trace!(worker, "insert worker joined");
                });
            }
        });

        self.count.fetch_add(n as u32, Ordering::SeqCst);
        Ok((0..n as u32).map(|i| base_count + i).collect())
    }

    /// Runs `config.workers` worker threads over `queries`, each pulling
    /// from a shared cursor; results are returned in input order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `k == 0` or any query's length does
    /// not match the configured dimension.
    pub fn query_batch(&self, queries: &[Vec<f32>], k: usize, ef: usize) -> Result<Vec<Vec<QueryResult>>> {
        if k == 0 {
            return Err(Error::Config("k must be non-zero".into()));
        }
        for q in queries {
            if q.len() != self.config.dim {
                return Err(Error::Config(format!(
                    "expected query of length {}, got {}",
                    self.config.dim,
                    q.len()
                )));
            }
        }

        let entry = *self.entry.lock();
        let Some((entry_id, entry_level)) = entry else {
            return Ok(vec![Vec::new(); queries.len()]);
        };

        let cursor = Mutex::new(0..queries.len());
        let results = Mutex::new(vec![Vec::new(); queries.len()]);

        thread::scope(|scope| {
            for worker in 0..self.config.workers {
                let cursor = &cursor;
                let results = &results;
                scope.spawn(move || {
                    tracing::trace!(worker, "spawned query worker");
                    loop {
                        let idx = {
                            let mut cursor = cursor.lock();
                            cursor.next()
                        };
                        let Some(idx) = idx else { break };
                        let out = query_one(
                            &self.store,
                            &self.conns,
                            &self.kernel,
                            entry_id,
                            entry_level,
                            queries[idx].clone(),
                            k,
                            ef,
                            self.config.max_elem_count as usize,
                        );
                        results.lock()[idx] = out;
                    }
                });
            }
        });

        Ok(results.into_inner())
    }
}
