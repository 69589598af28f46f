//! The two index builders: [`sequential::SequentialIndex`] (deterministic,
//! single-threaded) and [`parallel::ParallelIndex`] (worker pool), sharing
//! one query implementation.

mod parallel;
mod sequential;

pub use parallel::ParallelIndex;
pub use sequential::SequentialIndex;

use crate::connections::ConnectionBackend;
use crate::distance::Kernel;
use crate::heap::Node;
use crate::search::{search_lower, search_upper};
use crate::vector_store::VectorStore;

/// One result from a nearest-neighbor query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryResult {
    /// Element id.
    pub id: u32,
    /// Distance from the query, in the index's configured space.
    pub dist: f32,
}

/// Runs one query against the graph: greedy descent to the base layer
/// from `entry_id`/`entry_level`, then an `ef`-bounded beam search there,
/// truncated to the `k` nearest.
///
/// `query` is normalized in place if the store's space requires it.
pub(crate) fn query_one<B: ConnectionBackend>(
    store: &VectorStore,
    conns: &B,
    kernel: &Kernel,
    entry_id: u32,
    entry_level: usize,
    mut query: Vec<f32>,
    k: usize,
    ef: usize,
    elem_capacity: usize,
) -> Vec<QueryResult> {
    store.normalize_query(&mut query);
    let effective_ef = ef.max(k);

    let current = if entry_level > 0 {
        search_upper(store, conns, kernel, &query, entry_id, entry_level, 1)
    } else {
        entry_id
    };
    let entry_node = Node { dist: store.distance_to_query(kernel, current, &query), id: current };

    let w =
        search_lower(store, conns, kernel, &query, &[entry_node], 0, effective_ef, elem_capacity, true);
    let mut sorted = w.into_sorted_ascending();
    sorted.truncate(k);
    sorted.into_iter().map(|n| QueryResult { id: n.id, dist: n.dist }).collect()
}
