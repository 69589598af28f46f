//! Graph search primitives shared by construction and querying.

use crate::connections::ConnectionBackend;
use crate::distance::Kernel;
use crate::heap::{FarHeap, NearHeap, Node};
use crate::vector_store::VectorStore;
use crate::visited::VisitedSet;

/// Greedy single-path descent from `entry_id` at `from_layer` down to
/// `to_layer + 1`, returning the nearest element found at `to_layer + 1`
/// (the entry point handed to the next layer down). Used both above the
/// base layer during insertion and to find the base-layer entry point
/// during a query.
pub fn search_upper<B: ConnectionBackend>(
    store: &VectorStore,
    conns: &B,
    kernel: &Kernel,
    query: &[f32],
    entry_id: u32,
    from_layer: usize,
    to_layer: usize,
) -> u32 {
    let mut current = entry_id;
    let mut current_dist = store.distance_to_query(kernel, current, query);
    let mut layer = from_layer;
    loop {
        let mut improved = true;
        while improved {
            improved = false;
            for neighbor in conns.read_neighbors(current, layer) {
                let d = store.distance_to_query(kernel, neighbor, query);
                if d < current_dist {
                    current_dist = d;
                    current = neighbor;
                    improved = true;
                }
            }
        }
        if layer == to_layer {
            break;
        }
        layer -= 1;
    }
    current
}

/// `ef`-bounded beam search over `layer`, starting from `entry_points`.
/// Returns `W`, the `ef` closest elements found — always, on every
/// termination path; a dangling branch that skipped this in one variant
/// of the reference implementation is treated as a bug here, not a
/// feature.
///
/// `searching` is the reference implementation's stop-early flag: when
/// `false` (construction), the beam keeps expanding until `W` fills to
/// `ef` before a worse candidate can end the search; when `true` (query),
/// a candidate worse than the current farthest result ends the search
/// immediately even if `W` hasn't filled yet.
pub fn search_lower<B: ConnectionBackend>(
    store: &VectorStore,
    conns: &B,
    kernel: &Kernel,
    query: &[f32],
    entry_points: &[Node],
    layer: usize,
    ef: usize,
    elem_capacity: usize,
    searching: bool,
) -> FarHeap {
    debug_assert!(!entry_points.is_empty());

    let mut visited = VisitedSet::new(elem_capacity, entry_points[0].id);
    for ep in &entry_points[1..] {
        visited.mark(ep.id);
    }

    let mut candidates = NearHeap::new();
    let mut w = FarHeap::new();
    for &ep in entry_points {
        candidates.push(ep);
        w.push_bounded(ep, ef);
    }

    while let Some(c) = candidates.pop() {
        let worst = w.peek().map_or(f32::INFINITY, |n| n.dist);
        if (searching || w.len() == ef) && c.dist > worst {
            break;
        }
        for neighbor in conns.read_neighbors(c.id, layer) {
            if visited.mark(neighbor) {
                continue;
            }
            let d = store.distance_to_query(kernel, neighbor, query);
            let worst = w.peek().map_or(f32::INFINITY, |n| n.dist);
            if w.len() < ef || worst > d {
                let node = Node { dist: d, id: neighbor };
                candidates.push(node);
                w.push_bounded(node, ef);
            }
        }
    }
    w
}

/// Picks up to `m` neighbors out of `candidates`, using the plain
/// (non-extended, non-keep-pruned) HNSW selection heuristic: scan
/// candidates nearest-first (by `Node::dist`, assumed to already be each
/// candidate's distance to the query) and keep one only if it is closer
/// to the query than to every neighbor already kept. `candidates` need
/// not be sorted.
///
/// If `candidates` already has at most `m` entries, all of them are kept
/// nearest-first with no diversity pruning.
pub fn select_neighbors(
    store: &VectorStore,
    kernel: &Kernel,
    mut candidates: Vec<Node>,
    m: usize,
) -> Vec<u32> {
    candidates.sort();
    if candidates.len() <= m {
        return candidates.into_iter().map(|n| n.id).collect();
    }
    let mut result = Vec::with_capacity(m);
    for node in candidates {
        if result.len() >= m {
            break;
        }
        let dominated = result.iter().any(|&r| store.distance_between(kernel, r, node.id) < node.dist);
        if !dominated {
            result.push(node.id);
        }
    }
    result
}
