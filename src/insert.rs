//! Shared insertion pipeline, generic over the connection backend so the
//! sequential and parallel builders reuse one implementation.

use crate::config::IndexConfig;
use crate::connections::ConnectionBackend;
use crate::distance::Kernel;
use crate::heap::Node;
use crate::search::{search_lower, search_upper, select_neighbors};
use crate::vector_store::VectorStore;

/// Bootstraps the very first element: no search is possible with an empty
/// graph, so it simply gets empty neighbor regions at every layer up to
/// its assigned level. Returns the `(entry_id, entry_level)` this element
/// establishes.
pub fn insert_first<B: ConnectionBackend>(conns: &B, config: &IndexConfig, id: u32, level: usize) -> (u32, usize) {
    for lc in 0..=level {
        let cap = if lc == 0 { config.m_max0() } else { config.m_max };
        conns.ensure_layer(id, lc, cap);
        conns.write_neighbors(id, lc, &[]);
    }
    (id, level)
}

/// Inserts `id` (already pushed into `store` at `level`) into the graph,
/// given the entry point observed before this call.
///
/// Returns `Some((id, level))` if `level` exceeds `entry_level`, meaning
/// the caller should promote `id` to be the new global entry point; the
/// caller is responsible for making that promotion visible (trivial for
/// the sequential builder, mutex-guarded for the parallel one).
pub fn insert_element<B: ConnectionBackend>(
    store: &VectorStore,
    conns: &B,
    kernel: &Kernel,
    config: &IndexConfig,
    entry_id: u32,
    entry_level: usize,
    id: u32,
    level: usize,
) -> Option<(u32, usize)> {
    let query = store.get_vector(id);

    let current = if entry_level > level {
        search_upper(store, conns, kernel, query, entry_id, entry_level, level + 1)
    } else {
        entry_id
    };

    let top_common = level.min(entry_level);
    let mut entry_points =
        vec![Node { dist: store.distance_to_query(kernel, current, query), id: current }];

    for lc in (0..=top_common).rev() {
        let cap = if lc == 0 { config.m_max0() } else { config.m_max };
        let w = search_lower(
            store,
            conns,
            kernel,
            query,
            &entry_points,
            lc,
            config.ef_construction,
            config.max_elem_count as usize,
            false,
        );
        let w_nodes = w.into_sorted_ascending();
        let neighbors = select_neighbors(store, kernel, w_nodes.clone(), cap);

        conns.ensure_layer(id, lc, cap);
        conns.write_neighbors(id, lc, &neighbors);
        for &nb in &neighbors {
            add_bidirectional(store, conns, kernel, nb, id, lc, cap);
        }

        // The next layer down searches from the single nearest selected
        // neighbor, not the whole beam `W` (spec: `ep <- argmin_{n in R}
        // dist(n, q)`). `w_nodes` is sorted ascending and the nearest
        // candidate is never pruned by `select_neighbors` (an empty result
        // list can't dominate it), so it is always `neighbors[0]`.
        let nearest_id = neighbors[0];
        let nearest = w_nodes.iter().find(|n| n.id == nearest_id).copied().expect("selected neighbor came from w_nodes");
        entry_points = vec![nearest];
    }

    // Layers above the old entry level but at or below the new element's
    // level: `id` is the sole occupant up there until a future insert
    // connects to it.
    for lc in (entry_level + 1..=level).rev() {
        conns.ensure_layer(id, lc, config.m_max);
        conns.write_neighbors(id, lc, &[]);
    }

    (level > entry_level).then_some((id, level))
}

/// Adds `id` to `nb`'s neighbor list at `layer`, re-running neighbor
/// selection on `nb`'s side if that would push it over `cap`.
fn add_bidirectional<B: ConnectionBackend>(
    store: &VectorStore,
    conns: &B,
    kernel: &Kernel,
    nb: u32,
    id: u32,
    layer: usize,
    cap: usize,
) {
    conns.ensure_layer(nb, layer, cap);
    let mut nb_neighbors = conns.read_neighbors(nb, layer);
    if nb_neighbors.contains(&id) {
        return;
    }
    nb_neighbors.push(id);

    if nb_neighbors.len() > cap {
        let nb_vector = store.get_vector(nb);
        let candidates: Vec<Node> = nb_neighbors
            .iter()
            .map(|&n| Node { dist: store.distance_to_query(kernel, n, nb_vector), id: n })
            .collect();
        nb_neighbors = select_neighbors(store, kernel, candidates, cap);
    }
    conns.write_neighbors(nb, layer, &nb_neighbors);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connections::SingleWriterConnections;
    use crate::distance::{SimdTier, SpaceKind};

    fn cfg(max: u32) -> IndexConfig {
        IndexConfig::new(2, SpaceKind::Euclidean, 4, 20, max, 1).unwrap()
    }

    #[test]
    fn first_element_gets_empty_regions_and_becomes_entry() {
        let config = cfg(10);
        let conns = SingleWriterConnections::init(10, config.m_max0());
        let (entry_id, entry_level) = insert_first(&conns, &config, 0, 2);
        assert_eq!((entry_id, entry_level), (0, 2));
        assert_eq!(conns.read_neighbors(0, 0), Vec::<u32>::new());
        assert_eq!(conns.read_neighbors(0, 2), Vec::<u32>::new());
    }

    #[test]
    fn second_element_connects_bidirectionally_to_first() {
        let config = cfg(10);
        let store = VectorStore::new(2, SpaceKind::Euclidean, 10);
        let conns = SingleWriterConnections::init(10, config.m_max0());
        let kernel = Kernel::build(SimdTier::None, 2).unwrap();

        store.push_vector(0, &[0.0, 0.0]);
        let (entry_id, entry_level) = insert_first(&conns, &config, 0, 0);

        store.push_vector(1, &[1.0, 1.0]);
        let promotion =
            insert_element(&store, &conns, &kernel, &config, entry_id, entry_level, 1, 0);
        assert!(promotion.is_none());

        assert_eq!(conns.read_neighbors(0, 0), vec![1]);
        assert_eq!(conns.read_neighbors(1, 0), vec![0]);
    }

    #[test]
    fn higher_level_insert_is_reported_for_promotion() {
        let config = cfg(10);
        let store = VectorStore::new(2, SpaceKind::Euclidean, 10);
        let conns = SingleWriterConnections::init(10, config.m_max0());
        let kernel = Kernel::build(SimdTier::None, 2).unwrap();

        store.push_vector(0, &[0.0, 0.0]);
        let (entry_id, entry_level) = insert_first(&conns, &config, 0, 0);

        store.push_vector(1, &[1.0, 1.0]);
        let promotion =
            insert_element(&store, &conns, &kernel, &config, entry_id, entry_level, 1, 3);
        assert_eq!(promotion, Some((1, 3)));
        assert_eq!(conns.read_neighbors(1, 3), Vec::<u32>::new());
    }

    #[test]
    fn base_layer_cap_is_respected_on_bidirectional_overflow() {
        let config = IndexConfig::new(1, SpaceKind::Euclidean, 2, 20, 10, 1).unwrap();
        let store = VectorStore::new(1, SpaceKind::Euclidean, 10);
        let conns = SingleWriterConnections::init(10, config.m_max0());
        let kernel = Kernel::build(SimdTier::None, 1).unwrap();

        store.push_vector(0, &[0.0]);
        let (mut entry_id, mut entry_level) = insert_first(&conns, &config, 0, 0);

        for i in 1..6u32 {
            store.push_vector(i, &[i as f32]);
            if let Some((new_id, new_level)) =
                insert_element(&store, &conns, &kernel, &config, entry_id, entry_level, i, 0)
            {
                entry_id = new_id;
                entry_level = new_level;
            }
        }

        for i in 0..6u32 {
            assert!(conns.read_neighbors(i, 0).len() <= config.m_max0());
        }
    }
}
