//! Adjacency storage: one length-prefixed `u32` region per (element, layer).
//!
//! Every region is laid out `[len, n0, n1, ..., n_{cap-1}]`; `len` is the
//! number of live neighbor slots, the rest is spare capacity. Two backends
//! implement [`ConnectionBackend`]: [`single::SingleWriterConnections`] for
//! the sequential builder (no locking) and [`multi::MultiWriterConnections`]
//! for the parallel builder (per-element locking, copy-on-read).

mod multi;
mod single;

pub use multi::MultiWriterConnections;
pub use single::SingleWriterConnections;

/// Storage for an HNSW graph's adjacency lists.
///
/// Implementors own both the base layer (preallocated to
/// `max_elem_count * (m_max0 + 1)`, per spec) and the lazily-allocated
/// upper layers.
pub trait ConnectionBackend {
    /// Builds storage for up to `max_elem_count` elements, base-layer cap
    /// `m_max0`.
    fn init(max_elem_count: u32, m_max0: usize) -> Self
    where
        Self: Sized;

    /// Ensures `id` has a region allocated at `layer` with room for `cap`
    /// neighbors, allocating it (zero-initialized) if this is the first
    /// access. Layer 0 is always already allocated; this is a no-op there.
    fn ensure_layer(&self, id: u32, layer: usize, cap: usize);

    /// Copies out `id`'s neighbor list at `layer`.
    fn read_neighbors(&self, id: u32, layer: usize) -> Vec<u32>;

    /// Overwrites `id`'s neighbor list at `layer`. `neighbors.len()` must
    /// not exceed the capacity passed to the matching `ensure_layer` call
    /// (or `m_max0` for layer 0).
    fn write_neighbors(&self, id: u32, layer: usize, neighbors: &[u32]);
}

/// Writes `[len, neighbors...]` into `region`, zero-padding the rest.
/// `region.len()` must be `>= neighbors.len() + 1`.
pub(crate) fn encode(region: &mut [u32], neighbors: &[u32]) {
    region[0] = neighbors.len() as u32;
    region[1..=neighbors.len()].copy_from_slice(neighbors);
    for slot in &mut region[1 + neighbors.len()..] {
        *slot = 0;
    }
}

/// Reads the live neighbor slots out of a `[len, neighbors...]` region.
pub(crate) fn decode(region: &[u32]) -> Vec<u32> {
    let len = region[0] as usize;
    region[1..=len].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_decode_round_trips() {
        let mut region = vec![0u32; 5];
        encode(&mut region, &[7, 2, 9]);
        assert_eq!(region[0], 3);
        assert_eq!(decode(&region), vec![7, 2, 9]);
    }

    #[test]
    fn encode_zero_pads_beyond_len() {
        let mut region = vec![99u32; 5];
        encode(&mut region, &[1]);
        assert_eq!(region, vec![1, 1, 0, 0, 0]);
    }
}
