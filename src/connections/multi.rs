//! Locked connection storage for the parallel builder.

use std::cell::UnsafeCell;

use parking_lot::Mutex;

use super::{decode, encode, ConnectionBackend};

/// Adjacency storage with one lock per element. The base layer is a flat
/// `UnsafeCell<Vec<u32>>` arena guarded by `base_locks[id]`; reads copy
/// out under the lock (`decode` allocates) rather than returning a
/// reference, so the lock never needs to outlive the call.
pub struct MultiWriterConnections {
    m_max0: usize,
    base: UnsafeCell<Vec<u32>>,
    base_locks: Vec<Mutex<()>>,
    upper: Vec<Mutex<Vec<Vec<u32>>>>,
}

// SAFETY: every access to `base` goes through `base_locks[id]`, and each
// element's row occupies a disjoint `m_max0 + 1`-word slice of the
// preallocated, never-resized arena, so concurrent access to different
// ids' rows is data-race-free.
unsafe impl Sync for MultiWriterConnections {}

impl ConnectionBackend for MultiWriterConnections {
    fn init(max_elem_count: u32, m_max0: usize) -> Self {
        let n = max_elem_count as usize;
        let base = vec![0u32; n * (m_max0 + 1)];
        let base_locks = (0..n).map(|_| Mutex::new(())).collect();
        let upper = (0..n).map(|_| Mutex::new(Vec::new())).collect();
        Self { m_max0, base: UnsafeCell::new(base), base_locks, upper }
    }

    fn ensure_layer(&self, id: u32, layer: usize, cap: usize) {
        if layer == 0 {
            return;
        }
        let mut layers = self.upper[id as usize].lock();
        while layers.len() < layer {
            layers.push(Vec::new());
        }
        let region = &mut layers[layer - 1];
        if region.is_empty() {
            *region = vec![0u32; cap + 1];
        }
    }

    fn read_neighbors(&self, id: u32, layer: usize) -> Vec<u32> {
        if layer == 0 {
            let _guard = self.base_locks[id as usize].lock();
            let off = id as usize * (self.m_max0 + 1);
            // SAFETY: `_guard` is the only path that touches this row, and
            // the row bounds are within the preallocated arena.
            let base = unsafe { &*self.base.get() };
            decode(&base[off..off + self.m_max0 + 1])
        } else {
            let layers = self.upper[id as usize].lock();
            match layers.get(layer - 1) {
                Some(region) if !region.is_empty() => decode(region),
                _ => Vec::new(),
            }
        }
    }

    fn write_neighbors(&self, id: u32, layer: usize, neighbors: &[u32]) {
        if layer == 0 {
            let _guard = self.base_locks[id as usize].lock();
            let off = id as usize * (self.m_max0 + 1);
            // SAFETY: see `read_neighbors`.
            let base = unsafe { &mut *self.base.get() };
            encode(&mut base[off..off + self.m_max0 + 1], neighbors);
        } else {
            let mut layers = self.upper[id as usize].lock();
            encode(&mut layers[layer - 1], neighbors);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn base_layer_round_trips() {
        let conns = MultiWriterConnections::init(10, 4);
        conns.write_neighbors(0, 0, &[1, 2, 3]);
        assert_eq!(conns.read_neighbors(0, 0), vec![1, 2, 3]);
    }

    #[test]
    fn upper_layer_lazy_allocation() {
        let conns = MultiWriterConnections::init(10, 4);
        assert_eq!(conns.read_neighbors(2, 1), Vec::<u32>::new());
        conns.ensure_layer(2, 1, 4);
        conns.write_neighbors(2, 1, &[9]);
        assert_eq!(conns.read_neighbors(2, 1), vec![9]);
    }

    #[test]
    fn concurrent_writes_to_disjoint_ids_do_not_corrupt() {
        let conns = MultiWriterConnections::init(100, 8);
        thread::scope(|scope| {
            for id in 0..50u32 {
                let conns = &conns;
                scope.spawn(move || {
                    conns.write_neighbors(id, 0, &[id, id + 1]);
                });
            }
        });
        for id in 0..50u32 {
            assert_eq!(conns.read_neighbors(id, 0), vec![id, id + 1]);
        }
    }
}
