//! Unlocked connection storage for the sequential builder.

use std::cell::RefCell;

use super::{decode, encode, ConnectionBackend};

/// Adjacency storage with no internal locking, for single-threaded
/// construction. Base layer is one flat `Vec<u32>`; upper layers are a
/// per-element `Vec` of lazily-allocated regions, indexed by `layer - 1`.
pub struct SingleWriterConnections {
    m_max0: usize,
    base: RefCell<Vec<u32>>,
    upper: RefCell<Vec<Vec<Vec<u32>>>>,
}

impl ConnectionBackend for SingleWriterConnections {
    fn init(max_elem_count: u32, m_max0: usize) -> Self {
        let base = vec![0u32; max_elem_count as usize * (m_max0 + 1)];
        let upper = vec![Vec::new(); max_elem_count as usize];
        Self { m_max0, base: RefCell::new(base), upper: RefCell::new(upper) }
    }

    fn ensure_layer(&self, id: u32, layer: usize, cap: usize) {
        if layer == 0 {
            return;
        }
        let mut upper = self.upper.borrow_mut();
        let layers = &mut upper[id as usize];
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
            let base = self.base.borrow();
            let off = id as usize * (self.m_max0 + 1);
            decode(&base[off..off + self.m_max0 + 1])
        } else {
            let upper = self.upper.borrow();
            match upper[id as usize].get(layer - 1) {
                Some(region) if !region.is_empty() => decode(region),
                _ => Vec::new(),
            }
        }
    }

    fn write_neighbors(&self, id: u32, layer: usize, neighbors: &[u32]) {
        if layer == 0 {
            let mut base = self.base.borrow_mut();
            let off = id as usize * (self.m_max0 + 1);
            encode(&mut base[off..off + self.m_max0 + 1], neighbors);
        } else {
            let mut upper = self.upper.borrow_mut();
            let region = &mut upper[id as usize][layer - 1];
            encode(region, neighbors);
        }
    }
}
