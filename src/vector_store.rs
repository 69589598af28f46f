//! Contiguous vector storage.
//!
//! All vectors live in one preallocated buffer, `dim` floats per element,
//! indexed by element id. Sized to `max_elem_count` up front so the
//! backing `Vec` never reallocates — which is what lets concurrent writes
//! at disjoint ids be safe without a lock (see the `Sync` impl below).

use std::cell::UnsafeCell;

use crate::distance::{Kernel, SpaceKind};

/// Squared-norm floor below which a vector is treated as all-zero for
/// angular normalization, matching the original implementation's epsilon.
const NORMALIZE_EPSILON: f32 = 1e-30;

/// Contiguous, preallocated vector storage, one row of `dim` floats per
/// element id.
pub struct VectorStore {
    dim: usize,
    space_kind: SpaceKind,
    buffer: UnsafeCell<Vec<f32>>,
}

// SAFETY: `buffer` is preallocated to `max_elem_count * dim` at
// construction and never resized afterward, so writes through
// `push_vector` at distinct ids touch disjoint, non-overlapping memory
// ranges and never trigger a reallocation that could race with a
// concurrent reader. Callers (the parallel builder) are responsible for
// the id-disjointness half of that contract; this type only needs the
// "never reallocates" half to hold.
unsafe impl Sync for VectorStore {}

impl VectorStore {
    /// Allocates storage for up to `max_elem_count` vectors of `dim`
    /// floats each, zero-filled.
    #[must_use]
    pub fn new(dim: usize, space_kind: SpaceKind, max_elem_count: u32) -> Self {
        let buffer = vec![0.0_f32; dim * max_elem_count as usize];
        Self { dim, space_kind, buffer: UnsafeCell::new(buffer) }
    }

    /// Vector dimensionality.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Writes `vector` at `id`'s row, normalizing to unit length first if
    /// `space_kind` is [`SpaceKind::Angular`].
    ///
    /// # Panics
    ///
    /// Panics if `vector.len() != self.dim()`.
    pub fn push_vector(&self, id: u32, vector: &[f32]) {
        assert_eq!(vector.len(), self.dim, "vector dimension mismatch");
        let row = self.row_mut(id);
        row.copy_from_slice(vector);
        if self.space_kind == SpaceKind::Angular {
            normalize(row);
        }
    }

    /// Returns the stored row for `id`, already normalized if applicable.
    #[must_use]
    pub fn get_vector(&self, id: u32) -> &[f32] {
        self.row(id)
    }

    /// Computes the distance between `id`'s stored vector and `query`.
    ///
    /// If `space_kind` is `Angular`, `query` must already be normalized
    /// (callers normalize once per query, not once per comparison).
    #[must_use]
    pub fn distance_to_query(&self, kernel: &Kernel, id: u32, query: &[f32]) -> f32 {
        kernel.distance(self.space_kind, self.row(id), query)
    }

    /// Computes the distance between two stored elements.
    #[must_use]
    pub fn distance_between(&self, kernel: &Kernel, a: u32, b: u32) -> f32 {
        kernel.distance(self.space_kind, self.row(a), self.row(b))
    }

    /// Normalizes `query` in place if `space_kind` is `Angular`; a no-op
    /// otherwise. Callers should do this once before a search, not per
    /// comparison.
    pub fn normalize_query(&self, query: &mut [f32]) {
        if self.space_kind == SpaceKind::Angular {
            normalize(query);
        }
    }

    fn row(&self, id: u32) -> &[f32] {
        let off = id as usize * self.dim;
        // SAFETY: `off + dim` is within the preallocated buffer as long as
        // `id < max_elem_count`, which callers (the index layer) enforce
        // via `Error::Capacity` before ever handing out an id this large.
        unsafe {
            let ptr = (*self.buffer.get()).as_ptr().add(off);
            std::slice::from_raw_parts(ptr, self.dim)
        }
    }

    #[allow(clippy::mut_from_ref)]
    fn row_mut(&self, id: u32) -> &mut [f32] {
        let off = id as usize * self.dim;
        // SAFETY: see `row`; additionally, disjoint `id`s never alias
        // because each row owns a distinct `dim`-wide slice of the
        // preallocated buffer.
        unsafe {
            let ptr = (*self.buffer.get()).as_mut_ptr().add(off);
            std::slice::from_raw_parts_mut(ptr, self.dim)
        }
    }
}

fn normalize(v: &mut [f32]) {
    let norm_sq: f32 = v.iter().map(|x| x * x).sum();
    if norm_sq < NORMALIZE_EPSILON {
        return;
    }
    let inv_norm = 1.0 / norm_sq.sqrt();
    for x in v.iter_mut() {
        *x *= inv_norm;
    }
}
