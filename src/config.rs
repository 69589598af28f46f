//! Index configuration.

use crate::distance::{SimdTier, SpaceKind};
use crate::error::{Error, Result};

/// Parameters controlling graph shape, search quality, and runtime.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Vector dimensionality. Every pushed vector must have exactly this
    /// length.
    pub dim: usize,
    /// Distance space the index is built over.
    pub space_kind: SpaceKind,
    /// Maximum bidirectional connections per element on layers above the
    /// base layer. The base layer uses `2 * m_max`.
    pub m_max: usize,
    /// Candidate list size during construction (`efConstruction`).
    pub ef_construction: usize,
    /// Upper bound on elements the index will ever hold; sizes the base
    /// layer's preallocated connection arena.
    pub max_elem_count: u32,
    /// Seed for the deterministic level generator.
    pub seed: u64,
    /// Requested SIMD tier for distance kernels.
    pub simd_tier: SimdTier,
    /// Worker count for the parallel builder. Unused by the sequential one.
    pub workers: usize,
}

impl IndexConfig {
    /// Builds a config for the sequential (single-threaded) index, with
    /// `workers` fixed at `1` and SIMD tier `Best`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `dim == 0`, `m_max < 2`,
    /// `ef_construction == 0`, or `max_elem_count == 0`.
    pub fn new(
        dim: usize,
        space_kind: SpaceKind,
        m_max: usize,
        ef_construction: usize,
        max_elem_count: u32,
        seed: u64,
    ) -> Result<Self> {
        Self::with_workers(
            dim,
            space_kind,
            m_max,
            ef_construction,
            max_elem_count,
            seed,
            SimdTier::Best,
            1,
        )
    }

    /// Builds a config for the parallel builder with an explicit worker
    /// count and SIMD tier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] under the same conditions as [`Self::new`],
    /// plus when `workers == 0`.
    #[allow(clippy::too_many_arguments)]
    pub fn with_workers(
        dim: usize,
        space_kind: SpaceKind,
        m_max: usize,
        ef_construction: usize,
        max_elem_count: u32,
        seed: u64,
        simd_tier: SimdTier,
        workers: usize,
    ) -> Result<Self> {
        if dim == 0 {
            return Err(Error::Config("dim must be non-zero".into()));
        }
        if m_max < 2 {
            return Err(Error::Config("m_max must be at least 2".into()));
        }
        if ef_construction == 0 {
            return Err(Error::Config("ef_construction must be non-zero".into()));
        }
        if max_elem_count == 0 {
            return Err(Error::Config("max_elem_count must be non-zero".into()));
        }
        if workers == 0 {
            return Err(Error::Config("workers must be at least 1".into()));
        }
        Ok(Self {
            dim,
            space_kind,
            m_max,
            ef_construction,
            max_elem_count,
            seed,
            simd_tier,
            workers,
        })
    }

    /// Base-layer connection cap (`2 * m_max`, per spec.md §4).
    #[must_use]
    pub fn m_max0(&self) -> usize {
        self.m_max * 2
    }

    /// `1 / ln(m_max)`, the level generator's exponential-distribution
    /// scale factor.
    #[must_use]
    pub fn level_mult(&self) -> f64 {
        1.0 / (self.m_max as f64).ln()
    }
}
