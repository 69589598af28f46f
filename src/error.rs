//! Error types for the HNSW engine.

use thiserror::Error;

/// Result type alias for HNSW operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or driving a
/// [`SequentialIndex`](crate::index::SequentialIndex) or
/// [`ParallelIndex`](crate::index::ParallelIndex).
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration: bad SIMD tier request, zero workers, `k == 0`, etc.
    #[error("configuration error: {0}")]
    Config(String),

    /// `push` would carry `elem_count` past `max_elem_count`.
    #[error("capacity exceeded: index holds {current}, max is {max}, push would add {requested}")]
    Capacity {
        /// Elements already present.
        current: u32,
        /// Elements the caller tried to add.
        requested: u32,
        /// Configured capacity.
        max: u32,
    },

    /// A requested SIMD tier is not supported by the running CPU.
    #[error("SIMD tier {0:?} is not supported on this CPU")]
    UnsupportedSimdTier(crate::distance::SimdTier),

    /// An invariant the engine relies on was found violated.
    ///
    /// This never fires from normal operation; it is used by reproducibility
    /// checks (two builds of the same seed/inputs must be bitwise identical)
    /// and other fatal consistency checks run by callers such as benchmarks.
    #[error("invariant violated: {0}")]
    Invariant(String),
}
