//! # hnswx-core
//!
//! Approximate nearest-neighbor search over dense float vectors, built on
//! a Hierarchical Navigable Small World (HNSW) graph.
//!
//! Two builders share one search implementation: [`SequentialIndex`] is a
//! deterministic single-threaded builder (two runs with the same seed and
//! push order produce bitwise-identical graphs); [`ParallelIndex`] spreads
//! construction across a worker pool, trading bitwise reproducibility for
//! throughput while staying within 1% recall of the sequential build.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use hnswx_core::{IndexConfig, SequentialIndex, SpaceKind};
//!
//! let config = IndexConfig::new(128, SpaceKind::Angular, 16, 200, 10_000, 42)?;
//! let index = SequentialIndex::new(config)?;
//!
//! let id = index.push(&embedding)?;
//! let neighbors = index.query(&query_embedding, 10, 100)?;
//! ```
//!
//! Out of scope: deletion of inserted vectors, persistence, distributed
//! sharding, filtered search, and distance metrics beyond squared
//! Euclidean and inner-product-derived spaces.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod connections;
mod distance;
mod error;
mod heap;
mod index;
mod insert;
mod level_gen;
mod recall;
mod search;
mod vector_store;
mod visited;

pub use config::IndexConfig;
pub use distance::{SimdTier, SpaceKind};
pub use error::{Error, Result};
pub use index::{ParallelIndex, QueryResult, SequentialIndex};
pub use recall::recall;
