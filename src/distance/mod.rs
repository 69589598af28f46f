//! Distance spaces and SIMD-dispatched kernels.
//!
//! A [`Kernel`] resolves its function pointers once, at construction, from
//! the requested [`SimdTier`] and the running CPU's capabilities — the
//! same `OnceLock`-free, resolve-once-then-branch-free dispatch shape the
//! teacher uses in its global dispatch tables, scoped here to one index
//! instance instead of a process-wide static since tier selection is a
//! per-`IndexConfig` choice.

mod avx512;
mod scalar;
mod wide_simd;

use crate::error::{Error, Result};

/// Which distance space an index is built over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceKind {
    /// Squared Euclidean (L2) distance.
    Euclidean,
    /// `1 - cos(a, b)`, computed as `1 - <â, b̂>` on vectors normalized to
    /// unit length at push/query time.
    Angular,
    /// `1 - <a, b>`, computed on the raw vectors with no normalization.
    InnerProduct,
}

/// SIMD instruction-set tier for distance kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimdTier {
    /// Scalar fallback, no SIMD.
    None,
    /// 4-wide `f32` lanes (SSE2 on x86_64, NEON elsewhere via `wide`).
    Sse,
    /// 8-wide `f32` lanes (AVX2 on x86_64, paired NEON elsewhere via `wide`).
    Avx,
    /// 16-wide `f32` lanes, raw AVX-512F intrinsics. x86_64 only.
    Avx512,
    /// Resolve to the widest tier the running CPU supports.
    Best,
}

fn tier_supported(tier: SimdTier) -> bool {
    match tier {
        SimdTier::None => true,
        SimdTier::Sse => true,
        #[cfg(target_arch = "x86_64")]
        SimdTier::Avx => is_x86_feature_detected!("avx2"),
        #[cfg(target_arch = "aarch64")]
        SimdTier::Avx => true,
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        SimdTier::Avx => false,
        #[cfg(target_arch = "x86_64")]
        SimdTier::Avx512 => is_x86_feature_detected!("avx512f"),
        #[cfg(not(target_arch = "x86_64"))]
        SimdTier::Avx512 => false,
        SimdTier::Best => true,
    }
}

fn best_supported_tier() -> SimdTier {
    for tier in [SimdTier::Avx512, SimdTier::Avx, SimdTier::Sse] {
        if tier_supported(tier) {
            return tier;
        }
    }
    SimdTier::None
}

type DistFn = fn(&[f32], &[f32]) -> f32;

/// A pair of distance kernels (squared Euclidean, `1 - dot`) resolved for
/// one concrete [`SimdTier`].
pub struct Kernel {
    euclid: DistFn,
    inner: DistFn,
    tier: SimdTier,
}

impl Kernel {
    /// Resolves `requested` against the running CPU and builds a `Kernel`.
    ///
    /// `Best` always succeeds, resolving to the widest supported tier. Any
    /// other explicit tier that the CPU does not support returns
    /// [`Error::UnsupportedSimdTier`].
    pub fn build(requested: SimdTier, dim: usize) -> Result<Self> {
        let resolved = match requested {
            SimdTier::Best => best_supported_tier(),
            other if tier_supported(other) => other,
            other => return Err(Error::UnsupportedSimdTier(other)),
        };
        let (euclid, inner): (DistFn, DistFn) = match resolved {
            SimdTier::None => (scalar::squared_euclidean, scalar::one_minus_dot),
            SimdTier::Sse => (wide_simd::squared_euclidean_sse, wide_simd::one_minus_dot_sse),
            SimdTier::Avx => (wide_simd::squared_euclidean_avx, wide_simd::one_minus_dot_avx),
            SimdTier::Avx512 => (avx512::squared_euclidean, avx512::one_minus_dot),
            SimdTier::Best => unreachable!("resolved above"),
        };
        let lanes = match resolved {
            SimdTier::None => 1,
            SimdTier::Sse => 4,
            SimdTier::Avx => 8,
            SimdTier::Avx512 => 16,
            SimdTier::Best => unreachable!(),
        };
        tracing::debug!(
            tier = ?resolved,
            dim,
            remainder = dim % lanes,
            "resolved SIMD tier"
        );
        Ok(Self { euclid, inner, tier: resolved })
    }

    /// The tier actually resolved, after `Best`/capability resolution.
    #[must_use]
    pub fn resolved_tier(&self) -> SimdTier {
        self.tier
    }

    /// Computes squared Euclidean distance.
    #[must_use]
    pub fn squared_euclidean(&self, a: &[f32], b: &[f32]) -> f32 {
        (self.euclid)(a, b)
    }

    /// Computes `1 - <a, b>`.
    #[must_use]
    pub fn one_minus_dot(&self, a: &[f32], b: &[f32]) -> f32 {
        (self.inner)(a, b)
    }

    /// Computes distance in `kind`'s space. Callers using `Angular` are
    /// responsible for normalizing `a`/`b` beforehand (see
    /// [`crate::vector_store::VectorStore`]).
    #[must_use]
    pub fn distance(&self, kind: SpaceKind, a: &[f32], b: &[f32]) -> f32 {
        match kind {
            SpaceKind::Euclidean => self.squared_euclidean(a, b),
            SpaceKind::Angular | SpaceKind::InnerProduct => self.one_minus_dot(a, b),
        }
    }
}
