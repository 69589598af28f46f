//! AVX-512 tier kernels.
//!
//! `wide` has no portable 16-lane `f32` type, so this tier drops to raw
//! `std::arch::x86_64` intrinsics behind `#[target_feature]`, the same
//! pattern the teacher uses for its native AVX-512 kernel.

#[cfg(target_arch = "x86_64")]
mod x86 {
    use std::arch::x86_64::*;

    const LANES: usize = 16;

    #[target_feature(enable = "avx512f")]
    unsafe fn squared_euclidean_impl(a: &[f32], b: &[f32]) -> f32 {
        let len = a.len();
        let chunks = len / LANES;
        let mut acc = _mm512_setzero_ps();
        for i in 0..chunks {
            let off = i * LANES;
            let va = _mm512_loadu_ps(a.as_ptr().add(off));
            let vb = _mm512_loadu_ps(b.as_ptr().add(off));
            let diff = _mm512_sub_ps(va, vb);
            acc = _mm512_fmadd_ps(diff, diff, acc);
        }
        let mut sum = _mm512_reduce_add_ps(acc);
        for i in (chunks * LANES)..len {
            let d = a[i] - b[i];
            sum += d * d;
        }
        sum
    }

    #[target_feature(enable = "avx512f")]
    unsafe fn one_minus_dot_impl(a: &[f32], b: &[f32]) -> f32 {
        let len = a.len();
        let chunks = len / LANES;
        let mut acc = _mm512_setzero_ps();
        for i in 0..chunks {
            let off = i * LANES;
            let va = _mm512_loadu_ps(a.as_ptr().add(off));
            let vb = _mm512_loadu_ps(b.as_ptr().add(off));
            acc = _mm512_fmadd_ps(va, vb, acc);
        }
        let mut dot = _mm512_reduce_add_ps(acc);
        for i in (chunks * LANES)..len {
            dot += a[i] * b[i];
        }
        1.0 - dot
    }

    pub(super) fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        // SAFETY: this function is only ever installed into a `Kernel`'s
        // dispatch table after `tier_supported(SimdTier::Avx512)` observed
        // `avx512f` via `is_x86_feature_detected!` at kernel-build time. The
        // feature set of a running process does not change afterward.
        unsafe { squared_euclidean_impl(a, b) }
    }

    pub(super) fn one_minus_dot(a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        // SAFETY: see `squared_euclidean` above.
        unsafe { one_minus_dot_impl(a, b) }
    }
}

#[cfg(target_arch = "x86_64")]
pub(super) use x86::{one_minus_dot, squared_euclidean};

#[cfg(not(target_arch = "x86_64"))]
pub(super) fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    super::scalar::squared_euclidean(a, b)
}

#[cfg(not(target_arch = "x86_64"))]
pub(super) fn one_minus_dot(a: &[f32], b: &[f32]) -> f32 {
    super::scalar::one_minus_dot(a, b)
}

#[cfg(all(test, target_arch = "x86_64"))]
mod tests {
    use super::*;
    use crate::distance::scalar;

    #[test]
    fn avx512_matches_scalar_when_available() {
        if !is_x86_feature_detected!("avx512f") {
            return;
        }
        let a: Vec<f32> = (0..37).map(|i| i as f32 * 0.1).collect();
        let b: Vec<f32> = (0..37).map(|i| i as f32 * -0.05).collect();
        assert!((squared_euclidean(&a, &b) - scalar::squared_euclidean(&a, &b)).abs() < 1e-2);
        assert!((one_minus_dot(&a, &b) - scalar::one_minus_dot(&a, &b)).abs() < 1e-2);
    }
}
