//! SSE/AVX-tier kernels built on the portable, safe `wide` crate.
//!
//! `wide::f32x4`/`f32x8` pick the widest instruction set the target
//! actually has at compile time (SSE2 or NEON for the 4-lane type, AVX2
//! where available for the 8-lane type) while staying entirely safe code;
//! this module only adds the chunk/remainder bookkeeping around them.

use wide::{f32x4, f32x8};

pub(super) fn squared_euclidean_sse(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    const LANES: usize = 4;
    let chunks = a.len() / LANES;
    let mut acc = f32x4::ZERO;
    for i in 0..chunks {
        let off = i * LANES;
        let va = f32x4::from(<[f32; LANES]>::try_from(&a[off..off + LANES]).unwrap());
        let vb = f32x4::from(<[f32; LANES]>::try_from(&b[off..off + LANES]).unwrap());
        let diff = va - vb;
        acc = diff.mul_add(diff, acc);
    }
    let mut sum = acc.reduce_add();
    for i in (chunks * LANES)..a.len() {
        let d = a[i] - b[i];
        sum += d * d;
    }
    sum
}

pub(super) fn one_minus_dot_sse(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    const LANES: usize = 4;
    let chunks = a.len() / LANES;
    let mut acc = f32x4::ZERO;
    for i in 0..chunks {
        let off = i * LANES;
        let va = f32x4::from(<[f32; LANES]>::try_from(&a[off..off + LANES]).unwrap());
        let vb = f32x4::from(<[f32; LANES]>::try_from(&b[off..off + LANES]).unwrap());
        acc = va.mul_add(vb, acc);
    }
    let mut dot = acc.reduce_add();
    for i in (chunks * LANES)..a.len() {
        dot += a[i] * b[i];
    }
    1.0 - dot
}

pub(super) fn squared_euclidean_avx(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    const LANES: usize = 8;
    let chunks = a.len() / LANES;
    let mut acc = f32x8::ZERO;
    for i in 0..chunks {
        let off = i * LANES;
        let va = f32x8::from(<[f32; LANES]>::try_from(&a[off..off + LANES]).unwrap());
        let vb = f32x8::from(<[f32; LANES]>::try_from(&b[off..off + LANES]).unwrap());
        let diff = va - vb;
        acc = diff.mul_add(diff, acc);
    }
    let mut sum = acc.reduce_add();
    for i in (chunks * LANES)..a.len() {
        let d = a[i] - b[i];
        sum += d * d;
    }
    sum
}

pub(super) fn one_minus_dot_avx(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    const LANES: usize = 8;
    let chunks = a.len() / LANES;
    let mut acc = f32x8::ZERO;
    for i in 0..chunks {
        let off = i * LANES;
        let va = f32x8::from(<[f32; LANES]>::try_from(&a[off..off + LANES]).unwrap());
        let vb = f32x8::from(<[f32; LANES]>::try_from(&b[off..off + LANES]).unwrap());
        acc = va.mul_add(vb, acc);
    }
    let mut dot = acc.reduce_add();
    for i in (chunks * LANES)..a.len() {
        dot += a[i] * b[i];
    }
    1.0 - dot
}
