//! AVX/AVX2 kernels.
//!
//! Lane-local arithmetic only: subtraction, multiplication and division
//! vectorise four lanes at a time, while every reduction keeps the scalar
//! summation order so results are bit-identical to the portable kernels.
//! Pairwise operations need AVX; the batched paths need AVX2.

#![allow(unsafe_code)]

use super::portable;
use crate::types::Point4;

#[cfg(target_arch = "x86")]
use core::arch::x86::{
    _mm256_add_pd, _mm256_div_pd, _mm256_loadu_pd, _mm256_mul_pd, _mm256_set1_pd, _mm256_set_pd,
    _mm256_sqrt_pd, _mm256_storeu_pd, _mm256_sub_pd,
};
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::{
    _mm256_add_pd, _mm256_div_pd, _mm256_loadu_pd, _mm256_mul_pd, _mm256_set1_pd, _mm256_set_pd,
    _mm256_sqrt_pd, _mm256_storeu_pd, _mm256_sub_pd,
};

// =============================================================================
// PAIRWISE (AVX)
// =============================================================================

#[target_feature(enable = "avx")]
unsafe fn lane_ops_impl(a: Point4, b: Point4, op: LaneOp) -> [f64; 4] {
    let va = _mm256_set_pd(a.m, a.z, a.y, a.x);
    let vb = _mm256_set_pd(b.m, b.z, b.y, b.x);
    let result = match op {
        LaneOp::Add => _mm256_add_pd(va, vb),
        LaneOp::Sub => _mm256_sub_pd(va, vb),
        LaneOp::Mul => _mm256_mul_pd(va, vb),
    };
    let mut lanes = [0.0f64; 4];
    _mm256_storeu_pd(lanes.as_mut_ptr(), result);
    lanes
}

#[derive(Clone, Copy)]
enum LaneOp {
    Add,
    Sub,
    Mul,
}

/// 4-lane add. Exact: one lane per component, no reduction.
pub(crate) fn add(a: Point4, b: Point4) -> Point4 {
    // SAFETY: only reachable after runtime AVX detection in the dispatcher.
    let lanes = unsafe { lane_ops_impl(a, b, LaneOp::Add) };
    Point4::new(lanes[0], lanes[1], lanes[2], lanes[3])
}

/// 4-lane subtract. Exact: one lane per component, no reduction.
pub(crate) fn sub(a: Point4, b: Point4) -> Point4 {
    // SAFETY: only reachable after runtime AVX detection in the dispatcher.
    let lanes = unsafe { lane_ops_impl(a, b, LaneOp::Sub) };
    Point4::new(lanes[0], lanes[1], lanes[2], lanes[3])
}

#[target_feature(enable = "avx")]
unsafe fn scale_impl(v: Point4, factor: f64) -> [f64; 4] {
    let lanes_in = _mm256_set_pd(v.m, v.z, v.y, v.x);
    let result = _mm256_mul_pd(lanes_in, _mm256_set1_pd(factor));
    let mut lanes = [0.0f64; 4];
    _mm256_storeu_pd(lanes.as_mut_ptr(), result);
    lanes
}

/// 4-lane scale. Exact: one lane per component, no reduction.
pub(crate) fn scale(v: Point4, factor: f64) -> Point4 {
    // SAFETY: only reachable after runtime AVX detection in the dispatcher.
    let lanes = unsafe { scale_impl(v, factor) };
    Point4::new(lanes[0], lanes[1], lanes[2], lanes[3])
}

/// Squared distance: vector subtract/multiply, scalar-order sum.
pub(crate) fn distance_squared(a: Point4, b: Point4) -> f64 {
    let d = sub(a, b);
    // SAFETY: only reachable after runtime AVX detection in the dispatcher.
    let sq = unsafe { lane_ops_impl(d, d, LaneOp::Mul) };
    sq[0] + sq[1] + sq[2] + sq[3]
}

/// Dot product: vector multiply, scalar-order sum.
pub(crate) fn dot(a: Point4, b: Point4) -> f64 {
    // SAFETY: only reachable after runtime AVX detection in the dispatcher.
    let prod = unsafe { lane_ops_impl(a, b, LaneOp::Mul) };
    prod[0] + prod[1] + prod[2] + prod[3]
}

// =============================================================================
// BATCHED (AVX2)
// =============================================================================

#[target_feature(enable = "avx2")]
unsafe fn batch_distance_impl(
    query: Point4,
    xs: &[f64],
    ys: &[f64],
    zs: &[f64],
    ms: &[f64],
    out: &mut [f64],
) {
    let count = out.len();
    let vec_count = count - (count % 4);

    let qx = _mm256_set1_pd(query.x);
    let qy = _mm256_set1_pd(query.y);
    let qz = _mm256_set1_pd(query.z);
    let qm = _mm256_set1_pd(query.m);

    let mut i = 0;
    while i < vec_count {
        let dx = _mm256_sub_pd(qx, _mm256_loadu_pd(xs.as_ptr().add(i)));
        let dy = _mm256_sub_pd(qy, _mm256_loadu_pd(ys.as_ptr().add(i)));
        let dz = _mm256_sub_pd(qz, _mm256_loadu_pd(zs.as_ptr().add(i)));
        let dm = _mm256_sub_pd(qm, _mm256_loadu_pd(ms.as_ptr().add(i)));

        // Left-associated, matching the scalar reference exactly.
        let mut sum = _mm256_mul_pd(dx, dx);
        sum = _mm256_add_pd(sum, _mm256_mul_pd(dy, dy));
        sum = _mm256_add_pd(sum, _mm256_mul_pd(dz, dz));
        sum = _mm256_add_pd(sum, _mm256_mul_pd(dm, dm));

        _mm256_storeu_pd(out.as_mut_ptr().add(i), _mm256_sqrt_pd(sum));
        i += 4;
    }

    for j in vec_count..count {
        let target = Point4::new(xs[j], ys[j], zs[j], ms[j]);
        out[j] = portable::distance_squared(query, target).sqrt();
    }
}

/// Batched query-to-targets distance; four targets per iteration.
pub(crate) fn batch_distance(
    query: Point4,
    xs: &[f64],
    ys: &[f64],
    zs: &[f64],
    ms: &[f64],
    out: &mut [f64],
) {
    // SAFETY: only reachable after runtime AVX2 detection in the dispatcher.
    unsafe { batch_distance_impl(query, xs, ys, zs, ms, out) }
}

#[target_feature(enable = "avx2")]
unsafe fn attention_weights_impl(distances: &[f64], weights: &mut [f64]) {
    let count = distances.len();
    let vec_count = count - (count % 4);
    let ones = _mm256_set1_pd(1.0);

    // Raw weights lane-by-lane.
    let mut i = 0;
    while i < vec_count {
        let d = _mm256_loadu_pd(distances.as_ptr().add(i));
        let w = _mm256_div_pd(ones, _mm256_add_pd(ones, d));
        _mm256_storeu_pd(weights.as_mut_ptr().add(i), w);
        i += 4;
    }
    for j in vec_count..count {
        weights[j] = 1.0 / (1.0 + distances[j]);
    }

    // The reduction stays scalar so both paths sum in the same order.
    let mut sum = 0.0;
    for &w in weights.iter() {
        sum += w;
    }

    if sum > 0.0 {
        let divisor = _mm256_set1_pd(sum);
        let mut i = 0;
        while i < vec_count {
            let w = _mm256_loadu_pd(weights.as_ptr().add(i));
            _mm256_storeu_pd(weights.as_mut_ptr().add(i), _mm256_div_pd(w, divisor));
            i += 4;
        }
        for j in vec_count..count {
            weights[j] /= sum;
        }
    }
}

/// Attention weight normalisation with a scalar-order sum.
pub(crate) fn attention_weights(distances: &[f64], weights: &mut [f64]) {
    // SAFETY: only reachable after runtime AVX2 detection in the dispatcher.
    unsafe { attention_weights_impl(distances, weights) }
}
