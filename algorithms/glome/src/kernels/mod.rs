//! SIMD primitives with runtime dispatch.
//!
//! Capability detection runs once and is memoized. Every operation
//! produces the same floating-point bit pattern as its portable scalar
//! reference: vector paths are only used where the arithmetic stays
//! lane-local, and reductions keep the scalar summation order. Operations
//! whose vectorisation would reorder a reduction (centroid, batch
//! normalise) always run the scalar kernel.

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod avx2;
mod portable;

use crate::types::Point4;
use once_cell::sync::Lazy;

// =============================================================================
// CAPABILITY DETECTION
// =============================================================================

/// Detected CPU vector capabilities.
///
/// On x86 the detection macro verifies OS XSAVE state support before
/// reporting any AVX-class feature, so an enabled flag means the path is
/// actually usable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimdCaps {
    /// SSE2 (baseline on x86-64).
    pub sse2: bool,
    /// SSE4.1.
    pub sse41: bool,
    /// AVX (256-bit lanes).
    pub avx: bool,
    /// AVX2 (256-bit integer + FMA-era shuffles).
    pub avx2: bool,
    /// AVX-512 foundation.
    pub avx512f: bool,
}

static CAPS: Lazy<SimdCaps> = Lazy::new(detect);

#[allow(unreachable_code)]
fn detect() -> SimdCaps {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        return SimdCaps {
            sse2: is_x86_feature_detected!("sse2"),
            sse41: is_x86_feature_detected!("sse4.1"),
            avx: is_x86_feature_detected!("avx"),
            avx2: is_x86_feature_detected!("avx2"),
            avx512f: is_x86_feature_detected!("avx512f"),
        };
    }

    SimdCaps::default()
}

/// The memoized capability record.
#[must_use]
pub fn capabilities() -> SimdCaps {
    *CAPS
}

/// Human-readable capability summary.
#[must_use]
pub fn capabilities_string() -> String {
    let caps = capabilities();
    let yes_no = |flag: bool| if flag { "yes" } else { "no" };
    format!(
        "SSE2: {}, SSE4.1: {}, AVX: {}, AVX2: {}, AVX-512F: {}",
        yes_no(caps.sse2),
        yes_no(caps.sse41),
        yes_no(caps.avx),
        yes_no(caps.avx2),
        yes_no(caps.avx512f),
    )
}

// =============================================================================
// DISTANCE
// =============================================================================

/// Squared 4D Euclidean distance.
#[must_use]
pub fn distance_squared(a: Point4, b: Point4) -> f64 {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if capabilities().avx {
            return avx2::distance_squared(a, b);
        }
    }
    portable::distance_squared(a, b)
}

/// 4D Euclidean distance.
#[must_use]
pub fn distance(a: Point4, b: Point4) -> f64 {
    distance_squared(a, b).sqrt()
}

/// Distances from one query point to `out.len()` targets held in
/// component arrays.
///
/// # Panics
/// Panics when the component slices and `out` differ in length.
pub fn batch_distance(
    query: Point4,
    xs: &[f64],
    ys: &[f64],
    zs: &[f64],
    ms: &[f64],
    out: &mut [f64],
) {
    assert_component_lengths(xs, ys, zs, ms, out.len());

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if capabilities().avx2 {
            avx2::batch_distance(query, xs, ys, zs, ms, out);
            return;
        }
    }
    portable::batch_distance(query, xs, ys, zs, ms, out);
}

// =============================================================================
// ATTENTION
// =============================================================================

/// Normalised attention weights `w_i = (1/(1+d_i)) / Σ_j 1/(1+d_j)`.
///
/// # Panics
/// Panics when `distances` and `weights` differ in length.
pub fn attention_weights(distances: &[f64], weights: &mut [f64]) {
    assert_eq!(
        distances.len(),
        weights.len(),
        "one weight slot per distance"
    );

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if capabilities().avx2 {
            avx2::attention_weights(distances, weights);
            return;
        }
    }
    portable::attention_weights(distances, weights);
}

// =============================================================================
// VECTOR OPERATIONS
// =============================================================================

/// Component-wise sum.
#[must_use]
pub fn add(a: Point4, b: Point4) -> Point4 {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if capabilities().avx {
            return avx2::add(a, b);
        }
    }
    portable::add(a, b)
}

/// Component-wise difference.
#[must_use]
pub fn sub(a: Point4, b: Point4) -> Point4 {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if capabilities().avx {
            return avx2::sub(a, b);
        }
    }
    portable::sub(a, b)
}

/// Scalar multiple.
#[must_use]
pub fn scale(v: Point4, factor: f64) -> Point4 {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if capabilities().avx {
            return avx2::scale(v, factor);
        }
    }
    portable::scale(v, factor)
}

/// Dot product.
#[must_use]
pub fn dot(a: Point4, b: Point4) -> f64 {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if capabilities().avx {
            return avx2::dot(a, b);
        }
    }
    portable::dot(a, b)
}

/// Euclidean norm.
#[must_use]
pub fn magnitude(v: Point4) -> f64 {
    dot(v, v).sqrt()
}

/// Unit-length rescale; vectors shorter than 1e-15 pass through.
#[must_use]
pub fn normalize(v: Point4) -> Point4 {
    let mag = magnitude(v);
    if mag > 1e-15 {
        scale(v, 1.0 / mag)
    } else {
        v
    }
}

// =============================================================================
// BATCH OPERATIONS
// =============================================================================

/// Normalise many points in place. Scalar on every target: the per-point
/// magnitude is a reduction.
///
/// # Panics
/// Panics when the component slices differ in length.
pub fn batch_normalize(xs: &mut [f64], ys: &mut [f64], zs: &mut [f64], ms: &mut [f64]) {
    let count = xs.len();
    assert_component_lengths(xs, ys, zs, ms, count);
    portable::batch_normalize(xs, ys, zs, ms);
}

/// Arithmetic mean of many points; zero for an empty set. Scalar on every
/// target: the component sums are reductions.
///
/// # Panics
/// Panics when the component slices differ in length.
#[must_use]
pub fn centroid(xs: &[f64], ys: &[f64], zs: &[f64], ms: &[f64]) -> Point4 {
    assert_component_lengths(xs, ys, zs, ms, xs.len());
    portable::centroid(xs, ys, zs, ms)
}

// =============================================================================
// INTERNAL
// =============================================================================

fn assert_component_lengths(xs: &[f64], ys: &[f64], zs: &[f64], ms: &[f64], expected: usize) {
    assert!(
        xs.len() == expected && ys.len() == expected && zs.len() == expected && ms.len() == expected,
        "component slices must share one length"
    );
}
