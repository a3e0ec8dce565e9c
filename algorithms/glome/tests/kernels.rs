//! SIMD Kernel Consistency Tests
//!
//! Whatever path the dispatcher selects must produce the same bit pattern
//! as the scalar reference arithmetic written out longhand here.

#![allow(clippy::pedantic, clippy::nursery)]
#![allow(clippy::unwrap_used)]

use glome::{kernels, project, Point4, Seed};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn sample_points(count: usize, seed: u64) -> Vec<Point4> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| project(&Seed::Integer(rng.gen())))
        .collect()
}

fn component_arrays(points: &[Point4]) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
    (
        points.iter().map(|p| p.x).collect(),
        points.iter().map(|p| p.y).collect(),
        points.iter().map(|p| p.z).collect(),
        points.iter().map(|p| p.m).collect(),
    )
}

/// The canonical scalar distance², written in reference order.
fn scalar_distance_squared(a: Point4, b: Point4) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    let dm = a.m - b.m;
    dx * dx + dy * dy + dz * dz + dm * dm
}

// =============================================================================
// PAIRWISE PARITY
// =============================================================================

#[test]
fn dispatched_distance_matches_scalar_reference_bitwise() {
    let points = sample_points(64, 1);
    for pair in points.windows(2) {
        let expected = scalar_distance_squared(pair[0], pair[1]);
        let got = kernels::distance_squared(pair[0], pair[1]);
        assert_eq!(got.to_bits(), expected.to_bits());
        assert_eq!(
            kernels::distance(pair[0], pair[1]).to_bits(),
            expected.sqrt().to_bits()
        );
    }
}

#[test]
fn dispatched_vector_ops_match_scalar_reference_bitwise() {
    let points = sample_points(64, 2);
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);

        let sum = kernels::add(a, b);
        assert_eq!(sum.x.to_bits(), (a.x + b.x).to_bits());
        assert_eq!(sum.m.to_bits(), (a.m + b.m).to_bits());

        let diff = kernels::sub(a, b);
        assert_eq!(diff.y.to_bits(), (a.y - b.y).to_bits());

        let scaled = kernels::scale(a, 0.37);
        assert_eq!(scaled.z.to_bits(), (a.z * 0.37).to_bits());

        let dot = kernels::dot(a, b);
        let expected = a.x * b.x + a.y * b.y + a.z * b.z + a.m * b.m;
        assert_eq!(dot.to_bits(), expected.to_bits());
    }
}

// =============================================================================
// BATCH PARITY
// =============================================================================

#[test]
fn batch_distance_matches_pairwise_calls_bitwise() {
    // 1003 targets: exercises both the vector lanes and the remainder.
    let points = sample_points(1003, 3);
    let (xs, ys, zs, ms) = component_arrays(&points);
    let query = project(&Seed::Codepoint('q' as u32));

    let mut out = vec![0.0; points.len()];
    kernels::batch_distance(query, &xs, &ys, &zs, &ms, &mut out);

    for (i, &p) in points.iter().enumerate() {
        let expected = scalar_distance_squared(query, p).sqrt();
        assert_eq!(out[i].to_bits(), expected.to_bits(), "index {i}");
    }
}

#[test]
fn attention_weights_match_scalar_reference_bitwise() {
    let mut rng = StdRng::seed_from_u64(4);
    let distances: Vec<f64> = (0..517).map(|_| rng.gen_range(0.0..2.0)).collect();

    let mut weights = vec![0.0; distances.len()];
    kernels::attention_weights(&distances, &mut weights);

    // Reference: raw weights, one scalar sum in index order, then divide.
    let mut expected: Vec<f64> = distances.iter().map(|d| 1.0 / (1.0 + d)).collect();
    let mut sum = 0.0;
    for &w in &expected {
        sum += w;
    }
    for w in &mut expected {
        *w /= sum;
    }

    for i in 0..weights.len() {
        assert_eq!(weights[i].to_bits(), expected[i].to_bits(), "index {i}");
    }
}

#[test]
fn attention_weights_form_a_distribution() {
    let distances = [0.0, 0.5, 1.0, 2.0, 10.0];
    let mut weights = [0.0; 5];
    kernels::attention_weights(&distances, &mut weights);

    let total: f64 = weights.iter().sum();
    assert!((total - 1.0).abs() < 1e-12);
    for pair in weights.windows(2) {
        assert!(pair[0] > pair[1], "closer targets must weigh more");
    }
}

#[test]
fn attention_weights_handle_empty_input() {
    let mut weights: [f64; 0] = [];
    kernels::attention_weights(&[], &mut weights);
}

// =============================================================================
// NORMALISATION & CENTROID
// =============================================================================

#[test]
fn normalize_produces_unit_vectors_and_passes_zero_through() {
    let v = Point4::new(3.0, -4.0, 12.0, 0.5);
    let unit = kernels::normalize(v);
    assert!((kernels::magnitude(unit) - 1.0).abs() < 1e-12);

    let zero = Point4::default();
    assert_eq!(kernels::normalize(zero), zero);
}

#[test]
fn batch_normalize_matches_single_normalize() {
    let points = sample_points(37, 5);
    let scaled: Vec<Point4> = points.iter().map(|&p| kernels::scale(p, 2.5)).collect();
    let (mut xs, mut ys, mut zs, mut ms) = component_arrays(&scaled);

    kernels::batch_normalize(&mut xs, &mut ys, &mut zs, &mut ms);

    for (i, &p) in scaled.iter().enumerate() {
        let mag = (p.x * p.x + p.y * p.y + p.z * p.z + p.m * p.m).sqrt();
        assert_eq!(xs[i].to_bits(), (p.x * (1.0 / mag)).to_bits(), "index {i}");
    }
}

#[test]
fn centroid_is_the_component_mean() {
    let points = sample_points(9, 6);
    let (xs, ys, zs, ms) = component_arrays(&points);
    let centre = kernels::centroid(&xs, &ys, &zs, &ms);

    let mut sum_x = 0.0;
    for &x in &xs {
        sum_x += x;
    }
    assert_eq!(centre.x.to_bits(), (sum_x * (1.0 / 9.0)).to_bits());
}

#[test]
fn centroid_of_nothing_is_the_origin() {
    assert_eq!(kernels::centroid(&[], &[], &[], &[]), Point4::default());
}

// =============================================================================
// CAPABILITIES
// =============================================================================

#[test]
fn capability_record_is_memoized_and_printable() {
    let first = kernels::capabilities();
    let second = kernels::capabilities();
    assert_eq!(first, second);

    let summary = kernels::capabilities_string();
    assert!(summary.contains("SSE2"));
    assert!(summary.contains("AVX-512F"));
}

#[test]
#[should_panic(expected = "component slices must share one length")]
fn mismatched_component_lengths_panic() {
    let mut out = [0.0; 2];
    kernels::batch_distance(
        Point4::default(),
        &[0.0, 1.0],
        &[0.0],
        &[0.0, 1.0],
        &[0.0, 1.0],
        &mut out,
    );
}
