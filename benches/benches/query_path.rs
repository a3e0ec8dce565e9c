//! Query-path throughput: batched distance and attention normalisation.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use glome::{kernels, project, Seed};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TARGETS: usize = 16_384;

fn component_arrays() -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let mut xs = Vec::with_capacity(TARGETS);
    let mut ys = Vec::with_capacity(TARGETS);
    let mut zs = Vec::with_capacity(TARGETS);
    let mut ms = Vec::with_capacity(TARGETS);
    for _ in 0..TARGETS {
        let p = project(&Seed::Integer(rng.gen()));
        xs.push(p.x);
        ys.push(p.y);
        zs.push(p.z);
        ms.push(p.m);
    }
    (xs, ys, zs, ms)
}

fn bench_batch_distance(c: &mut Criterion) {
    let (xs, ys, zs, ms) = component_arrays();
    let query = project(&Seed::Codepoint('q' as u32));
    let mut out = vec![0.0; TARGETS];

    let mut group = c.benchmark_group("batch_distance");
    group.throughput(Throughput::Elements(TARGETS as u64));
    group.bench_function("dispatched", |b| {
        b.iter(|| {
            kernels::batch_distance(black_box(query), &xs, &ys, &zs, &ms, &mut out);
            black_box(&out);
        });
    });
    group.finish();
}

fn bench_attention(c: &mut Criterion) {
    let (xs, ys, zs, ms) = component_arrays();
    let query = project(&Seed::Codepoint('q' as u32));
    let mut distances = vec![0.0; TARGETS];
    kernels::batch_distance(query, &xs, &ys, &zs, &ms, &mut distances);
    let mut weights = vec![0.0; TARGETS];

    let mut group = c.benchmark_group("attention");
    group.throughput(Throughput::Elements(TARGETS as u64));
    group.bench_function("normalise", |b| {
        b.iter(|| {
            kernels::attention_weights(black_box(&distances), &mut weights);
            black_box(&weights);
        });
    });
    group.finish();
}

criterion_group!(benches, bench_batch_distance, bench_attention);
criterion_main!(benches);
