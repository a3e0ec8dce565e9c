//! Write-path throughput: projection, Hilbert encoding, content hashing,
//! and the full per-record triple.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use glome::{hashing, hilbert, project, Seed};

const SPAN: u32 = 4096;

fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("projection");
    group.throughput(Throughput::Elements(u64::from(SPAN)));
    group.bench_function("codepoints", |b| {
        b.iter(|| {
            for cp in 0..SPAN {
                black_box(project(&Seed::Codepoint(black_box(cp))));
            }
        });
    });
    group.bench_function("float_bits", |b| {
        b.iter(|| {
            for i in 0..SPAN {
                let bits = u64::from(i) * 0x000F_8421_0842_1084;
                black_box(project(&Seed::FloatBits(black_box(bits))));
            }
        });
    });
    group.finish();
}

fn bench_hilbert(c: &mut Criterion) {
    let points: Vec<_> = (0..SPAN).map(|cp| project(&Seed::Codepoint(cp))).collect();
    let keys: Vec<_> = points.iter().map(|&p| hilbert::encode(p)).collect();

    let mut group = c.benchmark_group("hilbert");
    group.throughput(Throughput::Elements(u64::from(SPAN)));
    group.bench_function("encode", |b| {
        b.iter(|| {
            for &p in &points {
                black_box(hilbert::encode(black_box(p)));
            }
        });
    });
    group.bench_function("decode", |b| {
        b.iter(|| {
            for &k in &keys {
                black_box(hilbert::decode(black_box(k)));
            }
        });
    });
    group.finish();
}

fn bench_hashing(c: &mut Criterion) {
    let mut group = c.benchmark_group("hashing");
    group.throughput(Throughput::Elements(u64::from(SPAN)));
    group.bench_function("seed_u32", |b| {
        b.iter(|| {
            for v in 0..SPAN {
                black_box(hashing::hash_seed_u32(black_box(v)));
            }
        });
    });
    group.finish();
}

fn bench_record_triple(c: &mut Criterion) {
    let mut group = c.benchmark_group("record");
    group.throughput(Throughput::Elements(u64::from(SPAN)));
    group.bench_function("project_encode_hash", |b| {
        b.iter(|| {
            for cp in 0..SPAN {
                let point = project(&Seed::Codepoint(cp));
                let key = hilbert::encode(point);
                let digest = hashing::hash_seed_u32(cp);
                black_box((point, key, digest));
            }
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_projection,
    bench_hilbert,
    bench_hashing,
    bench_record_triple
);
criterion_main!(benches);
