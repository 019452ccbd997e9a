//! 最近点探索の総当たりと octree の比較

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use facetouch::geometry::Octree;
use facetouch::landmark::Point3D;
use facetouch::proximity::{BruteForce, Indexed, ProximityStrategy};
use facetouch::{Config, TouchDetector};

fn scatter(seed: u32, n: usize, offset: f32, scale: f32) -> Vec<Point3D> {
    let mut s = seed;
    let mut next = move || {
        s ^= s << 13;
        s ^= s >> 17;
        s ^= s << 5;
        (s % 10_000) as f32 / 10_000.0
    };
    (0..n)
        .map(|_| Point3D::new(offset + next() * scale, next() * scale, next() * scale))
        .collect()
}

// ---------------------------------------------------------------------------
// Strategy comparison
// ---------------------------------------------------------------------------

fn bench_strategies(c: &mut Criterion) {
    let hand = scatter(7, 21, 80.0, 60.0);
    let mut group = c.benchmark_group("nearest_pair");
    for face_len in [68usize, 468, 1872] {
        let face = scatter(11, face_len, 0.0, 200.0);
        group.bench_with_input(BenchmarkId::new("brute_force", face_len), &face, |b, face| {
            b.iter(|| BruteForce.search(black_box(&hand), black_box(face), None));
        });
        group.bench_with_input(BenchmarkId::new("indexed", face_len), &face, |b, face| {
            b.iter(|| Indexed.search(black_box(&hand), black_box(face), None));
        });
        group.bench_with_input(BenchmarkId::new("indexed_r30", face_len), &face, |b, face| {
            b.iter(|| Indexed.search(black_box(&hand), black_box(face), Some(30.0)));
        });
    }
    group.finish();
}

fn bench_octree_build(c: &mut Criterion) {
    let face = scatter(3, 468, 0.0, 200.0);
    c.bench_function("octree_build_468", |b| {
        b.iter(|| Octree::build(black_box(&face)).node_count());
    });
}

// ---------------------------------------------------------------------------
// Full frame
// ---------------------------------------------------------------------------

fn bench_process_frame(c: &mut Criterion) {
    let hand = scatter(5, 21, 40.0, 60.0);
    let face = scatter(9, 468, 0.0, 200.0);
    let mut detector = TouchDetector::new(Config::default()).expect("default config");
    c.bench_function("process_frame_21x468", |b| {
        b.iter(|| detector.process(black_box(&hand), black_box(&face)).detection);
    });
}

criterion_group!(benches, bench_strategies, bench_octree_build, bench_process_frame);
criterion_main!(benches);
