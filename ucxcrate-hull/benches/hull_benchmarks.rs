//! Benchmarks for hull construction and offsetting

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use ucxcrate_core::Point3d;
use ucxcrate_hull::{apply_offset, build_convex_hull};

fn random_ball(count: usize, seed: u64) -> Vec<Point3d> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut points = Vec::with_capacity(count);
    while points.len() < count {
        let p = Point3d::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if p.coords.norm_squared() <= 1.0 {
            points.push(p);
        }
    }
    points
}

fn bench_hull(c: &mut Criterion) {
    let mut group = c.benchmark_group("convex_hull");

    for &count in &[100usize, 1_000, 10_000] {
        let points = random_ball(count, 7);
        group.bench_with_input(BenchmarkId::new("quickhull", count), &points, |b, points| {
            b.iter(|| {
                let hull = build_convex_hull(black_box(points)).unwrap();
                black_box(hull);
            });
        });
    }

    group.finish();
}

fn bench_offset(c: &mut Criterion) {
    let mut group = c.benchmark_group("offset");

    for &count in &[100usize, 1_000] {
        let hull = build_convex_hull(&random_ball(count, 11)).unwrap().mesh;
        group.bench_with_input(
            BenchmarkId::new("face_copies", hull.face_count()),
            &hull,
            |b, hull| {
                b.iter(|| {
                    let grown = apply_offset(black_box(hull), 0.05).unwrap();
                    black_box(grown);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_hull, bench_offset);
criterion_main!(benches);
