//! Benchmarks for spatial index construction and spacing estimation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pointclass_algorithms::{estimate_spacing, KdTree, SpacingOptions};
use pointclass_core::{NearestNeighborSearch, Point3f, PointSet};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Generate a wavy surface sampled on a jittered grid
fn generate_surface(num_points: usize) -> PointSet {
    let side = (num_points as f32).sqrt().ceil() as usize;
    let points: Vec<Point3f> = (0..num_points)
        .map(|i| {
            let u = (i % side) as f32 * 0.05;
            let v = (i / side) as f32 * 0.05;
            Point3f::new(
                u + (i as f32 * 0.37).sin() * 0.01,
                v + (i as f32 * 0.73).cos() * 0.01,
                (u * 2.0).sin() * (v * 3.0).cos(),
            )
        })
        .collect();

    PointSet::from_points(points)
}

fn benchmark_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_build");

    for &size in &[10_000usize, 100_000] {
        let set = generate_surface(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &set, |b, set| {
            b.iter(|| KdTree::build(black_box(set)))
        });
    }

    group.finish();
}

fn benchmark_spacing(c: &mut Criterion) {
    let mut group = c.benchmark_group("spacing");

    for &size in &[10_000usize, 100_000] {
        let set = generate_surface(size);
        let tree = KdTree::build(&set);
        let options = SpacingOptions::default();

        group.bench_with_input(BenchmarkId::from_parameter(size), &set, |b, set| {
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(42);
                estimate_spacing(set, &tree as &dyn NearestNeighborSearch, &options, &mut rng)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_index_build, benchmark_spacing);
criterion_main!(benches);
