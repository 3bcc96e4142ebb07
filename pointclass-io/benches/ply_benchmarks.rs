//! Benchmarks for PLY decoding and encoding

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pointclass_core::{Point3f, PointSet, Vector3f};
use pointclass_io::{PlyReader, PlyWriteOptions, PlyWriter};
use std::io::Cursor;

/// Generate a fully attributed test point set with the specified number of points
fn generate_test_point_set(num_points: usize) -> PointSet {
    let points: Vec<Point3f> = (0..num_points)
        .map(|i| {
            let i = i as f32;
            Point3f::new((i * 0.1).sin(), (i * 0.1).cos(), i * 0.001)
        })
        .collect();

    let mut set = PointSet::from_points(points);
    set.normals = vec![Vector3f::new(0.0, 0.0, 1.0); num_points];
    set.colors = (0..num_points).map(|i| [i as u8, (i >> 8) as u8, 128]).collect();
    set.views = vec![2; num_points];
    set.labels = (0..num_points).map(|i| (i % 19) as u8).collect();
    set
}

fn encode(set: &PointSet) -> Vec<u8> {
    let mut bytes = Vec::new();
    PlyWriter::write_to(set, &mut bytes, &PlyWriteOptions::default())
        .expect("Failed to encode PLY");
    bytes
}

fn benchmark_ply_reading(c: &mut Criterion) {
    let sizes = vec![1000, 10000, 100000];

    let mut group = c.benchmark_group("ply_reading");

    for size in sizes {
        let bytes = encode(&generate_test_point_set(size));
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        group.bench_with_input(BenchmarkId::new("binary_le", size), &bytes, |b, bytes| {
            b.iter(|| {
                let set = PlyReader::read_from(&mut Cursor::new(bytes.as_slice()))
                    .expect("Failed to decode PLY");
                black_box(set);
            });
        });
    }

    group.finish();
}

fn benchmark_ply_writing(c: &mut Criterion) {
    let sizes = vec![1000, 10000, 100000];

    let mut group = c.benchmark_group("ply_writing");

    for size in sizes {
        let set = generate_test_point_set(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("binary_le", size), &set, |b, set| {
            b.iter(|| black_box(encode(set)));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_ply_reading, benchmark_ply_writing);
criterion_main!(benches);
