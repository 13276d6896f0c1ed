use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use halberd::util::simd::{self, VectorMath};
use halberd::vector::core::distance::L2Distance;

fn generate_test_vectors(count: usize, dimension: usize) -> Vec<Vec<f32>> {
    let mut vectors = Vec::with_capacity(count);
    for i in 0..count {
        let mut data = Vec::with_capacity(dimension);
        for j in 0..dimension {
            let value = ((i as f32 * 0.1 + j as f32 * 0.01).sin() * 0.5 + 0.5) * 2.0 - 1.0;
            data.push(value);
        }
        vectors.push(data);
    }
    vectors
}

fn bench_distances(c: &mut Criterion) {
    let mut group = c.benchmark_group("l2_distance");

    for dimension in [128, 960] {
        let vectors = generate_test_vectors(101, dimension);
        let query = &vectors[0];
        let targets = &vectors[1..101];

        for math in [simd::portable(), simd::accelerator()] {
            let metric = L2Distance::with_math(dimension, math);
            let mut scratch = metric.scratch();
            group.bench_function(format!("{}/{dimension}", math.name()), |b| {
                b.iter(|| {
                    for target in targets {
                        let _ = black_box(
                            metric
                                .distance(black_box(query), black_box(target), &mut scratch)
                                .unwrap(),
                        );
                    }
                })
            });
        }
    }

    group.finish();
}

fn bench_popcount(c: &mut Criterion) {
    let words: Vec<u64> = (0..1024u64)
        .map(|i| i.wrapping_mul(0x9e37_79b9_7f4a_7c15))
        .collect();

    let mut group = c.benchmark_group("population_count");
    for math in [simd::portable(), simd::accelerator()] {
        group.bench_function(math.name(), |b| {
            b.iter(|| black_box(math.population_count(black_box(&words))))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_distances, bench_popcount);
criterion_main!(benches);
