use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use peakbin::axis::BinAxis;
use peakbin::collection::MemoryColumns;
use peakbin::combine::Combiner;
use peakbin::parallel::Backend;
use peakbin::store::PeakMatrix;

/// Build an in-memory matrix with known ragged data
fn build_matrix(columns: usize, peaks_per_column: usize) -> PeakMatrix {
    let keys: Vec<Vec<f64>> = (0..columns)
        .map(|c| {
            (0..peaks_per_column)
                .map(|p| 100.0 + ((c * 31 + p * 17) % 10_000) as f64 / 10.0)
                .collect()
        })
        .collect();
    let values: Vec<Vec<f64>> = (0..columns)
        .map(|c| (0..peaks_per_column).map(|p| (c + p) as f64).collect())
        .collect();

    let axis = BinAxis::from_range(100.0, 1100.0, 0.25).unwrap();
    PeakMatrix::new(
        Arc::new(MemoryColumns::new(keys)),
        Arc::new(MemoryColumns::new(values)),
        axis,
        0.2,
        Combiner::Sum,
    )
    .unwrap()
}

/// Benchmark the single-pass column path against naive per-cell evaluation
fn bench_column_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("column_paths");

    for peaks in [1_000usize, 10_000] {
        let matrix = build_matrix(1, peaks);
        group.throughput(Throughput::Elements(peaks as u64));

        group.bench_with_input(
            BenchmarkId::new("single_pass", peaks),
            &matrix,
            |b, matrix| b.iter(|| black_box(matrix.column(0).unwrap())),
        );

        group.bench_with_input(
            BenchmarkId::new("per_cell", peaks),
            &matrix,
            |b, matrix| {
                b.iter(|| {
                    for r in 0..matrix.num_bins() {
                        black_box(matrix.cell(r, 0).unwrap());
                    }
                })
            },
        );
    }

    group.finish();
}

/// Benchmark parallel vs sequential whole-matrix materialization
fn bench_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("backends");
    group.sample_size(20);

    let matrix = build_matrix(32, 5_000);
    for (name, backend) in [
        ("sequential", Backend::Sequential),
        ("rayon", Backend::Rayon { threads: None }),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &backend, |b, backend| {
            b.iter(|| {
                for result in matrix.columns_with(backend) {
                    black_box(result.unwrap());
                }
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_column_paths, bench_backends);
criterion_main!(benches);
