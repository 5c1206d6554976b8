//! # Generator Benchmarks
//!
//! | Path | Dominant cost |
//! |------|---------------|
//! | Existence filter | O(n) fingerprint + k bit sets per entry |
//! | Segmenter bitarray | O(lsize * rsize) evaluation + line grouping |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ime_datagen::{fingerprint, ExistenceFilter, SegmenterBitarray};

fn bench_existence_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("existence-filter");

    for size in [1_000usize, 10_000, 100_000] {
        let entries: Vec<String> = (0..size).map(|i| format!("entry_{}", i)).collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("build", size), &entries, |b, entries| {
            b.iter(|| {
                let mut filter = ExistenceFilter::with_error_rate(0.001, entries.len()).unwrap();
                for e in entries {
                    filter.insert(fingerprint(e.as_bytes()));
                }
                black_box(filter.write())
            })
        });
    }

    group.finish();
}

fn bench_segmenter_bitarray(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmenter-bitarray");

    for size in [256usize, 1024, 2048] {
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::new("generate", size), &size, |b, &size| {
            b.iter(|| {
                let array =
                    SegmenterBitarray::generate(size, size, |l, r| (l % 37 + r % 11) % 3 == 0)
                        .unwrap();
                black_box(array.bitarray_bytes())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_existence_filter, bench_segmenter_bitarray);
criterion_main!(benches);
