/// Benchmarks for ranking with ties.
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use desa_dashboard::ranking::{rank, Tally};

fn tallies(size: usize, distinct_counts: u64) -> Vec<Tally> {
    (0..size)
        .map(|i| Tally::with_id(format!("v{i}"), format!("Desa {i}"), i as u64 % distinct_counts))
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    for size in [100, 10_000, 100_000] {
        // Few distinct counts produce long runs of ties.
        for distinct_counts in [5, 1_000_000] {
            let items = tallies(size, distinct_counts);
            for limit in [None, Some(5)] {
                let name = format!("rank({size}, {distinct_counts}, {limit:?})");
                c.bench_function(&name, |b| {
                    b.iter(|| rank(black_box(items.clone()), limit))
                });
            }
        }
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
