//! Duration estimation benchmarks
//!
//! Run with: cargo bench -p cadence_animation --bench estimate

use cadence_animation::{estimate_duration, PlayType};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate_duration");

    for count in [4usize, 16, 256] {
        let durations: Vec<f64> = (0..count).map(|i| 50.0 + (i % 7) as f64 * 40.0).collect();

        for play_type in [PlayType::Together, PlayType::Sequential, PlayType::Interval] {
            group.bench_with_input(
                BenchmarkId::new(play_type.as_str(), count),
                &durations,
                |b, durations| {
                    b.iter(|| {
                        estimate_duration(
                            black_box(durations.iter().copied()),
                            play_type,
                            black_box(100.0),
                        )
                    })
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_estimate);
criterion_main!(benches);
