//! Criterion benchmarks for the cleaning and feature pipeline.
//!
//! Benchmarks:
//! 1. Full in-memory `process` over tables of increasing length
//! 2. Rolling window statistics on a long close series
//! 3. Model training on a cleaned table

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use stocklens_core::features::{RollingMean, RollingStd, SeriesFeature, MOVING_AVG_WINDOW};
use stocklens_core::model::{train, TrainConfig};
use stocklens_core::{process, RawRecord, RawTable};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_records(n: usize) -> Vec<RawRecord> {
    let base = chrono::NaiveDate::from_ymd_opt(2015, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0 + (i as f64 * 0.037).cos();
            RawRecord {
                timestamp: Some((base + chrono::Duration::days(i as i64)).to_string()),
                open: (i % 17 != 0).then_some(close - 0.3),
                high: Some(close + 1.5 + (i as f64 * 0.7).sin().abs()),
                low: Some(close - 1.5 - (i as f64 * 0.3).cos().abs()),
                close: Some(close),
                volume: Some(1_000_000.0 + (i % 5_000) as f64 * 97.0),
            }
        })
        .collect()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("process");
    for n in [250usize, 2_500, 25_000] {
        let records = make_records(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &records, |b, records| {
            b.iter(|| process(black_box(RawTable::new(records.clone())), "BENCH").unwrap())
        });
    }
    group.finish();
}

fn bench_rolling(c: &mut Criterion) {
    let closes: Vec<Option<f64>> = make_records(10_000).iter().map(|r| r.close).collect();
    let mean = RollingMean::new(MOVING_AVG_WINDOW, "20_day_moving_avg");
    let std = RollingStd::new(MOVING_AVG_WINDOW, "rolling_volatility");
    c.bench_function("rolling_mean_10k", |b| b.iter(|| mean.compute(black_box(&closes))));
    c.bench_function("rolling_std_10k", |b| b.iter(|| std.compute(black_box(&closes))));
}

fn bench_train(c: &mut Criterion) {
    let table = process(RawTable::new(make_records(2_500)), "BENCH").unwrap().table;
    let config = TrainConfig::default();
    c.bench_function("train_2500", |b| b.iter(|| train(black_box(&table), &config).unwrap()));
}

criterion_group!(benches, bench_process, bench_rolling, bench_train);
criterion_main!(benches);
