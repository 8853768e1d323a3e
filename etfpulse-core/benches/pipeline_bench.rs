//! Criterion benchmarks for the indicator pipeline.
//!
//! Benchmarks:
//! 1. Return series construction
//! 2. Rolling classifier across window lengths
//! 3. Short-horizon projector
//! 4. Full frame assembly and ranking snapshot

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use etfpulse_core::domain::{PriceSample, PriceSeries};
use etfpulse_core::indicators::{build_returns, RollingClassifier, ShortHorizonProjector};
use etfpulse_core::{Indicator, SeriesAssembler};

// ── Helpers ──────────────────────────────────────────────────────────

/// Hourly prices tracing a slow sine, ~6 months of trading hours at n = 900.
fn make_prices(n: usize) -> PriceSeries {
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
    let samples = (0..n)
        .map(|i| {
            let price = 100.0 + (i as f64 * 0.1).sin() * 10.0 + i as f64 * 0.01;
            PriceSample::new(base + Duration::hours(i as i64), price)
        })
        .collect();
    PriceSeries::new(samples).unwrap()
}

fn bench_returns(c: &mut Criterion) {
    let mut group = c.benchmark_group("returns");
    for n in [900usize, 10_000] {
        let prices = make_prices(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &prices, |b, prices| {
            b.iter(|| black_box(build_returns(black_box(prices))));
        });
    }
    group.finish();
}

fn bench_classifier(c: &mut Criterion) {
    let mut group = c.benchmark_group("classifier");
    let returns = build_returns(&make_prices(10_000));
    for num_bars in [20usize, 100, 500] {
        let classifier = RollingClassifier::new(num_bars);
        group.bench_with_input(
            BenchmarkId::from_parameter(num_bars),
            &classifier,
            |b, classifier| {
                b.iter(|| black_box(classifier.compute(black_box(&returns))));
            },
        );
    }
    group.finish();
}

fn bench_projector(c: &mut Criterion) {
    let returns = build_returns(&make_prices(10_000));
    let projector = ShortHorizonProjector::default();
    c.bench_function("projector_10000", |b| {
        b.iter(|| black_box(projector.compute(black_box(&returns))));
    });
}

fn bench_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("assembly");
    let prices = make_prices(900);
    let assembler = SeriesAssembler::default();

    group.bench_function("frames_900", |b| {
        b.iter(|| black_box(assembler.frames(black_box(&prices))));
    });

    // 10 days of hourly bars: the ranking-table fetch size.
    let short = make_prices(70);
    group.bench_function("snapshot_70", |b| {
        b.iter(|| black_box(assembler.snapshot_row("BENCH", black_box(&short))));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_returns,
    bench_classifier,
    bench_projector,
    bench_assembly,
);
criterion_main!(benches);
