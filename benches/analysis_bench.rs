//! Benchmarks for the analyzers
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use journal_insights::analysis::{
    all_correlations, analyze_trends, calendar_bins, detect_outliers, distributions,
    metric_densities,
};
use journal_insights::config::AnalysisConfig;
use journal_insights::report::InsightsReportBuilder;
use journal_insights::series::{Entry, MetricSeriesStore};

const METRICS: [&str; 6] = ["mood", "sleep", "energy", "focus", "stress", "steps"];

/// Deterministic entries, one per day, with some metrics left out
fn create_test_entries(count: usize) -> Vec<Entry> {
    let start = chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    (0..count)
        .map(|i| {
            let date = start + chrono::Duration::days(i as i64);
            let mut entry = Entry::new(date.format("%Y-%m-%d").to_string());
            for (m, name) in METRICS.iter().enumerate() {
                if (i + m) % 11 == 0 {
                    continue;
                }
                let phase = (i as f64 * 0.37 + m as f64).sin();
                entry = entry.metric(*name, 5.0 + 2.0 * phase + (i % 7) as f64 * 0.1);
            }
            entry
        })
        .collect()
}

fn bench_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");

    for size in [1_000, 10_000, 50_000] {
        let entries = create_test_entries(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("build", size), &entries, |b, entries| {
            b.iter(|| MetricSeriesStore::build(black_box(entries)))
        });
    }

    group.finish();
}

fn bench_analyzers(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyzers");
    let config = AnalysisConfig::default();

    for size in [1_000, 10_000, 50_000] {
        let store = MetricSeriesStore::build(&create_test_entries(size));
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("correlations", size), &store, |b, s| {
            b.iter(|| all_correlations(black_box(s), &config.correlation))
        });
        group.bench_with_input(BenchmarkId::new("trends", size), &store, |b, s| {
            b.iter(|| analyze_trends(black_box(s), &config.trend))
        });
        group.bench_with_input(BenchmarkId::new("outliers", size), &store, |b, s| {
            b.iter(|| detect_outliers(black_box(s), &config.outliers))
        });
        group.bench_with_input(BenchmarkId::new("density", size), &store, |b, s| {
            b.iter(|| metric_densities(black_box(s), &config.density))
        });
        group.bench_with_input(BenchmarkId::new("quantiles", size), &store, |b, s| {
            b.iter(|| distributions(black_box(s)))
        });
        group.bench_with_input(BenchmarkId::new("calendar", size), &store, |b, s| {
            b.iter(|| calendar_bins(black_box(s), "mood"))
        });
    }

    group.finish();
}

fn bench_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("report");
    group.sample_size(20);

    let builder = InsightsReportBuilder::new(AnalysisConfig::default());
    for size in [10_000, 50_000] {
        let entries = create_test_entries(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("full", size), &entries, |b, entries| {
            b.iter(|| builder.build(black_box(entries)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_store, bench_analyzers, bench_report);
criterion_main!(benches);
