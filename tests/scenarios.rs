//! End-to-end scenarios through the public API.

use journal_insights::analysis::{
    calendar_bins, correlate, detect_outliers, weekly_patterns, CorrelationDirection,
    CorrelationStrength, OutlierKind,
};
use journal_insights::config::{AnalysisConfig, CorrelationConfig, OutlierConfig, PatternConfig};
use journal_insights::ingest::load_entries;
use journal_insights::report::InsightsReportBuilder;
use journal_insights::series::{Entry, MetricSeriesStore};
use rand::prelude::*;
use rand_distr::Normal;
use std::io::Write;

fn daily(metric: &str, values: &[f64]) -> Vec<Entry> {
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let date = start + chrono::Duration::days(i as i64);
            Entry::new(date.format("%Y-%m-%d").to_string()).metric(metric, v)
        })
        .collect()
}

#[test]
fn scenario_perfect_correlation() {
    let entries: Vec<Entry> = (1..=5)
        .map(|i| {
            Entry::new(format!("2024-01-{:02}", i))
                .metric("A", i as f64)
                .metric("B", 2.0 * i as f64)
        })
        .collect();
    let store = MetricSeriesStore::build(&entries);

    let result = correlate(&store, "A", "B", &CorrelationConfig::default()).unwrap();
    assert_eq!(result.r, 1.0);
    assert_eq!(result.strength, CorrelationStrength::Strong);
    assert_eq!(result.direction, CorrelationDirection::Positive);
    assert_eq!(result.sample_size, 5);
    assert_eq!(result.description, "A positively correlates with B (r=1.00, strong)");
}

#[test]
fn scenario_single_spike_outlier() {
    let values = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 100.0];
    let store = MetricSeriesStore::build(&daily("mood", &values));

    let report = detect_outliers(&store, &OutlierConfig::default());
    assert_eq!(report.outliers.len(), 1);
    assert_eq!(report.outliers[0].entry_index, 9);
    assert_eq!(report.outliers[0].kind, OutlierKind::High);
    assert!(report.outliers[0].z_score > 2.5);
}

#[test]
fn scenario_outlier_recall() {
    for seed in 0..25 {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(50.0, 5.0).unwrap();
        let mut values: Vec<f64> = (0..20).map(|_| normal.sample(&mut rng)).collect();
        values.push(200.0);

        let store = MetricSeriesStore::build(&daily("focus", &values));
        let report = detect_outliers(&store, &OutlierConfig::default());

        assert!(
            report.outliers.iter().any(|o| o.entry_index == 20),
            "seed {}: injected value not flagged",
            seed
        );
        assert!(
            report.outliers.len() <= 3,
            "seed {}: {} values flagged",
            seed,
            report.outliers.len()
        );
        assert_eq!(report.outliers[0].entry_index, 20);
    }
}

#[test]
fn scenario_calendar_same_day_average() {
    let entries = vec![
        Entry::new("2024-01-01").metric("mood", 2.0),
        Entry::new("2024-01-01").metric("mood", 4.0),
    ];
    let store = MetricSeriesStore::build(&entries);
    let heatmap = calendar_bins(&store, "mood");

    assert_eq!(heatmap.bins.len(), 1);
    assert_eq!(heatmap.bins[0].date.to_string(), "2024-01-01");
    assert_eq!(heatmap.bins[0].average, Some(3.0));
}

#[test]
fn scenario_weekly_pattern() {
    let spiky: Vec<f64> = (0..28).map(|i| if i % 7 == 6 { 50.0 } else { 10.0 }).collect();
    let flat = vec![10.0; 28];

    let spiky_store = MetricSeriesStore::build(&daily("focus", &spiky));
    let flat_store = MetricSeriesStore::build(&daily("focus", &flat));

    let found = weekly_patterns(&spiky_store, &PatternConfig::default());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].metric, "focus");

    assert!(weekly_patterns(&flat_store, &PatternConfig::default()).is_empty());
}

#[test]
fn scenario_empty_input() {
    let report = InsightsReportBuilder::new(AnalysisConfig::default()).build(&[]);

    assert_eq!(report.overview.total_entries, 0);
    assert_eq!(report.overview.metric_count, 0);

    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    for key in [
        "trends",
        "outliers",
        "correlations",
        "densities",
        "distributions",
        "calendar_bins",
    ] {
        assert_eq!(json[key], serde_json::json!([]), "{} should be empty", key);
    }
    assert_eq!(json["patterns"]["weekly"], serde_json::json!([]));
}

#[test]
fn scenario_degenerate_inputs_have_no_nan() {
    let entries: Vec<Entry> = (1..=10)
        .map(|i| {
            Entry::new(format!("2024-04-{:02}", i))
                .metric("water", 8.0)
                .metric("mood", i as f64)
        })
        .collect();
    let report = InsightsReportBuilder::default().build(&entries);

    assert!(report
        .densities
        .iter()
        .all(|d| d.density.iter().all(|v| v.is_finite())));

    let water = report.densities.iter().find(|d| d.metric == "water").unwrap();
    assert!(water.degenerate);
    assert!(water.density.iter().all(|&d| d == 0.0));

    // Constant water never correlates
    assert!(report.correlations.is_empty());
    assert!(report.calendar_bins.iter().all(|b| b.intensity.is_some()));
}

#[test]
fn scenario_report_from_json_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    let records: Vec<serde_json::Value> = (1..=14)
        .map(|i| {
            serde_json::json!({
                "date": format!("2024-06-{:02}", i),
                "metrics": { "sleep": 6.0 + (i % 4) as f64, "mood": 3.0 + (i % 4) as f64 * 1.5 }
            })
        })
        .collect();
    write!(file, "{}", serde_json::to_string(&records).unwrap()).unwrap();

    let entries = load_entries(file.path()).unwrap().entries;
    let report = InsightsReportBuilder::default()
        .calendar_metric("sleep")
        .build(&entries);

    assert_eq!(report.overview.total_entries, 14);
    assert_eq!(
        report.overview.date_range_label.as_deref(),
        Some("Jun 1, 2024 – Jun 14, 2024")
    );
    assert_eq!(report.correlations.len(), 1);
    assert_eq!(report.correlations[0].metric_a, "mood");
    assert_eq!(report.calendar_bins.len(), 14);
}

#[test]
fn scenario_unparsable_dates_are_counted() {
    let mut entries = daily("mood", &[3.0, 4.0, 5.0, 4.0, 3.0, 4.0, 5.0, 4.0, 3.0]);
    entries.push(Entry::new("the day after").metric("mood", 100.0));

    let report = InsightsReportBuilder::default().build(&entries);

    assert_eq!(report.data_quality.unparsable_dates, 1);
    // The bad-date value still feeds the statistics
    assert_eq!(report.distributions[0].count, 10);
    // but not the calendar
    assert_eq!(report.calendar_bins.len(), 9);
    let outlier = report.outliers.iter().find(|o| o.value == 100.0).unwrap();
    assert_eq!(outlier.date, None);
    assert_eq!(outlier.date_label, "entry #9");
}
