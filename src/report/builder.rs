//! Insights report builder
//!
//! Runs every analyzer over one store and assembles the results.

use super::types::{DateRange, InsightsReport, Overview, PatternFindings};
use crate::analysis::{
    analyze_trends, calendar_bins, consistency_scores, detect_outliers, distributions,
    metric_densities, most_consistent, strong_correlations, weekly_patterns,
};
use crate::config::AnalysisConfig;
use crate::series::{Entry, MetricName, MetricSeriesStore};

const DAYS_PER_WEEK: f64 = 7.0;

/// Builder for [`InsightsReport`]
///
/// ```
/// use journal_insights::config::AnalysisConfig;
/// use journal_insights::report::InsightsReportBuilder;
/// use journal_insights::series::Entry;
///
/// let entries = vec![
///     Entry::new("2024-01-01").metric("mood", 6.0),
///     Entry::new("2024-01-02").metric("mood", 7.0),
/// ];
/// let report = InsightsReportBuilder::new(AnalysisConfig::default())
///     .calendar_metric("mood")
///     .build(&entries);
///
/// assert_eq!(report.overview.total_entries, 2);
/// assert_eq!(report.calendar_bins.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InsightsReportBuilder {
    config: AnalysisConfig,
    calendar_metric: Option<MetricName>,
}

impl InsightsReportBuilder {
    /// Create a builder with the given thresholds
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            calendar_metric: None,
        }
    }

    /// Choose the metric for the calendar section
    ///
    /// Defaults to the metric with the most values.
    pub fn calendar_metric(mut self, metric: impl Into<MetricName>) -> Self {
        self.calendar_metric = Some(metric.into());
        self
    }

    /// Build a report from raw entries
    pub fn build(&self, entries: &[Entry]) -> InsightsReport {
        self.build_from_store(&MetricSeriesStore::build(entries))
    }

    /// Build a report from an existing store
    pub fn build_from_store(&self, store: &MetricSeriesStore) -> InsightsReport {
        let config = &self.config;

        let outlier_report = detect_outliers(store, &config.outliers);

        let calendar_metric = self
            .calendar_metric
            .clone()
            .or_else(|| store.most_recorded_metric().map(str::to_string));
        let calendar = calendar_metric
            .as_deref()
            .map(|metric| calendar_bins(store, metric).bins)
            .unwrap_or_default();

        let report = InsightsReport {
            overview: overview(store),
            trends: analyze_trends(store, &config.trend),
            outliers: outlier_report.outliers,
            total_outliers: outlier_report.total_flagged,
            correlations: strong_correlations(store, &config.correlation),
            densities: metric_densities(store, &config.density),
            distributions: distributions(store),
            calendar_metric,
            calendar_bins: calendar,
            patterns: PatternFindings {
                weekly: weekly_patterns(store, &config.patterns),
                consistency: consistency_scores(store),
            },
            data_quality: store.data_quality(),
        };

        tracing::info!(
            entries = report.overview.total_entries,
            metrics = report.overview.metric_count,
            trends = report.trends.len(),
            outliers = report.outliers.len(),
            correlations = report.correlations.len(),
            "Built insights report"
        );

        report
    }
}

fn overview(store: &MetricSeriesStore) -> Overview {
    let total_entries = store.entry_count();
    let date_range = store
        .date_range()
        .map(|(start, end)| DateRange { start, end });

    let weeks = date_range
        .map(|r| r.days_span() as f64 / DAYS_PER_WEEK)
        .unwrap_or(0.0)
        .max(1.0);

    Overview {
        total_entries,
        metric_count: store.metric_count(),
        date_range,
        date_range_label: date_range.map(|r| r.label()),
        average_entries_per_week: total_entries as f64 / weeks,
        most_consistent_metric: most_consistent(store),
    }
}
