//! Outlier Detector
//!
//! Flags values whose population z-score exceeds a threshold. Results from
//! all metrics are merged and capped for reporting; the cap does not limit
//! what is computed.

use crate::analysis::stats::{mean, population_std_dev, z_score};
use crate::config::OutlierConfig;
use crate::series::{MetricName, MetricSeries, MetricSeriesStore};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Which side of the mean an outlier falls on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierKind {
    High,
    Low,
}

impl fmt::Display for OutlierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutlierKind::High => f.pad("high"),
            OutlierKind::Low => f.pad("low"),
        }
    }
}

/// A single flagged value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outlier {
    /// Entry date, `None` when the entry's date did not parse
    pub date: Option<NaiveDate>,
    /// ISO date or a positional fallback label
    pub date_label: String,
    pub entry_index: usize,
    pub metric: MetricName,
    pub value: f64,
    /// |value − mean| / std_dev
    pub z_score: f64,
    pub kind: OutlierKind,
    pub description: String,
}

/// Merged outliers across metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutlierReport {
    /// Highest z-scores first, capped at `max_reported`
    pub outliers: Vec<Outlier>,
    /// Number flagged before the cap
    pub total_flagged: usize,
    /// Metrics that had enough values to be checked
    pub metrics_checked: usize,
}

/// Outliers in one metric, in entry order
///
/// Empty when the series has fewer than `min_points` values or zero spread.
pub fn metric_outliers(
    store: &MetricSeriesStore,
    series: &MetricSeries,
    config: &OutlierConfig,
) -> Vec<Outlier> {
    if series.len() < config.min_points {
        return Vec::new();
    }
    let (Some(mean), Some(std_dev)) = (mean(&series.values), population_std_dev(&series.values))
    else {
        return Vec::new();
    };

    series
        .points()
        .filter_map(|(entry_index, value)| {
            let z_score = z_score(value, mean, std_dev)?;
            if !(z_score > config.z_threshold) {
                return None;
            }

            let kind = if value > mean {
                OutlierKind::High
            } else {
                OutlierKind::Low
            };
            let date_label = store.date_label(entry_index);
            let description = format!(
                "{} on {} was unusually {} ({:.2}, z-score {:.2}, mean {:.2})",
                series.name, date_label, kind, value, z_score, mean
            );

            Some(Outlier {
                date: store.date_of(entry_index),
                date_label,
                entry_index,
                metric: series.name.clone(),
                value,
                z_score,
                kind,
                description,
            })
        })
        .collect()
}

/// Outliers across all metrics, strongest first
///
/// Ties keep metric-name then entry order.
pub fn detect_outliers(store: &MetricSeriesStore, config: &OutlierConfig) -> OutlierReport {
    let mut outliers = Vec::new();
    let mut metrics_checked = 0;

    for series in store.iter() {
        if series.len() >= config.min_points {
            metrics_checked += 1;
        }
        outliers.extend(metric_outliers(store, series, config));
    }

    let total_flagged = outliers.len();
    outliers.sort_by(|a, b| b.z_score.total_cmp(&a.z_score));
    outliers.truncate(config.max_reported);

    tracing::debug!(
        metrics_checked,
        total_flagged,
        reported = outliers.len(),
        "Detected outliers"
    );

    OutlierReport {
        outliers,
        total_flagged,
        metrics_checked,
    }
}
