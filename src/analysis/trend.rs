//! Trend Analyzer
//!
//! Two independent views of a metric over entry order:
//!
//! 1. An ordinary least-squares line of value against position, used both for
//!    classification and as the trend-line overlay.
//! 2. A moving-average decomposition into trend and residual.

use crate::config::TrendConfig;
use crate::error::{InsightsError, InsightsResult};
use crate::series::{MetricName, MetricSeries, MetricSeriesStore};
use serde::Serialize;
use std::fmt;

/// Fitted line `value = slope · index + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Fitted value at a position
    pub fn predict(&self, index: usize) -> f64 {
        self.slope * index as f64 + self.intercept
    }
}

/// Least-squares fit of values against positions 0..n−1
///
/// `None` for empty input. A single value gives a flat line through it.
pub fn linear_regression(values: &[f64]) -> Option<LinearFit> {
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f64;
    let sum_x: f64 = (0..values.len()).map(|i| i as f64).sum();
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(i, &y)| i as f64 * y).sum();
    let sum_x2: f64 = (0..values.len()).map(|i| (i as f64).powi(2)).sum();

    let denominator = n * sum_x2 - sum_x.powi(2);
    let slope = if denominator == 0.0 {
        0.0
    } else {
        (n * sum_xy - sum_x * sum_y) / denominator
    };
    let intercept = (sum_y - slope * sum_x) / n;

    Some(LinearFit { slope, intercept })
}

/// Fitted line evaluated at every position
pub fn trend_line(values: &[f64]) -> Vec<f64> {
    match linear_regression(values) {
        Some(fit) => (0..values.len()).map(|i| fit.predict(i)).collect(),
        None => Vec::new(),
    }
}

/// Centered moving average
///
/// The window `[i − w/2, i + w/2]` is clamped to the series, so it shrinks
/// near both ends instead of wrapping or padding. `w/2` rounds down, so an
/// even window spans `w + 1` values: 4 averages the same neighbours as 5.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let half = window / 2;

    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0);
    for v in values {
        prefix.push(prefix[prefix.len() - 1] + v);
    }

    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half).min(n - 1);
            (prefix[hi + 1] - prefix[lo]) / (hi - lo + 1) as f64
        })
        .collect()
}

/// Split values into moving-average trend and residual
pub fn decompose(values: &[f64], window: usize) -> (Vec<f64>, Vec<f64>) {
    let trend = moving_average(values, window);
    let residual = values.iter().zip(&trend).map(|(v, t)| v - t).collect();
    (trend, residual)
}

/// Original, trend and residual sequences for one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decomposition {
    pub metric: MetricName,
    pub window: usize,
    /// Date label of each value's entry
    pub dates: Vec<String>,
    pub original: Vec<f64>,
    pub trend: Vec<f64>,
    pub residual: Vec<f64>,
}

/// Decompose one metric
pub fn decompose_metric(
    store: &MetricSeriesStore,
    metric: &str,
    window: usize,
) -> InsightsResult<Decomposition> {
    if window == 0 {
        return Err(InsightsError::InvalidWindow(window));
    }
    let series = store
        .series(metric)
        .ok_or_else(|| InsightsError::MetricNotFound(metric.to_string()))?;

    let (trend, residual) = decompose(&series.values, window);
    let dates = series
        .source_entry_index
        .iter()
        .map(|&i| store.date_label(i))
        .collect();

    Ok(Decomposition {
        metric: series.name.clone(),
        window,
        dates,
        original: series.values.clone(),
        trend,
        residual,
    })
}

/// Classified direction of a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Improving => f.pad("improving"),
            TrendDirection::Declining => f.pad("declining"),
            TrendDirection::Stable => f.pad("stable"),
        }
    }
}

/// Trend classification for one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendResult {
    pub metric: MetricName,
    pub slope: f64,
    pub intercept: f64,
    pub direction: TrendDirection,
    /// Mean of the last `recent_window` values
    pub recent_average: f64,
    /// Mean of up to `recent_window` values just before the recent window
    pub older_average: f64,
    pub sample_size: usize,
    pub description: String,
}

impl TrendResult {
    /// `recent_average − older_average`
    pub fn change(&self) -> f64 {
        self.recent_average - self.older_average
    }
}

/// Classify a metric's trend
///
/// The slope decides stable versus moving. When the series is no longer than
/// `recent_window` there is no older window to compare against: a flat series
/// is still reported as stable (both averages are the overall mean), a
/// moving one is left out.
pub fn classify_trend(series: &MetricSeries, config: &TrendConfig) -> Option<TrendResult> {
    let values = &series.values;
    let n = values.len();
    let window = config.recent_window.max(1);
    let fit = linear_regression(values)?;
    let stable = fit.slope.abs() <= config.stable_slope;

    let (recent_average, older_average) = if n > window {
        let recent = &values[n - window..];
        let older = &values[(n - window).saturating_sub(window)..n - window];
        (
            recent.iter().sum::<f64>() / recent.len() as f64,
            older.iter().sum::<f64>() / older.len() as f64,
        )
    } else if stable {
        let overall = values.iter().sum::<f64>() / n as f64;
        (overall, overall)
    } else {
        return None;
    };
    let change = recent_average - older_average;

    let (direction, description) = if stable {
        (
            TrendDirection::Stable,
            format!("No significant trend ({:+.2})", change),
        )
    } else if recent_average > older_average {
        (TrendDirection::Improving, format!("Improving ({:+.2})", change))
    } else {
        (TrendDirection::Declining, format!("Declining ({:+.2})", change))
    };

    Some(TrendResult {
        metric: series.name.clone(),
        slope: fit.slope,
        intercept: fit.intercept,
        direction,
        recent_average,
        older_average,
        sample_size: n,
        description,
    })
}

/// Trend classification for every metric with enough values
pub fn analyze_trends(store: &MetricSeriesStore, config: &TrendConfig) -> Vec<TrendResult> {
    let trends: Vec<TrendResult> = store
        .iter()
        .filter_map(|s| classify_trend(s, config))
        .collect();

    tracing::debug!(
        metrics = store.metric_count(),
        classified = trends.len(),
        "Analyzed trends"
    );

    trends
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Entry;

    fn series(name: &str, values: &[f64]) -> MetricSeries {
        let entries: Vec<Entry> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Entry::new(format!("2024-03-{:02}", i + 1)).metric(name, v))
            .collect();
        MetricSeriesStore::build(&entries)
            .series(name)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_linear_regression_exact_line() {
        let values = [1.0, 3.0, 5.0, 7.0, 9.0];
        let fit = linear_regression(&values).unwrap();

        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.predict(10) - 21.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_regression_degenerate() {
        assert!(linear_regression(&[]).is_none());

        let fit = linear_regression(&[4.0]).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.intercept, 4.0);
    }

    #[test]
    fn test_trend_line_overlay() {
        let line = trend_line(&[2.0, 2.0, 2.0]);
        assert_eq!(line, vec![2.0, 2.0, 2.0]);
        assert!(trend_line(&[]).is_empty());
    }

    #[test]
    fn test_moving_average_clamps_edges() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let trend = moving_average(&values, 5);

        // index 0 averages [0..=2], index 1 averages [0..=3]
        assert!((trend[0] - 2.0).abs() < 1e-12);
        assert!((trend[1] - 2.5).abs() < 1e-12);
        assert!((trend[2] - 3.0).abs() < 1e-12);
        assert!((trend[5] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_moving_average_even_window_rounds_up() {
        let values = [1.0, 4.0, 2.0, 8.0, 5.0, 7.0];
        assert_eq!(moving_average(&values, 4), moving_average(&values, 5));
        assert_eq!(moving_average(&values, 2), moving_average(&values, 3));
    }

    #[test]
    fn test_moving_average_window_one_is_identity() {
        let values = [3.0, 9.0, 1.0];
        assert_eq!(moving_average(&values, 1), values.to_vec());
    }

    #[test]
    fn test_decomposition_identity() {
        let values = [5.0, 7.5, 6.0, 9.0, 4.0, 8.0, 7.0];
        let (trend, residual) = decompose(&values, 5);

        for i in 0..values.len() {
            assert!((trend[i] + residual[i] - values[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_decompose_metric() {
        let entries = vec![
            Entry::new("2024-03-01").metric("mood", 5.0),
            Entry::new("2024-03-02").metric("sleep", 7.0),
            Entry::new("2024-03-03").metric("mood", 7.0),
        ];
        let store = MetricSeriesStore::build(&entries);
        let decomposition = decompose_metric(&store, "mood", 3).unwrap();

        assert_eq!(decomposition.dates, vec!["2024-03-01", "2024-03-03"]);
        assert_eq!(decomposition.original, vec![5.0, 7.0]);
        assert_eq!(decomposition.trend, vec![6.0, 6.0]);
        assert_eq!(decomposition.residual, vec![-1.0, 1.0]);
    }

    #[test]
    fn test_decompose_metric_errors() {
        let store = MetricSeriesStore::build(&[Entry::new("2024-03-01").metric("mood", 5.0)]);

        assert_eq!(
            decompose_metric(&store, "energy", 5).unwrap_err(),
            InsightsError::MetricNotFound("energy".to_string())
        );
        assert_eq!(
            decompose_metric(&store, "mood", 0).unwrap_err(),
            InsightsError::InvalidWindow(0)
        );
    }

    #[test]
    fn test_classify_improving() {
        let s = series("mood", &[3.0, 3.5, 4.0, 4.0, 4.5, 5.0, 5.5, 6.0, 6.5, 7.0]);
        let result = classify_trend(&s, &TrendConfig::default()).unwrap();

        assert_eq!(result.direction, TrendDirection::Improving);
        assert!((result.recent_average - 6.0).abs() < 1e-12);
        assert!((result.older_average - 3.8).abs() < 1e-12);
        assert_eq!(result.description, "Improving (+2.20)");
    }

    #[test]
    fn test_classify_declining() {
        let s = series("energy", &[9.0, 8.0, 8.5, 7.0, 6.0, 5.5, 4.0, 3.0]);
        let result = classify_trend(&s, &TrendConfig::default()).unwrap();

        assert_eq!(result.direction, TrendDirection::Declining);
        assert!(result.slope < -0.1);
        assert!(result.description.starts_with("Declining (-"));
    }

    #[test]
    fn test_classify_stable() {
        let s = series("focus", &[5.0, 5.1, 4.9, 5.0, 5.2, 4.8, 5.0, 5.1]);
        let result = classify_trend(&s, &TrendConfig::default()).unwrap();

        assert_eq!(result.direction, TrendDirection::Stable);
        assert!(result.description.starts_with("No significant trend"));
    }

    #[test]
    fn test_classify_short_older_window() {
        // 7 values: recent = last 5, older = the 2 before them
        let s = series("mood", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let result = classify_trend(&s, &TrendConfig::default()).unwrap();

        assert!((result.older_average - 1.5).abs() < 1e-12);
        assert!((result.recent_average - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_classify_short_moving_series_is_omitted() {
        let s = series("mood", &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(classify_trend(&s, &TrendConfig::default()).is_none());
    }

    #[test]
    fn test_classify_short_flat_series_is_stable() {
        let s = series("water", &[5.0; 5]);
        let result = classify_trend(&s, &TrendConfig::default()).unwrap();

        assert_eq!(result.direction, TrendDirection::Stable);
        assert_eq!(result.sample_size, 5);
        assert_eq!(result.recent_average, 5.0);
        assert_eq!(result.older_average, 5.0);
        assert_eq!(result.description, "No significant trend (+0.00)");

        let single = series("water", &[3.0]);
        let result = classify_trend(&single, &TrendConfig::default()).unwrap();
        assert_eq!(result.direction, TrendDirection::Stable);
    }

    #[test]
    fn test_analyze_trends_keeps_short_flat_metrics() {
        let entries: Vec<Entry> = (1..=5)
            .map(|i| Entry::new(format!("2024-03-{:02}", i)).metric("water", 5.0))
            .collect();
        let store = MetricSeriesStore::build(&entries);
        let trends = analyze_trends(&store, &TrendConfig::default());

        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].metric, "water");
    }
}
