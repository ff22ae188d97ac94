//! Quantile Calculator
//!
//! Linearly interpolated quantiles (position `(n − 1)·p`), interquartile
//! range and box-plot fences.

use crate::series::{MetricName, MetricSeriesStore};
use serde::Serialize;

/// Multiplier applied to the IQR for box-plot fences
pub const FENCE_MULTIPLIER: f64 = 1.5;

/// Sort a copy of the values ascending
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Quantile of already sorted values
///
/// `p` is clamped into [0, 1]. Returns `None` for empty input.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let p = if p.is_nan() { 0.5 } else { p.clamp(0.0, 1.0) };

    let pos = (sorted.len() - 1) as f64 * p;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Quantile of unsorted values (sorts a copy)
pub fn quantile(values: &[f64], p: f64) -> Option<f64> {
    quantile_sorted(&sorted_copy(values), p)
}

/// Interquartile range (Q3 − Q1)
pub fn interquartile_range(values: &[f64]) -> Option<f64> {
    let sorted = sorted_copy(values);
    Some(quantile_sorted(&sorted, 0.75)? - quantile_sorted(&sorted, 0.25)?)
}

/// Five-number summary with Tukey fences for one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlotStats {
    pub metric: MetricName,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub iqr: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
    /// Values outside the fences
    pub outlier_count: usize,
}

impl BoxPlotStats {
    /// Compute box-plot statistics, `None` for empty input
    pub fn compute(metric: impl Into<MetricName>, values: &[f64]) -> Option<Self> {
        let sorted = sorted_copy(values);
        let min = *sorted.first()?;
        let max = *sorted.last()?;
        let q1 = quantile_sorted(&sorted, 0.25)?;
        let median = quantile_sorted(&sorted, 0.5)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let iqr = q3 - q1;
        let lower_fence = q1 - FENCE_MULTIPLIER * iqr;
        let upper_fence = q3 + FENCE_MULTIPLIER * iqr;
        let outlier_count = sorted
            .iter()
            .filter(|&&v| v < lower_fence || v > upper_fence)
            .count();

        Some(Self {
            metric: metric.into(),
            count: sorted.len(),
            min,
            q1,
            median,
            q3,
            max,
            iqr,
            lower_fence,
            upper_fence,
            outlier_count,
        })
    }
}

/// Box-plot statistics for every metric, in metric-name order
pub fn distributions(store: &MetricSeriesStore) -> Vec<BoxPlotStats> {
    store
        .iter()
        .filter_map(|s| BoxPlotStats::compute(s.name.as_str(), &s.values))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_boundaries() {
        let values = [7.0, 1.0, 9.0, 3.0, 5.0];
        assert_eq!(quantile(&values, 0.0), Some(1.0));
        assert_eq!(quantile(&values, 1.0), Some(9.0));
        assert_eq!(quantile(&values, 0.5), Some(5.0));
    }

    #[test]
    fn test_quantile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        // position 0.25 * 3 = 0.75 → 1 + 0.75
        assert!((quantile(&values, 0.25).unwrap() - 1.75).abs() < 1e-12);
        assert!((quantile(&values, 0.5).unwrap() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_clamps_probability() {
        let values = [1.0, 2.0, 3.0];
        assert_eq!(quantile(&values, -0.5), Some(1.0));
        assert_eq!(quantile(&values, 1.5), Some(3.0));
    }

    #[test]
    fn test_quantile_empty_and_single() {
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[4.2], 0.9), Some(4.2));
    }

    #[test]
    fn test_interquartile_range() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        // Q1 = 3, Q3 = 7
        assert_eq!(interquartile_range(&values), Some(4.0));
    }

    #[test]
    fn test_box_plot_fences() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 100.0];
        let stats = BoxPlotStats::compute("focus", &values).unwrap();

        assert_eq!(stats.q1, 3.0);
        assert_eq!(stats.q3, 7.0);
        assert_eq!(stats.lower_fence, -3.0);
        assert_eq!(stats.upper_fence, 13.0);
        assert_eq!(stats.outlier_count, 1);
        assert_eq!(stats.max, 100.0);
    }
}
