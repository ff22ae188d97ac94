//! Correlation Analyzer
//!
//! Pearson correlation between every pair of metrics. Two series are paired
//! on the entries that recorded both metrics; entries missing either metric
//! are left out of that pair only.

use crate::analysis::stats::mean;
use crate::config::CorrelationConfig;
use crate::error::{InsightsError, InsightsResult};
use crate::series::{MetricName, MetricSeries, MetricSeriesStore};
use serde::Serialize;
use std::fmt;

/// Strength bucket of a correlation coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationStrength {
    None,
    Moderate,
    Strong,
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationStrength::None => f.pad("none"),
            CorrelationStrength::Moderate => f.pad("moderate"),
            CorrelationStrength::Strong => f.pad("strong"),
        }
    }
}

/// Sign of a correlation coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationDirection {
    Positive,
    Negative,
}

impl fmt::Display for CorrelationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationDirection::Positive => f.pad("positive"),
            CorrelationDirection::Negative => f.pad("negative"),
        }
    }
}

/// A correlation between two metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationResult {
    /// First metric name
    pub metric_a: MetricName,
    /// Second metric name
    pub metric_b: MetricName,
    /// Pearson correlation coefficient (-1 to 1)
    pub r: f64,
    pub strength: CorrelationStrength,
    pub direction: CorrelationDirection,
    /// Number of paired entries used
    pub sample_size: usize,
    pub description: String,
}

/// Full pairwise view for matrix and network displays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    /// Row/column order
    pub metrics: Vec<MetricName>,
    /// `cells[i][j]` is r for metrics i and j, `None` with too few paired
    /// points. The diagonal is always 1.0.
    pub cells: Vec<Vec<Option<f64>>>,
    /// Off-diagonal pairs with |r| at or above the threshold
    pub edges: Vec<CorrelationResult>,
    pub min_correlation: f64,
}

/// Pair two series on the entries that recorded both
///
/// Both index lists are strictly increasing, so a single merge pass is enough.
pub fn paired_values(a: &MetricSeries, b: &MetricSeries) -> (Vec<f64>, Vec<f64>) {
    let mut paired_a = Vec::new();
    let mut paired_b = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        let (ia, ib) = (a.source_entry_index[i], b.source_entry_index[j]);
        if ia == ib {
            paired_a.push(a.values[i]);
            paired_b.push(b.values[j]);
            i += 1;
            j += 1;
        } else if ia < ib {
            i += 1;
        } else {
            j += 1;
        }
    }

    (paired_a, paired_b)
}

/// Calculate Pearson correlation coefficient
///
/// Returns a value between -1 and 1:
/// - 1: perfect positive correlation
/// - 0: no correlation, or either series has zero variance
/// - -1: perfect negative correlation
///
/// Uses mean-centred sums, algebraically equal to
/// `(nΣxy − ΣxΣy) / sqrt((nΣx² − (Σx)²)(nΣy² − (Σy)²))`.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.is_empty() {
        return 0.0;
    }
    if is_constant(x) || is_constant(y) {
        return 0.0;
    }
    // Identical series correlate exactly
    if x == y {
        return 1.0;
    }

    let (Some(mean_x), Some(mean_y)) = (mean(x), mean(y)) else {
        return 0.0;
    };

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y.iter()) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denominator = (sxx * syy).sqrt();
    let r = sxy / denominator;
    if denominator == 0.0 || !r.is_finite() {
        0.0
    } else {
        r.clamp(-1.0, 1.0)
    }
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Convert correlation coefficient to a strength bucket
pub fn classify_strength(r: f64, config: &CorrelationConfig) -> CorrelationStrength {
    let abs_r = r.abs();
    if abs_r > config.strong {
        CorrelationStrength::Strong
    } else if abs_r > config.moderate {
        CorrelationStrength::Moderate
    } else {
        CorrelationStrength::None
    }
}

fn describe(a: &str, b: &str, r: f64, strength: CorrelationStrength) -> String {
    match strength {
        CorrelationStrength::None => {
            format!("{} shows no notable correlation with {} (r={:.2})", a, b, r)
        }
        _ => format!(
            "{} {} correlates with {} (r={:.2}, {})",
            a,
            if r >= 0.0 { "positively" } else { "negatively" },
            b,
            r,
            strength
        ),
    }
}

fn correlate_series(
    a: &MetricSeries,
    b: &MetricSeries,
    config: &CorrelationConfig,
) -> Option<CorrelationResult> {
    let (xs, ys) = paired_values(a, b);
    if xs.len() < config.min_points.max(1) {
        return None;
    }

    let r = pearson_correlation(&xs, &ys);
    let strength = classify_strength(r, config);

    Some(CorrelationResult {
        metric_a: a.name.clone(),
        metric_b: b.name.clone(),
        r,
        strength,
        direction: if r >= 0.0 {
            CorrelationDirection::Positive
        } else {
            CorrelationDirection::Negative
        },
        sample_size: xs.len(),
        description: describe(&a.name, &b.name, r, strength),
    })
}

/// Correlate two named metrics
///
/// `None` when either metric is missing or they share fewer than
/// `min_points` entries.
pub fn correlate(
    store: &MetricSeriesStore,
    metric_a: &str,
    metric_b: &str,
    config: &CorrelationConfig,
) -> Option<CorrelationResult> {
    correlate_series(store.series(metric_a)?, store.series(metric_b)?, config)
}

/// Correlations for every metric pair with enough paired entries
///
/// Pairs follow metric-name order (a before b).
pub fn all_correlations(
    store: &MetricSeriesStore,
    config: &CorrelationConfig,
) -> Vec<CorrelationResult> {
    let series: Vec<&MetricSeries> = store.iter().collect();
    let mut correlations = Vec::new();

    for i in 0..series.len() {
        for j in (i + 1)..series.len() {
            if let Some(result) = correlate_series(series[i], series[j], config) {
                correlations.push(result);
            }
        }
    }

    tracing::debug!(
        metrics = series.len(),
        pairs = correlations.len(),
        "Calculated pairwise correlations"
    );

    correlations
}

/// Moderate or stronger correlations, strongest first
pub fn strong_correlations(
    store: &MetricSeriesStore,
    config: &CorrelationConfig,
) -> Vec<CorrelationResult> {
    let mut correlations: Vec<CorrelationResult> = all_correlations(store, config)
        .into_iter()
        .filter(|c| c.strength != CorrelationStrength::None)
        .collect();

    correlations.sort_by(|a, b| b.r.abs().total_cmp(&a.r.abs()));
    correlations
}

/// Correlations involving one metric
pub fn correlations_for_metric(
    store: &MetricSeriesStore,
    metric: &str,
    config: &CorrelationConfig,
) -> Vec<CorrelationResult> {
    all_correlations(store, config)
        .into_iter()
        .filter(|c| c.metric_a == metric || c.metric_b == metric)
        .collect()
}

/// Build the full correlation matrix
///
/// `min_correlation` filters the edge list only; every cell is filled and
/// the diagonal is always 1.0.
pub fn correlation_matrix(
    store: &MetricSeriesStore,
    min_correlation: f64,
    config: &CorrelationConfig,
) -> InsightsResult<CorrelationMatrix> {
    if !(0.0..=1.0).contains(&min_correlation) {
        return Err(InsightsError::InvalidThreshold {
            name: "min_correlation",
            value: min_correlation,
        });
    }

    let series: Vec<&MetricSeries> = store.iter().collect();
    let n = series.len();
    let mut cells = vec![vec![None; n]; n];
    let mut edges = Vec::new();

    for i in 0..n {
        cells[i][i] = Some(1.0);
        for j in (i + 1)..n {
            if let Some(result) = correlate_series(series[i], series[j], config) {
                cells[i][j] = Some(result.r);
                cells[j][i] = Some(result.r);
                if result.r.abs() >= min_correlation {
                    edges.push(result);
                }
            }
        }
    }

    Ok(CorrelationMatrix {
        metrics: series.iter().map(|s| s.name.clone()).collect(),
        cells,
        edges,
        min_correlation,
    })
}
