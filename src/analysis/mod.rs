//! Analyzers
//!
//! Each analyzer is a set of free functions over a [`MetricSeriesStore`].
//! They never fail on thin or degenerate data: results that need more points
//! are omitted and zero-spread inputs get defined fallbacks.
//!
//! [`MetricSeriesStore`]: crate::series::MetricSeriesStore

pub mod calendar;
pub mod correlation;
pub mod density;
pub mod outliers;
pub mod patterns;
pub mod quantile;
pub mod stats;
pub mod trend;

pub use calendar::{calendar_bins, CalendarBin, CalendarHeatmap};
pub use correlation::{
    all_correlations, correlate, correlation_matrix, correlations_for_metric,
    pearson_correlation, strong_correlations, CorrelationDirection, CorrelationMatrix,
    CorrelationResult, CorrelationStrength,
};
pub use density::{evaluate_density, kernel_density, metric_densities, DensityCurve};
pub use outliers::{detect_outliers, Outlier, OutlierKind, OutlierReport};
pub use patterns::{
    consistency_scores, most_consistent, weekly_pattern, weekly_patterns, ConsistencyScore,
    WeeklyPattern,
};
pub use quantile::{distributions, quantile, BoxPlotStats};
pub use stats::SummaryStats;
pub use trend::{
    analyze_trends, classify_trend, decompose, decompose_metric, linear_regression,
    moving_average, Decomposition, LinearFit, TrendDirection, TrendResult,
};
