//! Density Estimator
//!
//! Gaussian kernel density estimation with Silverman's rule-of-thumb
//! bandwidth, sampled at evenly spaced points across the observed range.

use crate::analysis::stats::SummaryStats;
use crate::config::DensityConfig;
use crate::series::{MetricName, MetricSeriesStore};
use serde::Serialize;
use std::f64::consts::PI;

/// Sampled density curve for one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityCurve {
    pub metric: MetricName,
    /// Silverman bandwidth, 0 for a degenerate curve
    pub bandwidth: f64,
    /// True when every value was identical
    pub degenerate: bool,
    pub x_values: Vec<f64>,
    pub density: Vec<f64>,
}

impl DensityCurve {
    /// Trapezoidal approximation of the area under the sampled curve
    pub fn area(&self) -> f64 {
        self.x_values
            .windows(2)
            .zip(self.density.windows(2))
            .map(|(x, d)| (x[1] - x[0]) * (d[0] + d[1]) / 2.0)
            .sum()
    }
}

/// Standard normal kernel φ(u)
pub fn gaussian_kernel(u: f64) -> f64 {
    (-0.5 * u * u).exp() / (2.0 * PI).sqrt()
}

/// Silverman's rule: h = 1.06 · σ · n^(−1/5)
pub fn silverman_bandwidth(std_dev: f64, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    1.06 * std_dev * (n as f64).powf(-0.2)
}

/// Kernel density estimate at `x` with the given bandwidth
///
/// `(1 / (n·h)) Σ φ((x − vᵢ) / h)`; 0 for empty input or a non-positive
/// bandwidth.
pub fn evaluate_density(values: &[f64], bandwidth: f64, x: f64) -> f64 {
    if values.is_empty() || bandwidth <= 0.0 {
        return 0.0;
    }
    let norm = 1.0 / (values.len() as f64 * bandwidth);
    norm * values
        .iter()
        .map(|&v| gaussian_kernel((x - v) / bandwidth))
        .sum::<f64>()
}

/// Estimate the density of `values` at `samples` points over [min, max]
///
/// `None` for empty input. Constant input gives a flat zero curve with
/// `degenerate` set rather than dividing by a zero bandwidth.
pub fn kernel_density(
    metric: impl Into<MetricName>,
    values: &[f64],
    samples: usize,
) -> Option<DensityCurve> {
    let stats = SummaryStats::compute(values)?;
    let samples = samples.max(2);
    let metric = metric.into();

    if stats.is_constant() {
        return Some(DensityCurve {
            metric,
            bandwidth: 0.0,
            degenerate: true,
            x_values: vec![stats.min; samples],
            density: vec![0.0; samples],
        });
    }

    let n = values.len();
    let bandwidth = silverman_bandwidth(stats.std_dev, n);
    // Divide before subtracting so a range near f64::MAX cannot overflow
    let intervals = (samples - 1) as f64;
    let step = stats.max / intervals - stats.min / intervals;

    let x_values: Vec<f64> = (0..samples)
        .map(|i| {
            if i == samples - 1 {
                stats.max
            } else {
                stats.min + step * i as f64
            }
        })
        .collect();

    let density = x_values
        .iter()
        .map(|&x| evaluate_density(values, bandwidth, x))
        .collect();

    Some(DensityCurve {
        metric,
        bandwidth,
        degenerate: false,
        x_values,
        density,
    })
}

/// Density curves for every metric, in metric-name order
pub fn metric_densities(store: &MetricSeriesStore, config: &DensityConfig) -> Vec<DensityCurve> {
    store
        .iter()
        .filter_map(|s| kernel_density(s.name.as_str(), &s.values, config.samples))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_kernel_peak() {
        assert!((gaussian_kernel(0.0) - 0.398_942_280_4).abs() < 1e-9);
        assert!((gaussian_kernel(1.0) - gaussian_kernel(-1.0)).abs() < 1e-15);
    }

    #[test]
    fn test_silverman_bandwidth() {
        // n = 32 → n^(-1/5) = 0.5
        assert!((silverman_bandwidth(2.0, 32) - 1.06).abs() < 1e-12);
        assert_eq!(silverman_bandwidth(2.0, 0), 0.0);
    }

    #[test]
    fn test_sample_grid_spans_range() {
        let curve = kernel_density("mood", &[2.0, 4.0, 6.0, 8.0], 51).unwrap();

        assert_eq!(curve.x_values.len(), 51);
        assert_eq!(curve.density.len(), 51);
        assert_eq!(curve.x_values[0], 2.0);
        assert_eq!(curve.x_values[50], 8.0);
        assert!((curve.x_values[25] - 5.0).abs() < 1e-12);
        assert!(!curve.degenerate);
        assert!(curve.density.iter().all(|d| d.is_finite() && *d > 0.0));
    }

    #[test]
    fn test_density_mass_near_one() {
        // Triangular sample on [40, 60] from two Weyl sequences
        let values: Vec<f64> = (0..200)
            .map(|i| {
                let u1 = (i as f64 * 0.618_034).fract();
                let u2 = (i as f64 * 0.414_214).fract();
                50.0 + 10.0 * (u1 + u2 - 1.0)
            })
            .collect();
        let curve = kernel_density("focus", &values, 51).unwrap();
        let area = curve.area();

        // Range-limited, so a little kernel mass falls outside [min, max]
        assert!(area > 0.9 && area < 1.05, "area = {}", area);
    }

    #[test]
    fn test_constant_values_degenerate() {
        let curve = kernel_density("water", &[0.1, 0.1, 0.1], 51).unwrap();

        assert!(curve.degenerate);
        assert_eq!(curve.bandwidth, 0.0);
        assert_eq!(curve.x_values.len(), 51);
        assert!(curve.density.iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_single_value_degenerate() {
        let curve = kernel_density("water", &[3.0], 51).unwrap();
        assert!(curve.degenerate);
        assert!(curve.density.iter().all(|d| !d.is_nan()));
    }

    #[test]
    fn test_evaluate_density_single_point() {
        let peak = evaluate_density(&[0.0], 1.0, 0.0);
        assert!((peak - gaussian_kernel(0.0)).abs() < 1e-15);
        assert_eq!(evaluate_density(&[0.0], 0.0, 0.0), 0.0);
        assert_eq!(evaluate_density(&[], 1.0, 0.0), 0.0);
    }

    #[test]
    fn test_extreme_range_stays_finite() {
        let curve = kernel_density("steps", &[-1e308, 1e308, 0.0], 51).unwrap();

        assert!(!curve.degenerate);
        assert!(curve.bandwidth.is_finite() && curve.bandwidth > 0.0);
        assert_eq!(curve.x_values[0], -1e308);
        assert_eq!(curve.x_values[50], 1e308);
        assert!(curve.x_values.iter().all(|x| x.is_finite()));
        assert!(curve.density.iter().all(|d| d.is_finite() && *d >= 0.0));
    }

    #[test]
    fn test_empty_values() {
        assert!(kernel_density("water", &[], 51).is_none());
    }
}
