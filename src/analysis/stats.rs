//! Descriptive statistics shared by the analyzers
//!
//! Standard deviations are population (divide by n).

use serde::Serialize;

/// Arithmetic mean, `None` when empty
///
/// Finite input always gives a finite mean, even when the plain sum would
/// overflow.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let sum = values.iter().sum::<f64>();
    if sum.is_finite() {
        Some(sum / n)
    } else {
        Some(values.iter().map(|v| v / n).sum())
    }
}

/// Population standard deviation, `None` when empty
///
/// Falls back to computing on values scaled by the largest magnitude when
/// the squared deviations overflow.
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let n = values.len() as f64;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
    if variance.is_finite() {
        return Some(variance.sqrt());
    }

    let scale = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let scaled_mean = m / scale;
    let scaled_variance = values
        .iter()
        .map(|v| (v / scale - scaled_mean).powi(2))
        .sum::<f64>()
        / n;
    Some(scaled_variance.sqrt() * scale)
}

/// |value − mean| / std_dev without overflowing the difference
///
/// `None` when `std_dev` is not a positive finite number.
pub fn z_score(value: f64, mean: f64, std_dev: f64) -> Option<f64> {
    if !(std_dev > 0.0 && std_dev.is_finite()) {
        return None;
    }
    let z = (value - mean).abs() / std_dev;
    if z.is_finite() {
        Some(z)
    } else {
        Some((value / std_dev - mean / std_dev).abs())
    }
}

/// Coefficient of variation (σ/μ)
///
/// `None` when empty or when the mean is zero.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    if m == 0.0 {
        return None;
    }
    let sd = population_std_dev(values)?;
    Some(sd / m.abs())
}

/// Summary of a numeric series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl SummaryStats {
    /// Compute statistics, `None` when empty
    pub fn compute(values: &[f64]) -> Option<Self> {
        let mean = mean(values)?;
        let std_dev = population_std_dev(values)?;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            count: values.len(),
            min,
            max,
            mean,
            std_dev,
        })
    }

    /// Check if every value is identical
    ///
    /// Compares the range rather than `std_dev`, which can carry rounding
    /// noise for constant non-representable values such as 0.1.
    pub fn is_constant(&self) -> bool {
        self.min == self.max
    }
}
