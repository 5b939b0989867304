//! Descriptive statistics over complete samples

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// First quartile, median and third quartile of a sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}

impl Quartiles {
    /// Compute quartiles of a non-empty sample with no NaN values
    ///
    /// Uses linear interpolation between order statistics (Hyndman-Fan
    /// type 7), the default of pandas and of box plots.
    pub fn from_sample(sample: &[f64]) -> Result<Self> {
        if sample.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot compute quartiles of an empty sample".to_string(),
            ));
        }
        if sample.iter().any(|v| v.is_nan()) {
            return Err(MathError::InvalidInput(
                "Sample contains NaN values".to_string(),
            ));
        }

        let mut sorted = sample.to_vec();
        sorted.sort_by(f64::total_cmp);
        Ok(Self {
            q1: linear_quantile(&sorted, 0.25),
            median: linear_quantile(&sorted, 0.5),
            q3: linear_quantile(&sorted, 0.75),
        })
    }

    /// Spread between the third and first quartile
    pub fn interquartile_range(&self) -> f64 {
        self.q3 - self.q1
    }
}

fn linear_quantile(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    match sorted.get(lo + 1) {
        Some(next) => sorted[lo] + (h - lo as f64) * (next - sorted[lo]),
        None => sorted[lo],
    }
}

/// Arithmetic mean, or an error for an empty sample
pub fn mean(sample: &[f64]) -> Result<f64> {
    if sample.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot compute the mean of an empty sample".to_string(),
        ));
    }
    Ok(sample.iter().mean())
}
