//! Moving average calculation implementations
//!
//! Contains the Simple Moving Average (SMA) used for the MA20/MA50 trend
//! levels and for the rolling means inside the RSI.

use crate::{validate_period, MathError, Result};
use std::collections::VecDeque;

/// Simple Moving Average (SMA) implementation
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        validate_period(period)?;

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period + 1),
        })
    }

    /// Update the SMA with a new value
    pub fn update(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "SMA input must be finite, got {}",
                value
            )));
        }

        self.values.push_back(value);

        // Remove oldest value if we have more than period values
        if self.values.len() > self.period {
            self.values.pop_front();
        }

        Ok(())
    }

    /// Whether the window has filled
    pub fn is_ready(&self) -> bool {
        self.values.len() == self.period
    }

    /// Get the current SMA value
    pub fn value(&self) -> Result<f64> {
        if !self.is_ready() {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for SMA calculation. Need {} values, have {}.",
                self.period,
                self.values.len()
            )));
        }

        // Summed from the window on every read so long series do not drift
        Ok(self.values.iter().sum::<f64>() / self.period as f64)
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Reset the SMA, clearing all values
    pub fn reset(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_calculation() {
        let mut sma = SimpleMovingAverage::new(3).unwrap();

        // Not enough data yet
        assert!(sma.value().is_err());

        sma.update(2.0).unwrap();
        sma.update(4.0).unwrap();

        // Still not enough data
        assert!(sma.value().is_err());

        sma.update(6.0).unwrap();
        assert_eq!(sma.value().unwrap(), 4.0); // (2 + 4 + 6) / 3 = 4

        // The window slides, dropping the oldest value
        sma.update(8.0).unwrap();
        assert_eq!(sma.value().unwrap(), 6.0); // (4 + 6 + 8) / 3 = 6

        sma.reset();
        assert!(!sma.is_ready());
    }

    #[test]
    fn test_sma_rejects_non_finite_input() {
        let mut sma = SimpleMovingAverage::new(2).unwrap();
        assert!(sma.update(f64::NAN).is_err());
        assert!(SimpleMovingAverage::new(0).is_err());
    }
}
