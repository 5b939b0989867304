//! Oscillator indicator implementations
//!
//! Contains the Relative Strength Index (RSI) in its rolling-mean form:
//! gains and losses are averaged with a simple moving average over the
//! period instead of Wilder's exponential smoothing.

use crate::moving_averages::SimpleMovingAverage;
use crate::{validate_period, Result};

/// Relative Strength Index (RSI) implementation
#[derive(Debug, Clone)]
pub struct RelativeStrengthIndex {
    period: usize,
    previous_price: Option<f64>,
    avg_gain: SimpleMovingAverage,
    avg_loss: SimpleMovingAverage,
}

impl RelativeStrengthIndex {
    /// Create a new RSI with the specified period
    pub fn new(period: usize) -> Result<Self> {
        validate_period(period)?;

        Ok(Self {
            period,
            previous_price: None,
            avg_gain: SimpleMovingAverage::new(period)?,
            avg_loss: SimpleMovingAverage::new(period)?,
        })
    }

    /// Update the RSI with a new price value
    ///
    /// The first price has no predecessor; it contributes a zero gain and a
    /// zero loss so the first value is available after `period` prices.
    pub fn update(&mut self, price: f64) -> Result<()> {
        let change = match self.previous_price {
            Some(prev_price) => price - prev_price,
            None => 0.0,
        };

        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };

        self.avg_gain.update(gain)?;
        self.avg_loss.update(loss)?;

        self.previous_price = Some(price);

        Ok(())
    }

    /// Get the current RSI value (0-100)
    pub fn value(&self) -> Result<f64> {
        let avg_gain = self.avg_gain.value()?;
        let avg_loss = self.avg_loss.value()?;

        if avg_loss == 0.0 {
            return Ok(100.0); // If no losses, RSI is 100
        }

        let rs = avg_gain / avg_loss;
        Ok(100.0 - (100.0 / (1.0 + rs)))
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Reset the RSI, clearing all values
    pub fn reset(&mut self) {
        self.previous_price = None;
        self.avg_gain.reset();
        self.avg_loss.reset();
    }
}
