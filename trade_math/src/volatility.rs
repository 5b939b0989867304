//! Volatility indicator implementations
//!
//! Contains:
//! - Rolling sample standard deviation
//! - Annualization helpers between daily and yearly volatility

use crate::{validate_period, MathError, Result, TRADING_DAYS_PER_YEAR};
use statrs::statistics::Statistics;
use std::collections::VecDeque;

/// Rolling sample standard deviation (n - 1 denominator)
#[derive(Debug, Clone)]
pub struct StandardDeviation {
    period: usize,
    values: VecDeque<f64>,
}

impl StandardDeviation {
    /// Create a new StandardDeviation with the specified period
    pub fn new(period: usize) -> Result<Self> {
        validate_period(period)?;
        if period < 2 {
            return Err(MathError::InvalidInput(
                "Sample standard deviation needs a period of at least 2".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period + 1),
        })
    }

    /// Update the StandardDeviation with a new value
    pub fn update(&mut self, value: f64) -> Result<()> {
        self.values.push_back(value);

        // Keep values at period length
        if self.values.len() > self.period {
            self.values.pop_front();
        }

        Ok(())
    }

    /// Get the current standard deviation
    pub fn value(&self) -> Result<f64> {
        if self.values.len() < self.period {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for standard deviation calculation. Need {} values, have {}.",
                self.period,
                self.values.len()
            )));
        }

        let std_dev = self.values.iter().std_dev();
        if std_dev.is_nan() {
            return Err(MathError::CalculationError(
                "Standard deviation is undefined for this window".to_string(),
            ));
        }

        Ok(std_dev)
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Reset the StandardDeviation, clearing all values
    pub fn reset(&mut self) {
        self.values.clear();
    }
}

/// Scale a daily standard deviation to a yearly one
pub fn annualize(daily_std_dev: f64) -> f64 {
    daily_std_dev * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Scale a yearly standard deviation back to a daily one
pub fn deannualize(annual_std_dev: f64) -> f64 {
    annual_std_dev / TRADING_DAYS_PER_YEAR.sqrt()
}
