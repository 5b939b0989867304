//! Rolling minimum and maximum over a trailing window
//!
//! Used for support (rolling low of closes) and resistance (rolling high).

use crate::{validate_period, MathError, Result};
use std::collections::VecDeque;

/// Rolling minimum and maximum of the last `period` values
#[derive(Debug, Clone)]
pub struct RollingExtremes {
    period: usize,
    values: VecDeque<f64>,
}

impl RollingExtremes {
    pub fn new(period: usize) -> Result<Self> {
        validate_period(period)?;

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period + 1),
        })
    }

    pub fn update(&mut self, value: f64) -> Result<()> {
        self.values.push_back(value);
        if self.values.len() > self.period {
            self.values.pop_front();
        }
        Ok(())
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.values.len() < self.period {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for rolling extremes. Need {} values, have {}.",
                self.period,
                self.values.len()
            )));
        }
        Ok(())
    }

    /// Lowest value in the window
    pub fn min(&self) -> Result<f64> {
        self.ensure_ready()?;
        Ok(self.values.iter().copied().fold(f64::INFINITY, f64::min))
    }

    /// Highest value in the window
    pub fn max(&self) -> Result<f64> {
        self.ensure_ready()?;
        Ok(self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn reset(&mut self) {
        self.values.clear();
    }
}
