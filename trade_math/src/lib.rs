//! # Trade Math
//!
//! Rolling-window calculations used by the indicator engine.
//! Every indicator here is incremental: feed it one observation at a time
//! with `update` and ask for the current `value`, which is an
//! [`MathError::InsufficientData`] error until the window has filled.

use thiserror::Error;

// Indicator modules
pub mod extremes;
pub mod moving_averages;
pub mod oscillators;
pub mod stats;
pub mod volatility;

/// Number of trading sessions per year used for annualization
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Errors that can occur in trading-related calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for trading math operations
pub type Result<T> = std::result::Result<T, MathError>;

/// Shared period validation for the rolling indicators
pub(crate) fn validate_period(period: usize) -> Result<()> {
    if period == 0 {
        return Err(MathError::InvalidInput(
            "Period must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
