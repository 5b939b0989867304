//! # QuantAlpha workspace
//!
//! Re-exports the member crates so the whole toolkit is reachable from one
//! dependency:
//!
//! - [`trade_math`]: incremental rolling-window indicators and statistics
//! - [`quant_alpha`]: providers, indicator engine, backtest, bands and reports
//!
//! ## Example
//!
//! ```
//! use quant_alpha_workspace::trade_math::moving_averages::SimpleMovingAverage;
//!
//! let mut sma = SimpleMovingAverage::new(3).unwrap();
//! for close in [10.0, 11.0, 12.0] {
//!     sma.update(close).unwrap();
//! }
//! assert_eq!(sma.value().unwrap(), 11.0);
//! ```

pub use quant_alpha;
pub use trade_math;

#[cfg(test)]
mod tests {
    #[test]
    fn test_members_are_reachable() {
        let config = quant_alpha::AnalysisConfig::default();
        assert_eq!(config.seed, quant_alpha::provider::synthetic::DEFAULT_SEED);
        assert_eq!(trade_math::TRADING_DAYS_PER_YEAR, 252.0);
    }
}
