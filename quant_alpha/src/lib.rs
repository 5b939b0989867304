//! # Quant Alpha
//!
//! `quant_alpha` turns the daily price history of a B3 (Bovespa) equity into
//! a quantitative briefing for the next trading session.
//!
//! The pipeline runs one way:
//!
//! - **Providers** fetch an ordered daily OHLCV series, falling back to a
//!   seeded synthetic series when the live source is unavailable
//! - **Indicators** derive returns, 20-day annualized volatility, MA20/MA50
//!   and RSI(14)
//! - **Backtest** runs the fixed MA20 mean-reversion rule with a one-bar lag
//! - **Bands** turn price and volatility into 1σ/2σ ranges
//! - **Analysis** assembles everything into an [`AssetAnalysis`] and the
//!   **report** module renders it as text
//!
//! ## Usage Example
//!
//! ```no_run
//! use quant_alpha::{AnalysisConfig, QuantAlpha};
//! use quant_alpha::report::render_outcome;
//!
//! let analyst = QuantAlpha::offline(AnalysisConfig::default());
//! let outcome = analyst.analyze("PETR4");
//! println!("{}", render_outcome(&outcome));
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod analysis;
pub mod backtest;
pub mod bands;
pub mod config;
pub mod error;
pub mod gaps;
pub mod indicators;
pub mod metrics;
pub mod persona;
pub mod provider;
pub mod report;
pub mod scoring;
pub mod series;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::analysis::{AnalysisFailure, AnalysisOutcome, AssetAnalysis, QuantAlpha, Trend};
pub use crate::backtest::{BacktestResult, BacktestStrategy, MeanReversionStrategy, Signal};
pub use crate::bands::VolatilityBands;
pub use crate::config::AnalysisConfig;
pub use crate::error::{QuantError, Result};
pub use crate::indicators::{compute_indicators, IndicatorRow, IndicatorSeries};
pub use crate::provider::{HistoryProvider, Period, Ticker};
pub use crate::series::PriceSeries;

/// One trading session of OHLCV data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Session date
    pub date: NaiveDate,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Traded volume
    pub volume: u64,
}
