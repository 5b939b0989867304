//! Asset analysis facade
//!
//! [`QuantAlpha`] runs the whole pipeline for one ticker: provider, indicator
//! engine, backtest and volatility bands. It is the single recovery boundary
//! of the crate: every error raised below it is logged and turned into an
//! [`AnalysisOutcome::Failed`], so callers never see a panic or a `Result`.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, error};
use trade_math::extremes::RollingExtremes;

use crate::backtest::{run_mean_reversion_backtest, BacktestResult};
use crate::bands::VolatilityBands;
use crate::config::AnalysisConfig;
use crate::error::{QuantError, Result};
use crate::indicators::{compute_indicators, LONG_MA_PERIOD};
use crate::provider::{
    FallbackProvider, HistoryProvider, OfflineSource, SyntheticGenerator, Ticker, TimeoutProvider,
};
use crate::series::PriceSeries;

/// Window of the support and resistance levels
pub const LEVELS_WINDOW: usize = 20;

/// Position of the price relative to a moving average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// `Up` only when the price is strictly above the average
    pub fn relative_to(price: f64, average: f64) -> Self {
        if price > average {
            Trend::Up
        } else {
            Trend::Down
        }
    }
}

/// Trend against MA20 and MA50 with percentage distances
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trends {
    pub ma20: Trend,
    pub ma50: Trend,
    /// (price - MA20) / MA20 * 100
    pub dist_ma20: f64,
    /// (price - MA50) / MA50 * 100
    pub dist_ma50: f64,
}

impl Trends {
    pub fn new(price: f64, ma20: f64, ma50: f64) -> Self {
        Self {
            ma20: Trend::relative_to(price, ma20),
            ma50: Trend::relative_to(price, ma50),
            dist_ma20: percent_distance(price, ma20),
            dist_ma50: percent_distance(price, ma50),
        }
    }
}

fn percent_distance(price: f64, average: f64) -> f64 {
    (price - average) / average * 100.0
}

/// Price levels derived from the last bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TechnicalLevels {
    pub ma20: f64,
    pub ma50: f64,
    /// Lowest close of the last 20 bars
    pub support: f64,
    /// Highest close of the last 20 bars
    pub resistance: f64,
}

/// Complete quantitative picture of one ticker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetAnalysis {
    pub ticker: String,
    /// Date of the last bar
    pub as_of: NaiveDate,
    pub data_points: usize,
    pub current_price: f64,
    /// Annualized 20-day volatility
    pub current_volatility: f64,
    pub current_rsi: f64,
    pub volatility_ranges: VolatilityBands,
    pub trends: Trends,
    pub backtest: BacktestResult,
    pub technical_levels: TechnicalLevels,
}

/// Why an analysis could not be produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisFailure {
    pub ticker: String,
    pub error: String,
}

/// Either a full analysis or a single error marker
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Complete(Box<AssetAnalysis>),
    Failed(AnalysisFailure),
}

impl AnalysisOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, AnalysisOutcome::Complete(_))
    }

    pub fn analysis(&self) -> Option<&AssetAnalysis> {
        match self {
            AnalysisOutcome::Complete(analysis) => Some(analysis),
            AnalysisOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&AnalysisFailure> {
        match self {
            AnalysisOutcome::Complete(_) => None,
            AnalysisOutcome::Failed(failure) => Some(failure),
        }
    }
}

/// Provider stack used by [`QuantAlpha::with_source`]
pub type GuardedProvider<S> = FallbackProvider<TimeoutProvider<S>>;

/// The analyst: a history provider plus the settings of every request
#[derive(Debug)]
pub struct QuantAlpha<P> {
    provider: P,
    config: AnalysisConfig,
}

impl QuantAlpha<GuardedProvider<OfflineSource>> {
    /// Analyst without a live source; every ticker is served synthetic data
    /// unless the fallback is disabled
    pub fn offline(config: AnalysisConfig) -> Self {
        Self::with_source(OfflineSource, config)
    }
}

impl<S> QuantAlpha<GuardedProvider<S>>
where
    S: HistoryProvider + Send + Sync + 'static,
{
    /// Wrap `source` with the configured timeout and synthetic fallback
    pub fn with_source(source: S, config: AnalysisConfig) -> Self {
        let end_date = config
            .end_date
            .unwrap_or_else(|| Local::now().date_naive());
        let synthetic = SyntheticGenerator::new(config.seed, end_date);
        let provider = FallbackProvider::new(
            TimeoutProvider::new(source, config.fetch_timeout()),
            synthetic,
            config.synthetic_fallback,
        );

        Self { provider, config }
    }
}

impl<P: HistoryProvider> QuantAlpha<P> {
    /// Use `provider` as is, without timeout or fallback wrapping
    pub fn new(provider: P, config: AnalysisConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Analyze `ticker`; failures are returned as [`AnalysisOutcome::Failed`]
    pub fn analyze(&self, ticker: &str) -> AnalysisOutcome {
        match self.try_analyze(ticker) {
            Ok(analysis) => AnalysisOutcome::Complete(Box::new(analysis)),
            Err(err) => {
                let symbol = Ticker::parse(ticker)
                    .map(|t| t.symbol().to_string())
                    .unwrap_or_else(|_| ticker.trim().to_string());
                error!(ticker = %symbol, error = %err, "analysis failed");
                AnalysisOutcome::Failed(AnalysisFailure {
                    error: format!("Analysis of {} failed: {}", symbol, err),
                    ticker: symbol,
                })
            }
        }
    }

    /// Analyze `ticker`, propagating the first error
    pub fn try_analyze(&self, ticker: &str) -> Result<AssetAnalysis> {
        let ticker = Ticker::parse(ticker)?;
        let series = self.provider.get_history(&ticker, self.config.period)?;
        analyze_series(series)
    }
}

/// Run indicators, backtest and bands over an already fetched series
///
/// Needs at least 50 bars so that every indicator is defined on the last one.
pub fn analyze_series(series: PriceSeries) -> Result<AssetAnalysis> {
    let ticker = series.ticker().to_string();
    let data_points = series.len();
    if data_points < LONG_MA_PERIOD {
        return Err(QuantError::InsufficientData(format!(
            "{} has {} bars, at least {} are needed",
            ticker, data_points, LONG_MA_PERIOD
        )));
    }

    let indicators = compute_indicators(series)?;
    debug!(ticker = %ticker, bars = data_points, "indicators computed");

    let last = *indicators
        .last()
        .ok_or_else(|| QuantError::InsufficientData(format!("{} has no bars", ticker)))?;
    let (Some(volatility), Some(rsi), Some(ma20), Some(ma50)) =
        (last.volatility_20, last.rsi_14, last.ma_20, last.ma_50)
    else {
        return Err(QuantError::InsufficientData(format!(
            "{}: indicators are not defined on the last bar",
            ticker
        )));
    };

    let backtest = run_mean_reversion_backtest(&indicators)?;
    debug!(
        ticker = %ticker,
        trades = backtest.num_trades,
        total_return = backtest.total_return,
        "backtest finished"
    );

    let mut extremes = RollingExtremes::new(LEVELS_WINDOW)?;
    for row in indicators.rows().iter().rev().take(LEVELS_WINDOW).rev() {
        extremes.update(row.close)?;
    }

    let price = last.close;
    Ok(AssetAnalysis {
        ticker,
        as_of: last.date,
        data_points,
        current_price: price,
        current_volatility: volatility,
        current_rsi: rsi,
        volatility_ranges: VolatilityBands::from_price(price, volatility),
        trends: Trends::new(price, ma20, ma50),
        backtest,
        technical_levels: TechnicalLevels {
            ma20,
            ma50,
            support: extremes.min()?,
            resistance: extremes.max()?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Period;
    use crate::test_support::{series_from_closes, zigzag};
    use approx::assert_relative_eq;

    fn fixed_config() -> AnalysisConfig {
        AnalysisConfig {
            period: Period::OneYear,
            end_date: NaiveDate::from_ymd_opt(2024, 6, 28),
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn test_trend_classification() {
        assert_eq!(Trend::relative_to(11.0, 10.0), Trend::Up);
        assert_eq!(Trend::relative_to(10.0, 10.0), Trend::Down);

        let trends = Trends::new(98.0, 100.0, 90.0);
        assert_eq!(trends.ma20, Trend::Down);
        assert_eq!(trends.ma50, Trend::Up);
        assert_relative_eq!(trends.dist_ma20, -2.0, epsilon = 1e-12);
        assert_relative_eq!(trends.dist_ma50, 8.0 / 90.0 * 100.0, epsilon = 1e-12);
    }

    #[test]
    fn test_analyze_series() {
        let closes = zigzag(120);
        let analysis = analyze_series(series_from_closes(&closes)).unwrap();

        let last_20 = &closes[100..];
        let min = last_20.iter().copied().fold(f64::INFINITY, f64::min);
        let max = last_20.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        assert_eq!(analysis.ticker, "TEST3");
        assert_eq!(analysis.data_points, 120);
        assert_eq!(analysis.current_price, closes[119]);
        assert_eq!(analysis.technical_levels.support, min);
        assert_eq!(analysis.technical_levels.resistance, max);
        assert!(analysis.volatility_ranges.contains_1std(analysis.current_price));
        assert!(analysis.backtest.num_trades > 0);
    }

    #[test]
    fn test_flat_series_has_no_trades() {
        let analysis = analyze_series(series_from_closes(&[10.0; 60])).unwrap();
        assert_eq!(analysis.current_rsi, 100.0);
        assert_eq!(analysis.current_volatility, 0.0);
        assert_eq!(analysis.backtest.num_trades, 0);
        assert_eq!(analysis.backtest.hit_rate, None);
        assert_eq!(analysis.volatility_ranges.lower_1std, 10.0);
    }

    #[test]
    fn test_short_series_is_rejected() {
        let err = analyze_series(series_from_closes(&zigzag(49))).unwrap_err();
        assert!(matches!(err, QuantError::InsufficientData(_)));
    }

    #[test]
    fn test_offline_analysis_uses_synthetic_data() {
        let analyst = QuantAlpha::offline(fixed_config());
        let outcome = analyst.analyze("petr4.sa");

        let analysis = outcome.analysis().unwrap();
        assert_eq!(analysis.ticker, "PETR4");
        assert_eq!(analysis.data_points, 252);
        assert_eq!(analysis.as_of, NaiveDate::from_ymd_opt(2024, 6, 28).unwrap());
    }

    #[test]
    fn test_failures_become_outcomes() {
        let analyst = QuantAlpha::offline(AnalysisConfig {
            synthetic_fallback: false,
            ..fixed_config()
        });

        let failure = analyst.analyze("VALE3").failure().cloned().unwrap();
        assert_eq!(failure.ticker, "VALE3");
        assert!(failure.error.contains("No data available"), "{}", failure.error);

        let invalid = QuantAlpha::offline(fixed_config()).analyze("  ");
        assert!(!invalid.is_complete());
    }

    #[test]
    fn test_outcome_json_shape() {
        let failed = AnalysisOutcome::Failed(AnalysisFailure {
            ticker: "X".to_string(),
            error: "boom".to_string(),
        });
        assert_eq!(
            serde_json::to_string(&failed).unwrap(),
            r#"{"ticker":"X","error":"boom"}"#
        );

        let outcome = QuantAlpha::offline(fixed_config()).analyze("ITUB4");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["ticker"], "ITUB4");
        assert!(json["trends"]["ma20"] == "UP" || json["trends"]["ma20"] == "DOWN");
        assert!(json["volatility_ranges"]["lower_1std"].is_number());
        assert!(json["backtest"]["num_trades"].is_u64());
    }
}
