//! Mean-reversion backtest engine
//!
//! The strategy goes long when the close is below its 20-day moving average
//! and short when it is above. A signal produced at the close of day `t` is
//! held during day `t + 1`, so the position never sees the return it was
//! computed from.
//!
//! # Degenerate statistics
//!
//! Ratios with an empty denominator are reported, not raised:
//!
//! - `hit_rate` is `None` when no bar produced a nonzero return
//! - `profit_factor` is `+inf` with wins and no losses, `NaN` with neither
//! - `payoff_ratio` is `+inf` when the average loss is zero

use serde::Serialize;

use crate::error::{QuantError, Result};
use crate::indicators::IndicatorSeries;

/// Desired exposure after the close of a bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Signal {
    /// Hold a long position during the next bar
    Long,
    /// Hold a short position during the next bar
    Short,
    /// Stay out of the market
    Flat,
}

impl Signal {
    /// Position multiplier: +1, -1 or 0
    pub fn direction(self) -> f64 {
        match self {
            Signal::Long => 1.0,
            Signal::Short => -1.0,
            Signal::Flat => 0.0,
        }
    }
}

/// Aggregate statistics of one backtest run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BacktestResult {
    /// Compounded return over the whole run
    pub total_return: f64,
    /// Winning bars over bars with a nonzero return
    pub hit_rate: Option<f64>,
    /// Most negative peak-to-trough ratio of the equity curve, always <= 0
    pub max_drawdown: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    /// Mean absolute losing return
    pub avg_loss: f64,
    pub payoff_ratio: f64,
    /// Mean strategy return over every bar, flat bars included
    pub expectancy: f64,
    /// Bars whose strategy return is nonzero
    pub num_trades: usize,
}

impl BacktestResult {
    /// Summarize per-bar strategy returns (`None` where undefined)
    pub fn from_strategy_returns(returns: &[Option<f64>]) -> Result<Self> {
        let defined: Vec<f64> = returns.iter().flatten().copied().collect();
        if defined.is_empty() {
            return Err(QuantError::InsufficientData(
                "backtest needs at least one bar with a defined return".to_string(),
            ));
        }

        let total_return = defined.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0;

        let wins: Vec<f64> = defined.iter().copied().filter(|r| *r > 0.0).collect();
        let losses: Vec<f64> = defined.iter().copied().filter(|r| *r < 0.0).collect();
        let num_trades = defined.iter().filter(|r| **r != 0.0).count();

        let hit_rate = if num_trades == 0 {
            None
        } else {
            Some(wins.len() as f64 / num_trades as f64)
        };

        let gross_win: f64 = wins.iter().sum();
        let gross_loss: f64 = losses.iter().sum::<f64>().abs();
        let profit_factor = match (wins.is_empty(), losses.is_empty()) {
            (true, true) => f64::NAN,
            (false, true) => f64::INFINITY,
            _ => gross_win / gross_loss,
        };

        let avg_win = if wins.is_empty() {
            0.0
        } else {
            gross_win / wins.len() as f64
        };
        let avg_loss = if losses.is_empty() {
            0.0
        } else {
            gross_loss / losses.len() as f64
        };
        let payoff_ratio = if avg_loss > 0.0 {
            avg_win / avg_loss
        } else {
            f64::INFINITY
        };

        let expectancy = defined.iter().sum::<f64>() / defined.len() as f64;

        Ok(Self {
            total_return,
            hit_rate,
            max_drawdown: max_drawdown(returns),
            profit_factor,
            avg_win,
            avg_loss,
            payoff_ratio,
            expectancy,
            num_trades,
        })
    }
}

/// Worst drawdown of the compounded equity curve; undefined returns count as 0
pub fn max_drawdown(returns: &[Option<f64>]) -> f64 {
    let mut equity = 1.0;
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;

    for r in returns {
        equity *= 1.0 + r.unwrap_or(0.0);
        peak = peak.max(equity);
        if peak > 0.0 {
            worst = worst.min((equity - peak) / peak);
        }
    }

    worst
}

/// A rule that turns an indicator series into per-bar signals
pub trait BacktestStrategy {
    /// Name used in logs and reports
    fn name(&self) -> &str;

    /// One signal per bar, computed from data up to and including that bar
    fn generate_signals(&self, series: &IndicatorSeries) -> Vec<Signal>;

    /// Per-bar returns of the strategy with the one-bar execution lag
    ///
    /// Bars without a previous signal are undefined, including bars past
    /// the end of a short signal vector.
    fn strategy_returns(&self, series: &IndicatorSeries) -> Vec<Option<f64>> {
        let signals = self.generate_signals(series);

        series
            .rows()
            .iter()
            .enumerate()
            .map(|(t, row)| {
                let position = t
                    .checked_sub(1)
                    .and_then(|prev| signals.get(prev))
                    .map(|signal| signal.direction())?;
                row.ret.map(|r| position * r)
            })
            .collect()
    }

    /// Run the strategy over `series` and summarize it
    fn backtest(&self, series: &IndicatorSeries) -> Result<BacktestResult> {
        BacktestResult::from_strategy_returns(&self.strategy_returns(series))
    }
}

/// Long below MA20, short above it, flat when equal or not ready
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanReversionStrategy;

impl BacktestStrategy for MeanReversionStrategy {
    fn name(&self) -> &str {
        "MA20 mean reversion"
    }

    fn generate_signals(&self, series: &IndicatorSeries) -> Vec<Signal> {
        series
            .rows()
            .iter()
            .map(|row| match row.ma_20 {
                Some(ma) if row.close < ma => Signal::Long,
                Some(ma) if row.close > ma => Signal::Short,
                _ => Signal::Flat,
            })
            .collect()
    }
}

/// Run the fixed MA20 mean-reversion backtest
pub fn run_mean_reversion_backtest(series: &IndicatorSeries) -> Result<BacktestResult> {
    MeanReversionStrategy.backtest(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::compute_indicators;
    use crate::test_support::{series_from_closes, zigzag};
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_expectancy_counts_flat_bars() {
        let returns = [None, Some(0.02), Some(0.0), Some(-0.01), Some(0.0)];
        let result = BacktestResult::from_strategy_returns(&returns).unwrap();

        // 0.01 spread over four defined bars, not over the two trades
        assert_relative_eq!(result.expectancy, 0.0025, epsilon = 1e-15);
        assert_eq!(result.num_trades, 2);
        assert_eq!(result.hit_rate, Some(0.5));
        assert_relative_eq!(result.avg_win, 0.02);
        assert_relative_eq!(result.avg_loss, 0.01);
        assert_relative_eq!(result.payoff_ratio, 2.0);
        assert_relative_eq!(result.profit_factor, 2.0);
    }

    #[rstest]
    #[case(&[None, Some(0.01), Some(0.02)], f64::INFINITY)]
    #[case(&[None, Some(0.01), Some(-0.02)], 0.5)]
    #[case(&[None, Some(-0.01)], 0.0)]
    fn test_profit_factor(#[case] returns: &[Option<f64>], #[case] expected: f64) {
        let result = BacktestResult::from_strategy_returns(returns).unwrap();
        assert_relative_eq!(result.profit_factor, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_no_trades_reports_undefined_statistics() {
        let result = BacktestResult::from_strategy_returns(&[None, Some(0.0), Some(0.0)]).unwrap();
        assert_eq!(result.num_trades, 0);
        assert_eq!(result.hit_rate, None);
        assert!(result.profit_factor.is_nan());
        assert!(result.payoff_ratio.is_infinite());
        assert_eq!(result.max_drawdown, 0.0);
        assert_eq!(result.total_return, 0.0);
        assert_eq!(result.expectancy, 0.0);
    }

    #[test]
    fn test_max_drawdown() {
        let returns = [None, Some(0.1), Some(-0.5), Some(0.2)];
        assert_relative_eq!(max_drawdown(&returns), -0.5, epsilon = 1e-12);

        let rising = [None, Some(0.1), Some(0.1)];
        assert_eq!(max_drawdown(&rising), 0.0);

        let result = BacktestResult::from_strategy_returns(&returns).unwrap();
        assert_relative_eq!(result.total_return, 1.1 * 0.5 * 1.2 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_returns_are_insufficient() {
        assert!(matches!(
            BacktestResult::from_strategy_returns(&[None]),
            Err(QuantError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_signals_are_lagged_one_bar() {
        let mut closes = vec![10.0; 20];
        closes.push(9.0); // MA20 = 9.95 -> long
        closes.push(11.0); // MA20 = 10.0 -> short
        let series = compute_indicators(series_from_closes(&closes)).unwrap();

        let signals = MeanReversionStrategy.generate_signals(&series);
        assert_eq!(signals[19], Signal::Flat);
        assert_eq!(signals[20], Signal::Long);
        assert_eq!(signals[21], Signal::Short);

        let returns = MeanReversionStrategy.strategy_returns(&series);
        assert_eq!(returns[0], None);
        // Day 20 was held flat from the day 19 signal
        assert_eq!(returns[20], Some(0.0));
        // Day 21 was held long from the day 20 signal
        assert_relative_eq!(returns[21].unwrap(), 11.0 / 9.0 - 1.0, epsilon = 1e-12);
    }

    struct TruncatedStrategy;

    impl BacktestStrategy for TruncatedStrategy {
        fn name(&self) -> &str {
            "truncated"
        }

        fn generate_signals(&self, _series: &IndicatorSeries) -> Vec<Signal> {
            vec![Signal::Long; 3]
        }
    }

    #[test]
    fn test_short_signal_vector_leaves_bars_undefined() {
        let closes = [10.0, 11.0, 12.0, 13.0, 14.0];
        let series = compute_indicators(series_from_closes(&closes)).unwrap();
        let returns = TruncatedStrategy.strategy_returns(&series);

        assert_eq!(returns.len(), 5);
        assert_relative_eq!(returns[1].unwrap(), 0.1, epsilon = 1e-12);
        assert!(returns[3].is_some());
        assert_eq!(returns[4], None);
        assert!(TruncatedStrategy.backtest(&series).is_ok());
    }

    #[test]
    fn test_backtest_on_oscillating_prices() {
        let series = compute_indicators(series_from_closes(&zigzag(200))).unwrap();
        let result = run_mean_reversion_backtest(&series).unwrap();

        assert!(result.num_trades > 0);
        assert!(result.max_drawdown <= 0.0);
        let hit_rate = result.hit_rate.unwrap();
        assert!((0.0..=1.0).contains(&hit_rate));
        assert_eq!(MeanReversionStrategy.name(), "MA20 mean reversion");
    }
}
