//! Indicator engine
//!
//! Derives per-bar returns, 20-day annualized volatility, MA20/MA50 and
//! RSI(14) from a [`PriceSeries`]. Every column is computed from the current
//! and past bars only. Rolling columns are `None` until their window fills:
//!
//! | column          | first defined index |
//! |-----------------|---------------------|
//! | `ret`, `log_return` | 1               |
//! | `volatility_20` | 20 (20 returns)     |
//! | `ma_20`         | 19                  |
//! | `ma_50`         | 49                  |
//! | `rsi_14`        | 13                  |

use chrono::NaiveDate;
use serde::Serialize;
use trade_math::moving_averages::SimpleMovingAverage;
use trade_math::oscillators::RelativeStrengthIndex;
use trade_math::volatility::{annualize, StandardDeviation};

use crate::error::Result;
use crate::series::PriceSeries;

pub const VOLATILITY_WINDOW: usize = 20;
pub const SHORT_MA_PERIOD: usize = 20;
pub const LONG_MA_PERIOD: usize = 50;
pub const RSI_PERIOD: usize = 14;

/// Derived values for one bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    /// Simple return against the previous close
    pub ret: Option<f64>,
    pub log_return: Option<f64>,
    /// Sample stdev of the last 20 returns, annualized by sqrt(252)
    pub volatility_20: Option<f64>,
    pub ma_20: Option<f64>,
    pub ma_50: Option<f64>,
    pub rsi_14: Option<f64>,
}

/// A price series together with its indicator columns
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    prices: PriceSeries,
    rows: Vec<IndicatorRow>,
}

impl IndicatorSeries {
    pub fn ticker(&self) -> &str {
        self.prices.ticker()
    }

    pub fn prices(&self) -> &PriceSeries {
        &self.prices
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }
}

/// Compute every indicator column for `series`
pub fn compute_indicators(series: PriceSeries) -> Result<IndicatorSeries> {
    let mut volatility = StandardDeviation::new(VOLATILITY_WINDOW)?;
    let mut ma_20 = SimpleMovingAverage::new(SHORT_MA_PERIOD)?;
    let mut ma_50 = SimpleMovingAverage::new(LONG_MA_PERIOD)?;
    let mut rsi = RelativeStrengthIndex::new(RSI_PERIOD)?;

    let mut rows = Vec::with_capacity(series.len());
    let mut previous_close: Option<f64> = None;

    for bar in series.bars() {
        let close = bar.close;
        let (ret, log_return) = match previous_close {
            Some(prev) => (Some(close / prev - 1.0), Some((close / prev).ln())),
            None => (None, None),
        };

        if let Some(r) = ret {
            volatility.update(r)?;
        }
        ma_20.update(close)?;
        ma_50.update(close)?;
        rsi.update(close)?;

        rows.push(IndicatorRow {
            date: bar.date,
            close,
            ret,
            log_return,
            volatility_20: volatility.value().ok().map(annualize),
            ma_20: ma_20.value().ok(),
            ma_50: ma_50.value().ok(),
            rsi_14: rsi.value().ok(),
        });

        previous_close = Some(close);
    }

    Ok(IndicatorSeries {
        prices: series,
        rows,
    })
}
