//! Validated daily price series for a single ticker

use crate::error::{QuantError, Result};
use crate::PriceBar;

/// Ordered daily bars for one ticker
///
/// Dates are strictly increasing and every price is finite and positive.
/// The bars cannot be mutated once the series is built.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, checking ordering and price sanity
    pub fn new(ticker: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self> {
        let ticker = ticker.into();

        if bars.is_empty() {
            return Err(QuantError::DataUnavailable {
                ticker,
                reason: "price series is empty".to_string(),
            });
        }

        for (i, bar) in bars.iter().enumerate() {
            let prices = [bar.open, bar.high, bar.low, bar.close];
            if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
                return Err(QuantError::InvalidData(format!(
                    "{}: non-positive or non-finite price on {}",
                    ticker, bar.date
                )));
            }
            if i > 0 && bar.date <= bars[i - 1].date {
                return Err(QuantError::InvalidData(format!(
                    "{}: dates must be strictly increasing ({} follows {})",
                    ticker,
                    bar.date,
                    bars[i - 1].date
                )));
            }
        }

        Ok(Self { ticker, bars })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Close prices in date order
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Most recent bar
    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Keep only the most recent `count` bars
    pub fn tail(self, count: usize) -> Self {
        if self.bars.len() <= count {
            return self;
        }
        let start = self.bars.len() - count;
        Self {
            ticker: self.ticker,
            bars: self.bars[start..].to_vec(),
        }
    }
}
