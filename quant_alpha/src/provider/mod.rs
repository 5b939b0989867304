//! Price history providers.
//!
//! This module defines the [`HistoryProvider`] trait, the single seam through
//! which the analysis pipeline obtains daily bars. Concrete sources implement
//! it (a CSV directory, an offline placeholder for the live quote API) and
//! two decorators add behaviour on top of any source:
//!
//! - [`TimeoutProvider`] bounds the time a fetch may take and fails closed
//! - [`FallbackProvider`] substitutes the seeded synthetic series when the
//!   wrapped source cannot deliver data
//!
//! Tickers are normalized to the `.SA` suffix convention used by the quote
//! sources for B3 symbols; callers may pass either form.

pub mod csv_source;
pub mod synthetic;

use std::fmt;
use std::str::FromStr;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{QuantError, Result};
use crate::series::PriceSeries;

pub use csv_source::CsvHistorySource;
pub use synthetic::SyntheticGenerator;

/// Suffix the quote sources expect on B3 symbols
pub const MARKET_SUFFIX: &str = ".SA";

/// History window requested from a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1y")]
    OneYear,
    #[default]
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
}

impl Period {
    /// Approximate number of trading sessions in the window
    pub fn trading_days(self) -> usize {
        match self {
            Period::OneYear => 252,
            Period::TwoYears => 504,
            Period::FiveYears => 1260,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = QuantError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1y" => Ok(Period::OneYear),
            "2y" => Ok(Period::TwoYears),
            "5y" => Ok(Period::FiveYears),
            other => Err(QuantError::Config(format!(
                "unknown period {:?}, expected one of 1y, 2y, 5y",
                other
            ))),
        }
    }
}

/// A normalized B3 ticker
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticker {
    symbol: String,
}

impl Ticker {
    /// Normalize user input such as `"petr4"`, `" PETR4.SA "` or `"PETR4"`
    pub fn parse(input: &str) -> Result<Self> {
        let upper = input.trim().to_ascii_uppercase();
        let symbol = upper.strip_suffix(MARKET_SUFFIX).unwrap_or(&upper);

        if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(QuantError::InvalidTicker(input.to_string()));
        }

        Ok(Self {
            symbol: symbol.to_string(),
        })
    }

    /// Bare symbol, e.g. `PETR4`
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Symbol with the market suffix, e.g. `PETR4.SA`
    pub fn source_symbol(&self) -> String {
        format!("{}{}", self.symbol, MARKET_SUFFIX)
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

/// Trait for fetching daily price history for one ticker.
///
/// Implement this for each concrete data source. Implementations return the
/// most recent `period.trading_days()` bars at most, and report an empty or
/// failed retrieval as [`QuantError::DataUnavailable`].
pub trait HistoryProvider {
    /// Short name used in log lines
    fn name(&self) -> &str;

    /// Fetch the daily series for `ticker` over `period`
    fn get_history(&self, ticker: &Ticker, period: Period) -> Result<PriceSeries>;
}

impl<P: HistoryProvider + ?Sized> HistoryProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn get_history(&self, ticker: &Ticker, period: Period) -> Result<PriceSeries> {
        (**self).get_history(ticker, period)
    }
}

impl<P: HistoryProvider + ?Sized> HistoryProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn get_history(&self, ticker: &Ticker, period: Period) -> Result<PriceSeries> {
        (**self).get_history(ticker, period)
    }
}

/// Stand-in for the live quote API when no transport is configured.
///
/// Every request reports the source as unavailable, which lets a
/// [`FallbackProvider`] serve synthetic data.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSource;

impl HistoryProvider for OfflineSource {
    fn name(&self) -> &str {
        "offline"
    }

    fn get_history(&self, ticker: &Ticker, _period: Period) -> Result<PriceSeries> {
        Err(QuantError::DataUnavailable {
            ticker: ticker.source_symbol(),
            reason: "no live quote source configured".to_string(),
        })
    }
}

/// Bounds the wall-clock time of a fetch.
///
/// The wrapped source runs on a worker thread; when it does not answer in
/// time the call returns [`QuantError::Timeout`] and the late answer is
/// discarded. The worker itself is not cancelled: it lives until the wrapped
/// source returns, so a source that can hang must bound its own transport
/// timeout or each timed-out call keeps one thread alive.
#[derive(Debug)]
pub struct TimeoutProvider<P> {
    inner: Arc<P>,
    timeout: Duration,
}

impl<P> TimeoutProvider<P>
where
    P: HistoryProvider + Send + Sync + 'static,
{
    pub fn new(inner: P, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(inner),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<P> HistoryProvider for TimeoutProvider<P>
where
    P: HistoryProvider + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn get_history(&self, ticker: &Ticker, period: Period) -> Result<PriceSeries> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let request = ticker.clone();

        thread::Builder::new()
            .name(format!("fetch-{}", ticker.symbol()))
            .spawn(move || {
                // The receiver is gone when the caller already timed out
                let _ = tx.send(inner.get_history(&request, period));
            })?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(QuantError::Timeout {
                ticker: ticker.source_symbol(),
                timeout: self.timeout,
            }),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(QuantError::DataUnavailable {
                ticker: ticker.source_symbol(),
                reason: format!("{} fetch worker stopped without a result", self.inner.name()),
            }),
        }
    }
}

/// Serves synthetic history when the primary source cannot deliver data.
///
/// Only retrieval failures ([`QuantError::DataUnavailable`],
/// [`QuantError::Timeout`] and I/O errors) fall back. Malformed input such
/// as a CSV without a close column is returned unchanged, as is every error
/// when fallback is disabled.
#[derive(Debug)]
pub struct FallbackProvider<P> {
    primary: P,
    synthetic: SyntheticGenerator,
    enabled: bool,
}

impl<P: HistoryProvider> FallbackProvider<P> {
    pub fn new(primary: P, synthetic: SyntheticGenerator, enabled: bool) -> Self {
        Self {
            primary,
            synthetic,
            enabled,
        }
    }
}

fn is_retrieval_failure(err: &QuantError) -> bool {
    matches!(
        err,
        QuantError::DataUnavailable { .. } | QuantError::Timeout { .. } | QuantError::Io(_)
    )
}

impl<P: HistoryProvider> HistoryProvider for FallbackProvider<P> {
    fn name(&self) -> &str {
        self.primary.name()
    }

    fn get_history(&self, ticker: &Ticker, period: Period) -> Result<PriceSeries> {
        match self.primary.get_history(ticker, period) {
            Ok(series) => {
                debug!(
                    source = self.primary.name(),
                    ticker = %ticker,
                    bars = series.len(),
                    "history fetched"
                );
                Ok(series)
            }
            Err(err) if self.enabled && is_retrieval_failure(&err) => {
                warn!(
                    source = self.primary.name(),
                    ticker = %ticker,
                    error = %err,
                    "history source failed, using synthetic data"
                );
                self.synthetic.generate(ticker.symbol(), period.trading_days())
            }
            Err(err) => Err(err),
        }
    }
}
