//! Builders shared by the unit tests

use chrono::{Duration, NaiveDate};

use crate::series::PriceSeries;
use crate::PriceBar;

/// Daily series with open/high/low equal to the close
pub(crate) fn series_from_closes(closes: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000,
        })
        .collect();
    PriceSeries::new("TEST3", bars).unwrap()
}

/// Oscillating closes with a slight upward drift
pub(crate) fn zigzag(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.05)
        .collect()
}
