//! Error types for the quant_alpha crate

use std::time::Duration;

use polars::prelude::PolarsError;
use thiserror::Error;
use trade_math::MathError;

/// Errors raised by the providers and the analysis pipeline
#[derive(Debug, Error)]
pub enum QuantError {
    /// The history source returned nothing or could not be reached
    #[error("No data available for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    /// The source did not answer within the configured timeout
    #[error("Timed out after {timeout:?} fetching history for {ticker}")]
    Timeout { ticker: String, timeout: Duration },

    /// One or more required columns are absent from an input file
    #[error("Missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Input rows violate the price series invariants
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Not enough bars for the requested calculation
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid ticker: {0:?}")]
    InvalidTicker(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Math error: {0}")]
    Math(#[from] MathError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, QuantError>;

impl From<PolarsError> for QuantError {
    fn from(err: PolarsError) -> Self {
        QuantError::Polars(err.to_string())
    }
}

impl From<toml::de::Error> for QuantError {
    fn from(err: toml::de::Error) -> Self {
        QuantError::Config(err.to_string())
    }
}
