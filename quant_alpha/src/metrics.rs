//! Loader for the precomputed per-weekday strategy metrics
//!
//! The metrics files hold one row per (ticker, weekday) with the results of
//! an opening-range strategy: expectancy in points, profit factor, hit rate,
//! trade count, ATR(14), 10-minute opening range, drawdown and prior close.

use std::fs::File;
use std::path::Path;

use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::{QuantError, Result};

/// Columns every metrics file must provide
pub const REQUIRED_METRIC_COLUMNS: [&str; 10] = [
    "Expectativa_Pontos",
    "Fator_Lucro_MME",
    "Taxa_Acerto",
    "N_Trades",
    "ATR14_Medio",
    "OR10_Medio",
    "Drawdown_Medio",
    "Fechamento_Ant_Medio",
    "Ticker",
    "Dia_Semana",
];

/// Load a metrics CSV and check its columns
pub fn load_metrics(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let df = CsvReader::new(file)
        .infer_schema(Some(100))
        .has_header(true)
        .finish()?;

    validate_metric_columns(&df)?;
    debug!(path = %path.display(), rows = df.height(), "loaded metrics");
    Ok(df)
}

/// Fail with every missing required column named
pub fn validate_metric_columns(df: &DataFrame) -> Result<()> {
    let present = df.get_column_names();
    let missing: Vec<String> = REQUIRED_METRIC_COLUMNS
        .iter()
        .filter(|name| !present.contains(*name))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(QuantError::MissingColumns(missing))
    }
}

/// One row of a metrics file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    pub ticker: String,
    pub weekday: String,
    /// Mean result per trade, in points
    pub expectancy: f64,
    pub profit_factor: f64,
    pub hit_rate: f64,
    pub trades: i64,
    pub atr14: f64,
    pub opening_range: f64,
    pub drawdown: f64,
    pub prior_close: f64,
}

fn float_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = df.column(name)?.cast(&DataType::Float64)?;
    Ok(series
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

fn text_column(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let series = df.column(name)?.cast(&DataType::Utf8)?;
    series
        .utf8()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.map(str::to_string).ok_or_else(|| {
                QuantError::InvalidData(format!("{} is empty on row {}", name, row + 1))
            })
        })
        .collect()
}

/// Convert a validated metrics frame into records; missing numbers become NaN
pub fn metric_records(df: &DataFrame) -> Result<Vec<MetricRecord>> {
    validate_metric_columns(df)?;

    let tickers = text_column(df, "Ticker")?;
    let weekdays = text_column(df, "Dia_Semana")?;
    let expectancy = float_column(df, "Expectativa_Pontos")?;
    let profit_factor = float_column(df, "Fator_Lucro_MME")?;
    let hit_rate = float_column(df, "Taxa_Acerto")?;
    let atr14 = float_column(df, "ATR14_Medio")?;
    let opening_range = float_column(df, "OR10_Medio")?;
    let drawdown = float_column(df, "Drawdown_Medio")?;
    let prior_close = float_column(df, "Fechamento_Ant_Medio")?;

    let trades_series = df.column("N_Trades")?.cast(&DataType::Int64)?;
    let trades: Vec<i64> = trades_series
        .i64()?
        .into_iter()
        .map(|v| v.unwrap_or(0))
        .collect();

    Ok((0..df.height())
        .map(|i| MetricRecord {
            ticker: tickers[i].clone(),
            weekday: weekdays[i].clone(),
            expectancy: expectancy[i],
            profit_factor: profit_factor[i],
            hit_rate: hit_rate[i],
            trades: trades[i],
            atr14: atr14[i],
            opening_range: opening_range[i],
            drawdown: drawdown[i],
            prior_close: prior_close[i],
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Ticker,Dia_Semana,Expectativa_Pontos,Fator_Lucro_MME,Taxa_Acerto,N_Trades,ATR14_Medio,OR10_Medio,Drawdown_Medio,Fechamento_Ant_Medio";

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_complete_file() {
        let file = write_csv(&format!(
            "{}\nPOMO4,Segunda,0.12,1.8,0.61,42,0.35,0.21,-0.9,7.4\nWEGE3,Sexta,-0.05,0.9,0.48,38,1.2,0.8,-3.1,41.0\n",
            HEADER
        ));

        let df = load_metrics(file.path()).unwrap();
        assert_eq!(df.height(), 2);

        let records = metric_records(&df).unwrap();
        assert_eq!(records[0].ticker, "POMO4");
        assert_eq!(records[0].weekday, "Segunda");
        assert_eq!(records[0].trades, 42);
        assert_eq!(records[1].profit_factor, 0.9);
        assert_eq!(records[1].drawdown, -3.1);
    }

    #[test]
    fn test_missing_columns_are_all_named() {
        let file = write_csv(
            "Ticker,Expectativa_Pontos,Fator_Lucro_MME,Taxa_Acerto,N_Trades,ATR14_Medio,Drawdown_Medio,Fechamento_Ant_Medio\nPOMO4,0.1,1.2,0.5,10,0.3,-1.0,7.0\n",
        );

        let err = load_metrics(file.path()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("OR10_Medio"), "{}", message);
        assert!(message.contains("Dia_Semana"), "{}", message);
        assert!(!message.contains("Ticker"), "{}", message);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_metrics("/nonexistent/metricas.csv"),
            Err(QuantError::Io(_))
        ));
    }
}
