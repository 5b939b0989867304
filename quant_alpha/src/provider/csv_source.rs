//! Daily history from CSV files
//!
//! Accepts the two layouts produced by the download scripts around this
//! crate: English Yahoo-style headers (`Date, Open, High, Low, Close,
//! Volume`) and the Portuguese ones (`Data, Abertura, Máxima, Mínima,
//! Fechamento, Volume`). Header matching ignores case and accents.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{QuantError, Result};
use crate::provider::{HistoryProvider, Period, Ticker};
use crate::series::PriceSeries;
use crate::PriceBar;

/// File name pattern used by the download scripts
pub const FILE_SUFFIX: &str = "_diario_5anos.csv";

/// Where a [`CsvHistorySource`] looks for data
#[derive(Debug, Clone)]
enum Location {
    /// One `<SYMBOL>_diario_5anos.csv` file per ticker
    Directory(PathBuf),
    /// A single file served for whatever ticker is requested
    File(PathBuf),
}

/// History provider backed by CSV files on disk
#[derive(Debug, Clone)]
pub struct CsvHistorySource {
    location: Location,
}

impl CsvHistorySource {
    /// Read `<dir>/<SYMBOL>_diario_5anos.csv` for each ticker
    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::Directory(dir.into()),
        }
    }

    /// Serve one file regardless of the requested ticker
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
        }
    }

    fn path_for(&self, ticker: &Ticker) -> PathBuf {
        match &self.location {
            Location::Directory(dir) => dir.join(format!("{}{}", ticker.symbol(), FILE_SUFFIX)),
            Location::File(path) => path.clone(),
        }
    }
}

impl HistoryProvider for CsvHistorySource {
    fn name(&self) -> &str {
        "csv"
    }

    fn get_history(&self, ticker: &Ticker, period: Period) -> Result<PriceSeries> {
        let path = self.path_for(ticker);
        if !path.exists() {
            return Err(QuantError::DataUnavailable {
                ticker: ticker.source_symbol(),
                reason: format!("{} not found", path.display()),
            });
        }

        let series = read_history_file(&path, ticker.symbol())?;
        Ok(series.tail(period.trading_days()))
    }
}

/// Read a daily history CSV file
pub fn read_history_file(path: &Path, ticker: &str) -> Result<PriceSeries> {
    let file = File::open(path)?;
    read_history(file, ticker)
}

/// Required price columns with the names reported when absent
const REQUIRED: [(Column, &str); 5] = [
    (Column::Date, "Data"),
    (Column::Open, "Abertura"),
    (Column::High, "Maxima"),
    (Column::Low, "Minima"),
    (Column::Close, "Fechamento"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Date,
    Open,
    High,
    Low,
    Close,
    Volume,
}

fn classify(header: &str) -> Option<Column> {
    let folded: String = header
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'í' => 'i',
            'é' | 'ê' => 'e',
            other => other,
        })
        .collect();

    match folded.as_str() {
        "date" | "data" | "datetime" => Some(Column::Date),
        "open" | "abertura" => Some(Column::Open),
        "high" | "maxima" => Some(Column::High),
        "low" | "minima" => Some(Column::Low),
        "close" | "fechamento" => Some(Column::Close),
        "volume" => Some(Column::Volume),
        _ => None,
    }
}

/// Parse CSV history from any reader
///
/// Rows whose first field is not a date (the extra header lines some
/// download tools emit) are skipped. Bars are sorted by date and duplicate
/// dates are rejected.
pub fn read_history<R: Read>(reader: R, ticker: &str) -> Result<PriceSeries> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut index = [None; 6];
    for (i, header) in headers.iter().enumerate() {
        if let Some(column) = classify(header) {
            // First matching header wins, so "Close" beats a later "Adj Close"
            index[column as usize].get_or_insert(i);
        }
    }

    let missing: Vec<String> = REQUIRED
        .iter()
        .filter(|(column, _)| index[*column as usize].is_none())
        .map(|(_, name)| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(QuantError::MissingColumns(missing));
    }

    let col = |c: Column| index[c as usize].unwrap_or_default();
    let mut bars = Vec::new();

    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let Some(date) = record.get(col(Column::Date)).and_then(parse_date) else {
            debug!(line = line + 2, "skipping row without a date");
            continue;
        };

        let number = |c: Column| -> Result<f64> {
            let raw = record.get(col(c)).unwrap_or("").trim();
            raw.parse::<f64>().map_err(|_| {
                QuantError::InvalidData(format!(
                    "{}: bad {:?} value {:?} on line {}",
                    ticker,
                    c,
                    raw,
                    line + 2
                ))
            })
        };

        let volume = match index[Column::Volume as usize] {
            Some(i) => record
                .get(i)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .map(|v| v.max(0.0) as u64)
                .unwrap_or(0),
            None => 0,
        };

        bars.push(PriceBar {
            date,
            open: number(Column::Open)?,
            high: number(Column::High)?,
            low: number(Column::Low)?,
            close: number(Column::Close)?,
            volume,
        });
    }

    bars.sort_by_key(|b| b.date);
    debug!(ticker, bars = bars.len(), "parsed CSV history");
    PriceSeries::new(ticker, bars)
}

/// Accepts `2024-01-31`, `2024-01-31 00:00:00` and `2024-01-31T00:00:00-03:00`
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
