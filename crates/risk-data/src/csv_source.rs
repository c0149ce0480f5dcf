//! Candle CSV loading.

use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use risk_core::Candle;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::error::DataError;

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CandleRecord {
    #[serde(
        alias = "Date",
        alias = "date",
        alias = "timestamp",
        alias = "Timestamp",
        alias = "open_time"
    )]
    date: String,
    #[serde(alias = "Open", alias = "open")]
    open: f64,
    #[serde(alias = "High", alias = "high")]
    high: f64,
    #[serde(alias = "Low", alias = "low")]
    low: f64,
    #[serde(alias = "Close", alias = "close")]
    close: f64,
    #[serde(alias = "Volume", alias = "volume", default)]
    volume: f64,
}

/// Load candles from a CSV file, oldest first.
pub fn load_candles(path: &Path) -> Result<Vec<Candle>, DataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DataError::Parse(format!("{}: {}", path.display(), e)))?;

    let mut candles = Vec::new();
    for result in reader.deserialize() {
        let record: CandleRecord =
            result.map_err(|e| DataError::Parse(format!("{}: {}", path.display(), e)))?;
        candles.push(Candle::new(
            parse_timestamp(&record.date)?,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        ));
    }

    candles.sort_by_key(|c| c.open_time);
    Ok(candles)
}

/// Load every `*.csv` file in a directory as candles keyed by symbol.
///
/// The symbol is the file stem up to the first `_`, so `BTCUSDT_1d.csv`
/// and `BTCUSDT.csv` both load as `BTCUSDT`.
pub fn load_candle_dir(dir: &Path) -> Result<BTreeMap<String, Vec<Candle>>, DataError> {
    let entries = std::fs::read_dir(dir).map_err(|e| DataError::io(dir, e))?;

    let mut by_symbol = BTreeMap::new();
    for entry in entries {
        let path = entry.map_err(|e| DataError::io(dir, e))?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let symbol = stem.split('_').next().unwrap_or(stem).to_string();

        let candles = load_candles(&path)?;
        debug!(symbol = %symbol, count = candles.len(), "Loaded candles");
        by_symbol.insert(symbol, candles);
    }

    if by_symbol.is_empty() {
        return Err(DataError::NoDataAvailable(format!(
            "no candle files in {}",
            dir.display()
        )));
    }
    Ok(by_symbol)
}

/// Parse a timestamp into Unix milliseconds.
fn parse_timestamp(value: &str) -> Result<i64, DataError> {
    let formats = ["%Y-%m-%d", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d"];

    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
        if let Some(dt) = NaiveDate::parse_from_str(value, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    if let Ok(ts) = value.parse::<i64>() {
        // seconds unless it has millisecond magnitude
        return Ok(if ts > 10_000_000_000 { ts } else { ts * 1000 });
    }

    Err(DataError::Parse(format!("Could not parse date: {}", value)))
}
