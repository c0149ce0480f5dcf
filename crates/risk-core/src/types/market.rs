//! Market data read models: tickers, symbols and candles.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Latest market snapshot for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    /// Last traded price
    pub price: Decimal,
    /// 24h base-asset volume
    pub volume: Decimal,
    /// 24h price change in percent
    #[serde(default)]
    pub price_change_pct: f64,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Ticker {
    pub fn new(symbol: impl Into<String>, price: Decimal, volume: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            volume,
            price_change_pct: 0.0,
            timestamp: Utc::now(),
        }
    }

    /// 24h volume expressed in quote currency (`volume × price`).
    pub fn usd_volume(&self) -> Decimal {
        self.volume * self.price
    }
}

/// Trading status of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SymbolStatus {
    Trading,
    Halt,
    Break,
}

/// A tradeable pair listed on the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    /// Pair identifier, e.g. "BTCUSDT"
    pub symbol: String,
    #[serde(default)]
    pub base_asset: String,
    #[serde(default)]
    pub quote_asset: String,
    pub status: SymbolStatus,
}

impl SymbolInfo {
    pub fn new(symbol: impl Into<String>, status: SymbolStatus) -> Self {
        Self {
            symbol: symbol.into(),
            base_asset: String::new(),
            quote_asset: String::new(),
            status,
        }
    }

    pub fn is_trading(&self) -> bool {
        self.status == SymbolStatus::Trading
    }
}

/// OHLCV candle. Uses f64 like the statistics that consume it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Open time, Unix milliseconds
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Candle {
    pub fn new(open_time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Candle whose open, high, low and close are all `close`.
    pub fn flat(open_time: i64, close: f64) -> Self {
        Self::new(open_time, close, close, close, close, 0.0)
    }

    /// Open time as a DateTime.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.open_time)
    }
}
