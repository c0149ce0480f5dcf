//! JSON account snapshot.

use risk_core::{Candle, Order, Position, RiskProfile, SymbolInfo, Ticker, Wallet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::DataError;

/// Market and account state for one or more users, as loaded from disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountSnapshot {
    #[serde(default)]
    pub tickers: Vec<Ticker>,
    #[serde(default)]
    pub symbols: Vec<SymbolInfo>,
    /// Daily candles by symbol
    #[serde(default)]
    pub candles: BTreeMap<String, Vec<Candle>>,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub wallets: Vec<Wallet>,
    #[serde(default)]
    pub profiles: Vec<RiskProfile>,
}

impl AccountSnapshot {
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a snapshot file.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let json = std::fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
        Self::from_json(&json)
    }

    /// Every user id that appears anywhere in the snapshot, sorted.
    pub fn user_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .positions
            .iter()
            .map(|p| p.user_id.clone())
            .chain(self.orders.iter().map(|o| o.user_id.clone()))
            .chain(self.wallets.iter().map(|w| w.user_id.clone()))
            .chain(self.profiles.iter().map(|p| p.user_id.clone()))
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_core::{OrderStatus, SymbolStatus};
    use rust_decimal_macros::dec;

    const SNAPSHOT: &str = r#"{
        "tickers": [{"symbol": "BTCUSDT", "price": "42000", "volume": "1200.5"}],
        "symbols": [{"symbol": "BTCUSDT", "status": "TRADING"}],
        "orders": [{
            "id": "o-1", "user_id": "alice", "symbol": "BTCUSDT",
            "side": "BUY", "quantity": "0.1", "status": "NEW"
        }],
        "positions": [{
            "id": "p-1", "user_id": "bob", "symbol": "BTCUSDT",
            "quantity": "0.5", "entry_price": "40000", "current_price": "42000"
        }],
        "wallets": [{
            "user_id": "alice",
            "balances": {"USDT": {"asset": "USDT", "free": "900", "locked": "100", "total": "1000"}}
        }],
        "profiles": [{"user_id": "alice", "max_position_size": "5000"}]
    }"#;

    #[test]
    fn test_parse_snapshot() {
        let snapshot = AccountSnapshot::from_json(SNAPSHOT).unwrap();

        assert_eq!(snapshot.tickers[0].price, dec!(42000));
        assert_eq!(snapshot.symbols[0].status, SymbolStatus::Trading);
        assert_eq!(snapshot.orders[0].status, OrderStatus::New);
        assert!(snapshot.positions[0].is_open());
        assert_eq!(snapshot.wallets[0].sum_of_totals(), dec!(1000));
        assert_eq!(snapshot.profiles[0].max_position_size, dec!(5000));
        assert!(snapshot.candles.is_empty());
        assert_eq!(snapshot.user_ids(), vec!["alice", "bob"]);
    }

    #[test]
    fn test_invalid_snapshot() {
        let err = AccountSnapshot::from_json("{\"tickers\": 3}").unwrap_err();
        assert!(matches!(err, DataError::Snapshot(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = AccountSnapshot::load(Path::new("/nonexistent/snapshot.json")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read"));
    }
}
