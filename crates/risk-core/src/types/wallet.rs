//! Wallet read model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Asset code, e.g. "BTC" or "USDT".
pub type Asset = String;

/// Balance of a single asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub asset: Asset,
    /// Available balance
    pub free: Decimal,
    /// Balance locked in open orders
    pub locked: Decimal,
    /// `free + locked`
    pub total: Decimal,
    /// USD value of `total`
    #[serde(default)]
    pub usd_value: Decimal,
}

impl Balance {
    pub fn new(asset: impl Into<Asset>, free: Decimal, locked: Decimal) -> Self {
        Self {
            asset: asset.into(),
            free,
            locked,
            total: free + locked,
            usd_value: Decimal::ZERO,
        }
    }

    pub fn with_usd_value(mut self, usd_value: Decimal) -> Self {
        self.usd_value = usd_value;
        self
    }
}

/// A user's exchange wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub balances: BTreeMap<Asset, Balance>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            user_id: user_id.into(),
            balances: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }

    /// Insert or replace the balance for its asset.
    pub fn with_balance(mut self, balance: Balance) -> Self {
        self.balances.insert(balance.asset.clone(), balance);
        self
    }

    pub fn balance(&self, asset: &str) -> Option<&Balance> {
        self.balances.get(asset)
    }

    /// Sum of every balance's `total`, regardless of asset.
    pub fn sum_of_totals(&self) -> Decimal {
        self.balances.values().map(|b| b.total).sum()
    }
}
