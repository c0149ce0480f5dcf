//! Position read model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionSide {
    #[default]
    Long,
    Short,
}

/// Position lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionStatus {
    #[default]
    Open,
    Closed,
}

/// A position in a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: String,
    pub user_id: String,
    pub symbol: String,
    #[serde(default)]
    pub side: PositionSide,
    /// Held quantity (always positive; direction is in `side`)
    pub quantity: Decimal,
    /// Average entry price
    pub entry_price: Decimal,
    /// Last mark stored with the position
    pub current_price: Decimal,
    #[serde(default)]
    pub status: PositionStatus,
    #[serde(default = "Utc::now")]
    pub opened_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Position {
    /// Create a new open long position marked at its entry price.
    pub fn new(
        user_id: impl Into<String>,
        symbol: impl Into<String>,
        quantity: Decimal,
        entry_price: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            symbol: symbol.into(),
            side: PositionSide::Long,
            quantity,
            entry_price,
            current_price: entry_price,
            status: PositionStatus::Open,
            opened_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_status(mut self, status: PositionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    /// Value at entry (`quantity × entry_price`).
    pub fn entry_value(&self) -> Decimal {
        self.quantity * self.entry_price
    }

    /// Value at the stored mark (`quantity × current_price`).
    pub fn market_value(&self) -> Decimal {
        self.quantity * self.current_price
    }

    /// Update the stored mark.
    pub fn update_price(&mut self, price: Decimal) {
        self.current_price = price;
        self.updated_at = Utc::now();
    }
}
