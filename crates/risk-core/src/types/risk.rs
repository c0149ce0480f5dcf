//! Risk profile, risk assessment and risk metrics types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::RiskError;

/// Severity of a detected risk. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Numeric score (0-100) carried by assessments of this level.
    pub fn score(&self) -> f64 {
        match self {
            RiskLevel::Low => 25.0,
            RiskLevel::Medium => 50.0,
            RiskLevel::High => 75.0,
            RiskLevel::Critical => 100.0,
        }
    }

    /// All levels, least severe first.
    pub fn all() -> &'static [RiskLevel] {
        &[
            RiskLevel::Low,
            RiskLevel::Medium,
            RiskLevel::High,
            RiskLevel::Critical,
        ]
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Category of risk a control checks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskType {
    /// Single order/position size
    Position,
    /// Market volatility
    Volatility,
    /// Market liquidity
    Liquidity,
    /// Total market exposure
    Exposure,
    /// Too much of the portfolio in one asset
    Concentration,
    /// Losses on open positions
    Drawdown,
}

impl fmt::Display for RiskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskType::Position => write!(f, "POSITION"),
            RiskType::Volatility => write!(f, "VOLATILITY"),
            RiskType::Liquidity => write!(f, "LIQUIDITY"),
            RiskType::Exposure => write!(f, "EXPOSURE"),
            RiskType::Concentration => write!(f, "CONCENTRATION"),
            RiskType::Drawdown => write!(f, "DRAWDOWN"),
        }
    }
}

/// Lifecycle state of an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskStatus {
    Active,
    Resolved,
    Ignored,
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskStatus::Active => write!(f, "ACTIVE"),
            RiskStatus::Resolved => write!(f, "RESOLVED"),
            RiskStatus::Ignored => write!(f, "IGNORED"),
        }
    }
}

/// Per-user risk tolerance. Every control reads its threshold from here.
///
/// Fields missing from serialized input take the built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskProfile {
    pub id: Uuid,
    pub user_id: String,
    /// Maximum value of a single order/position in quote currency
    pub max_position_size: Decimal,
    /// Maximum total value across all positions
    pub max_total_exposure: Decimal,
    /// Maximum drawdown of a position, as a fraction (0-1)
    pub max_drawdown: Decimal,
    /// Maximum allowed leverage
    pub max_leverage: Decimal,
    /// Maximum share of the portfolio in one symbol, as a fraction (0-1)
    pub max_concentration: Decimal,
    /// Minimum 24h USD volume for a symbol to count as liquid
    pub min_liquidity: Decimal,
    /// Volatility warning threshold
    pub volatility_threshold: Decimal,
    /// Maximum loss in a day
    pub daily_loss_limit: Decimal,
    /// Maximum loss in a week
    pub weekly_loss_limit: Decimal,
    pub enable_auto_risk_control: bool,
    pub enable_notifications: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RiskProfile {
    /// Create a profile with the built-in conservative defaults.
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            max_position_size: dec!(1000),
            max_total_exposure: dec!(5000),
            max_drawdown: dec!(0.1),
            max_leverage: dec!(3),
            max_concentration: dec!(0.2),
            min_liquidity: dec!(10000),
            volatility_threshold: dec!(0.05),
            daily_loss_limit: dec!(100),
            weekly_loss_limit: dec!(500),
            enable_auto_risk_control: true,
            enable_notifications: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check the profile invariants.
    pub fn validate(&self) -> Result<(), RiskError> {
        let thresholds = [
            ("max_position_size", self.max_position_size),
            ("max_total_exposure", self.max_total_exposure),
            ("max_drawdown", self.max_drawdown),
            ("max_leverage", self.max_leverage),
            ("max_concentration", self.max_concentration),
            ("min_liquidity", self.min_liquidity),
            ("volatility_threshold", self.volatility_threshold),
            ("daily_loss_limit", self.daily_loss_limit),
            ("weekly_loss_limit", self.weekly_loss_limit),
        ];

        for (name, value) in thresholds {
            if value < Decimal::ZERO {
                return Err(RiskError::Validation(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }

        for (name, value) in [
            ("max_drawdown", self.max_drawdown),
            ("max_concentration", self.max_concentration),
        ] {
            if value > Decimal::ONE {
                return Err(RiskError::Validation(format!(
                    "{} is a fraction and must not exceed 1, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

impl Default for RiskProfile {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// A single detected risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub id: Uuid,
    pub user_id: String,
    #[serde(rename = "type")]
    pub risk_type: RiskType,
    pub level: RiskLevel,
    pub status: RiskStatus,
    /// Symbol for symbol-specific risks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Numeric score (0-100), always `level.score()`
    pub score: f64,
    /// Human-readable description of the risk
    pub message: String,
    /// Suggested action to mitigate the risk
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set exactly when `status` is `Resolved`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl RiskAssessment {
    /// Create an active assessment scored from its level.
    pub fn new(
        user_id: impl Into<String>,
        risk_type: RiskType,
        level: RiskLevel,
        message: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            risk_type,
            level,
            status: RiskStatus::Active,
            symbol: None,
            position_id: None,
            order_id: None,
            score: level.score(),
            message: message.into(),
            recommendation: String::new(),
            metadata: None,
            created_at: now,
            updated_at: now,
            resolved_at: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_position_id(mut self, position_id: impl Into<String>) -> Self {
        self.position_id = Some(position_id.into());
        self
    }

    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = recommendation.into();
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == RiskStatus::Active
    }

    /// Mark the risk as resolved.
    pub fn resolve(&mut self) {
        let now = Utc::now();
        self.status = RiskStatus::Resolved;
        self.resolved_at = Some(now);
        self.updated_at = now;
    }

    /// Mark the risk as acknowledged but ignored.
    pub fn ignore(&mut self) {
        self.status = RiskStatus::Ignored;
        self.resolved_at = None;
        self.updated_at = Utc::now();
    }
}

/// Point-in-time risk figures for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub user_id: String,
    /// Sum of open position market values
    pub total_exposure: Decimal,
    /// Largest single-symbol share of `total_exposure` (0-1)
    pub highest_concentration: Decimal,
    pub open_positions: usize,
    pub active_risks: usize,
    /// Active risks at `High` or `Critical`
    #[serde(default)]
    pub high_risk_count: usize,
    pub computed_at: DateTime<Utc>,
}
