//! Configuration structures.

use risk_core::{RiskError, RiskProfile};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub evaluation: EvaluationSettings,
    #[serde(default)]
    pub default_profile: ProfileSettings,
}

impl AppConfig {
    /// Check cross-field constraints the types cannot express.
    pub fn validate(&self) -> Result<(), RiskError> {
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(RiskError::Config(format!(
                "logging.format must be \"pretty\" or \"json\", got \"{}\"",
                self.logging.format
            )));
        }
        if self.evaluation.page_size == 0 {
            return Err(RiskError::Config(
                "evaluation.page_size must be positive".to_string(),
            ));
        }
        if self.evaluation.timeout_secs == Some(0) {
            return Err(RiskError::Config(
                "evaluation.timeout_secs must be positive when set".to_string(),
            ));
        }
        self.default_profile
            .to_profile("default")
            .validate()
            .map_err(|e| RiskError::Config(format!("default_profile: {}", e)))
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "riskctl".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
    /// Log directory for a daily rolling file, in addition to stderr
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Evaluation scheduling and data access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationSettings {
    /// Run controls concurrently
    pub parallel: bool,
    /// Memoize market data within one evaluation
    pub cache_market_data: bool,
    pub timeout_secs: Option<u64>,
    /// Rows per page for paged repository reads
    pub page_size: usize,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            parallel: false,
            cache_market_data: true,
            timeout_secs: None,
            page_size: 500,
        }
    }
}

impl EvaluationSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Thresholds applied to users without a stored risk profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    pub max_position_size: Decimal,
    pub max_total_exposure: Decimal,
    pub max_drawdown: Decimal,
    pub max_leverage: Decimal,
    pub max_concentration: Decimal,
    pub min_liquidity: Decimal,
    pub volatility_threshold: Decimal,
    pub daily_loss_limit: Decimal,
    pub weekly_loss_limit: Decimal,
    pub enable_auto_risk_control: bool,
    pub enable_notifications: bool,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
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
        }
    }
}

impl ProfileSettings {
    /// Build a profile for a user from these thresholds.
    pub fn to_profile(&self, user_id: &str) -> RiskProfile {
        RiskProfile {
            max_position_size: self.max_position_size,
            max_total_exposure: self.max_total_exposure,
            max_drawdown: self.max_drawdown,
            max_leverage: self.max_leverage,
            max_concentration: self.max_concentration,
            min_liquidity: self.min_liquidity,
            volatility_threshold: self.volatility_threshold,
            daily_loss_limit: self.daily_loss_limit,
            weekly_loss_limit: self.weekly_loss_limit,
            enable_auto_risk_control: self.enable_auto_risk_control,
            enable_notifications: self.enable_notifications,
            ..RiskProfile::new(user_id)
        }
    }
}
