//! Position drawdown check.

use async_trait::async_trait;
use risk_core::{
    MarketDataService, PositionRepository, RiskAssessment, RiskError, RiskLevel, RiskProfile,
    RiskResult, RiskType,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::control::RiskControl;

/// Flags open positions whose loss against entry exceeds the maximum drawdown.
pub struct DrawdownControl {
    market_data: Arc<dyn MarketDataService>,
    positions: Arc<dyn PositionRepository>,
}

impl DrawdownControl {
    pub fn new(
        market_data: Arc<dyn MarketDataService>,
        positions: Arc<dyn PositionRepository>,
    ) -> Self {
        Self {
            market_data,
            positions,
        }
    }

    fn classify(drawdown_pct: Decimal, max_pct: Decimal) -> (RiskLevel, &'static str) {
        if drawdown_pct >= max_pct * dec!(2) {
            (
                RiskLevel::Critical,
                "Close the position immediately to limit further losses",
            )
        } else if drawdown_pct >= max_pct * dec!(1.5) {
            (
                RiskLevel::High,
                "Tighten the stop loss or reduce the position size",
            )
        } else {
            (
                RiskLevel::Medium,
                "Monitor the position closely and consider setting a stop loss",
            )
        }
    }
}

#[async_trait]
impl RiskControl for DrawdownControl {
    async fn evaluate(
        &self,
        user_id: &str,
        profile: &RiskProfile,
    ) -> RiskResult<Vec<RiskAssessment>> {
        let positions = self
            .positions
            .get_active_by_user(user_id)
            .await
            .map_err(|e| RiskError::repository("positions", e))?;
        let max_pct = profile.max_drawdown * dec!(100);

        let mut assessments = Vec::new();
        for position in &positions {
            let ticker = match self.market_data.get_ticker(&position.symbol).await {
                Ok(ticker) => ticker,
                Err(e) => {
                    debug!(symbol = %position.symbol, position_id = %position.id, "Skipping position without ticker: {}", e);
                    continue;
                }
            };

            let entry_value = position.entry_value();
            if entry_value <= Decimal::ZERO {
                continue;
            }
            let current_value = position.quantity * ticker.price;
            if current_value >= entry_value {
                continue;
            }

            let drawdown_pct = (entry_value - current_value) / entry_value * dec!(100);
            if drawdown_pct <= max_pct {
                continue;
            }

            let (level, recommendation) = Self::classify(drawdown_pct, max_pct);
            assessments.push(
                RiskAssessment::new(
                    user_id,
                    RiskType::Drawdown,
                    level,
                    format!(
                        "{} position is down {:.2}%, exceeding the maximum drawdown of {:.2}%",
                        position.symbol, drawdown_pct, max_pct
                    ),
                )
                .with_symbol(&position.symbol)
                .with_position_id(&position.id)
                .with_recommendation(recommendation)
                .with_metadata(json!({
                    "entry_value": entry_value,
                    "current_value": current_value,
                })),
            );
        }

        Ok(assessments)
    }

    fn risk_type(&self) -> RiskType {
        RiskType::Drawdown
    }

    fn name(&self) -> &str {
        "Drawdown"
    }
}
