//! Portfolio concentration check.

use async_trait::async_trait;
use risk_core::{
    MarketDataService, PositionRepository, RiskAssessment, RiskError, RiskLevel, RiskProfile,
    RiskResult, RiskType, WalletRepository,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing::debug;

use crate::control::RiskControl;

/// Flags symbols holding more than the allowed share of the portfolio.
///
/// Portfolio value is every wallet balance total plus every open position at
/// its last price. Only positions are bucketed by symbol.
pub struct ConcentrationControl {
    market_data: Arc<dyn MarketDataService>,
    positions: Arc<dyn PositionRepository>,
    wallets: Arc<dyn WalletRepository>,
}

impl ConcentrationControl {
    pub fn new(
        market_data: Arc<dyn MarketDataService>,
        positions: Arc<dyn PositionRepository>,
        wallets: Arc<dyn WalletRepository>,
    ) -> Self {
        Self {
            market_data,
            positions,
            wallets,
        }
    }

    fn classify(concentration: Decimal, threshold: Decimal) -> RiskLevel {
        if concentration > threshold * dec!(1.5) {
            RiskLevel::High
        } else {
            RiskLevel::Medium
        }
    }
}

#[async_trait]
impl RiskControl for ConcentrationControl {
    async fn evaluate(
        &self,
        user_id: &str,
        profile: &RiskProfile,
    ) -> RiskResult<Vec<RiskAssessment>> {
        let wallet = self
            .wallets
            .get_by_user_id(user_id)
            .await
            .map_err(|e| RiskError::repository("wallet", e))?;
        let positions = self
            .positions
            .get_active_by_user(user_id)
            .await
            .map_err(|e| RiskError::repository("positions", e))?;

        let mut total_value = wallet
            .as_ref()
            .map(|w| w.sum_of_totals())
            .unwrap_or(Decimal::ZERO);

        // first-appearance order
        let mut by_symbol: Vec<(String, Decimal)> = Vec::new();

        for position in &positions {
            let ticker = match self.market_data.get_ticker(&position.symbol).await {
                Ok(ticker) => ticker,
                Err(e) => {
                    debug!(symbol = %position.symbol, "Skipping position without ticker: {}", e);
                    continue;
                }
            };

            let value = position.quantity * ticker.price;
            total_value += value;
            match by_symbol.iter_mut().find(|(s, _)| s == &position.symbol) {
                Some((_, bucket)) => *bucket += value,
                None => by_symbol.push((position.symbol.clone(), value)),
            }
        }

        if total_value <= Decimal::ZERO {
            return Ok(Vec::new());
        }

        let mut assessments = Vec::new();
        for (symbol, value) in by_symbol {
            let concentration = value / total_value;
            if concentration <= profile.max_concentration {
                continue;
            }

            let level = Self::classify(concentration, profile.max_concentration);
            assessments.push(
                RiskAssessment::new(
                    user_id,
                    RiskType::Concentration,
                    level,
                    format!(
                        "{} makes up {:.2}% of the portfolio, exceeding the maximum of {:.2}%",
                        symbol,
                        concentration * dec!(100),
                        profile.max_concentration * dec!(100)
                    ),
                )
                .with_recommendation(format!(
                    "Diversify the portfolio by reducing the {} position",
                    symbol
                ))
                .with_symbol(symbol),
            );
        }

        Ok(assessments)
    }

    fn risk_type(&self) -> RiskType {
        RiskType::Concentration
    }

    fn name(&self) -> &str {
        "Concentration"
    }
}
