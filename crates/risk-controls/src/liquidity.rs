//! Market liquidity check.

use async_trait::async_trait;
use risk_core::{
    MarketDataService, RiskAssessment, RiskError, RiskLevel, RiskProfile, RiskResult, RiskType,
};
use std::sync::Arc;
use tracing::debug;

use crate::control::RiskControl;

/// Flags trading symbols whose 24h USD volume is below the profile's floor.
pub struct LiquidityControl {
    market_data: Arc<dyn MarketDataService>,
}

impl LiquidityControl {
    pub fn new(market_data: Arc<dyn MarketDataService>) -> Self {
        Self { market_data }
    }
}

#[async_trait]
impl RiskControl for LiquidityControl {
    async fn evaluate(
        &self,
        user_id: &str,
        profile: &RiskProfile,
    ) -> RiskResult<Vec<RiskAssessment>> {
        let symbols = self
            .market_data
            .get_all_symbols()
            .await
            .map_err(|e| RiskError::market_data("symbols", e))?;

        let mut assessments = Vec::new();
        for info in symbols.iter().filter(|s| s.is_trading()) {
            let ticker = match self.market_data.get_ticker(&info.symbol).await {
                Ok(ticker) => ticker,
                Err(e) => {
                    debug!(symbol = %info.symbol, "Skipping symbol without ticker: {}", e);
                    continue;
                }
            };

            let usd_volume = ticker.usd_volume();
            if usd_volume >= profile.min_liquidity {
                continue;
            }

            assessments.push(
                RiskAssessment::new(
                    user_id,
                    RiskType::Liquidity,
                    RiskLevel::Medium,
                    format!(
                        "24h volume for {} is ${:.2}, below the minimum liquidity of ${:.2}",
                        info.symbol, usd_volume, profile.min_liquidity
                    ),
                )
                .with_symbol(&info.symbol)
                .with_recommendation("Reduce position size or trade a more liquid market"),
            );
        }

        Ok(assessments)
    }

    fn risk_type(&self) -> RiskType {
        RiskType::Liquidity
    }

    fn name(&self) -> &str {
        "Liquidity"
    }
}
