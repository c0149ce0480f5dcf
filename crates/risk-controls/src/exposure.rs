//! Total exposure check.

use async_trait::async_trait;
use risk_core::{
    MarketDataService, PositionRepository, RiskAssessment, RiskLevel, RiskProfile, RiskResult,
    RiskType,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::control::{fetch_all_positions, RiskControl, DEFAULT_PAGE_SIZE};

/// Flags a user whose positions, valued at last price, exceed the maximum
/// total exposure. Emits at most one assessment.
///
/// Every position the repository returns is counted, whatever its status.
pub struct ExposureControl {
    market_data: Arc<dyn MarketDataService>,
    positions: Arc<dyn PositionRepository>,
    page_size: usize,
}

impl ExposureControl {
    pub fn new(
        market_data: Arc<dyn MarketDataService>,
        positions: Arc<dyn PositionRepository>,
    ) -> Self {
        Self {
            market_data,
            positions,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    fn classify(exposure: Decimal, limit: Decimal) -> RiskLevel {
        if exposure >= limit * dec!(1.5) {
            RiskLevel::Critical
        } else if exposure >= limit * dec!(1.25) {
            RiskLevel::High
        } else {
            RiskLevel::Medium
        }
    }
}

#[async_trait]
impl RiskControl for ExposureControl {
    async fn evaluate(
        &self,
        user_id: &str,
        profile: &RiskProfile,
    ) -> RiskResult<Vec<RiskAssessment>> {
        let positions =
            fetch_all_positions(self.positions.as_ref(), user_id, self.page_size).await?;

        let mut total_exposure = Decimal::ZERO;
        let mut priced = 0usize;
        for position in &positions {
            match self.market_data.get_ticker(&position.symbol).await {
                Ok(ticker) => {
                    total_exposure += position.quantity * ticker.price;
                    priced += 1;
                }
                Err(e) => {
                    debug!(symbol = %position.symbol, "Skipping position without ticker: {}", e);
                }
            }
        }

        if total_exposure <= profile.max_total_exposure {
            return Ok(Vec::new());
        }

        let level = Self::classify(total_exposure, profile.max_total_exposure);
        let assessment = RiskAssessment::new(
            user_id,
            RiskType::Exposure,
            level,
            format!(
                "Total exposure of {:.2} exceeds the maximum of {:.2}",
                total_exposure, profile.max_total_exposure
            ),
        )
        .with_recommendation("Reduce overall exposure by closing or shrinking positions")
        .with_metadata(json!({
            "total_exposure": total_exposure,
            "max_total_exposure": profile.max_total_exposure,
            "positions": priced,
        }));

        Ok(vec![assessment])
    }

    fn risk_type(&self) -> RiskType {
        RiskType::Exposure
    }

    fn name(&self) -> &str {
        "Total Exposure"
    }
}
