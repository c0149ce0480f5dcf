//! Market volatility check.

use async_trait::async_trait;
use risk_core::{
    Interval, MarketDataService, RiskAssessment, RiskError, RiskLevel, RiskProfile, RiskResult,
    RiskType,
};
use std::sync::Arc;
use tracing::debug;

use crate::control::{to_f64, RiskControl};
use crate::stats;

/// Daily candles requested per symbol.
pub const LOOKBACK_CANDLES: usize = 14;

/// Fewer candles than this and the symbol is skipped.
pub const MIN_CANDLES: usize = 7;

/// Flags trading symbols whose daily return volatility exceeds the profile
/// threshold.
///
/// Volatility is in percent and is compared to `volatility_threshold` as is.
/// The message reports the threshold scaled to percent.
pub struct VolatilityControl {
    market_data: Arc<dyn MarketDataService>,
}

impl VolatilityControl {
    pub fn new(market_data: Arc<dyn MarketDataService>) -> Self {
        Self { market_data }
    }

    fn classify(volatility: f64, threshold: f64) -> RiskLevel {
        if volatility >= threshold * 2.0 {
            RiskLevel::Critical
        } else if volatility >= threshold * 1.5 {
            RiskLevel::High
        } else {
            RiskLevel::Medium
        }
    }
}

#[async_trait]
impl RiskControl for VolatilityControl {
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
        let threshold = to_f64(profile.volatility_threshold);

        let mut assessments = Vec::new();
        for info in symbols.iter().filter(|s| s.is_trading()) {
            let candles = match self
                .market_data
                .get_candles(&info.symbol, Interval::Day1, LOOKBACK_CANDLES)
                .await
            {
                Ok(candles) => candles,
                Err(e) => {
                    debug!(symbol = %info.symbol, "Skipping symbol without candles: {}", e);
                    continue;
                }
            };

            if candles.len() < MIN_CANDLES {
                debug!(symbol = %info.symbol, count = candles.len(), "Not enough candles");
                continue;
            }

            let Some(volatility) = stats::volatility_pct(&candles) else {
                continue;
            };
            if volatility <= threshold {
                continue;
            }

            assessments.push(
                RiskAssessment::new(
                    user_id,
                    RiskType::Volatility,
                    Self::classify(volatility, threshold),
                    format!(
                        "Market volatility for {} is {:.2}%, exceeding threshold of {:.2}%",
                        info.symbol,
                        volatility,
                        threshold * 100.0
                    ),
                )
                .with_symbol(&info.symbol)
                .with_recommendation("Consider reducing position size or using tighter stop losses"),
            );
        }

        Ok(assessments)
    }

    fn risk_type(&self) -> RiskType {
        RiskType::Volatility
    }

    fn name(&self) -> &str {
        "Market Volatility"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ports, StubAccounts, StubMarketData, USER};
    use risk_core::SymbolStatus;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// Closes whose returns alternate `+step`, `-step`, starting at 100.
    fn alternating(n: usize, step: f64) -> Vec<f64> {
        let mut closes = vec![100.0];
        for i in 1..n {
            let prev = closes[i - 1];
            let change = if i % 2 == 1 { step } else { -step };
            closes.push(prev * (1.0 + change));
        }
        closes
    }

    fn profile(threshold: Decimal) -> RiskProfile {
        let mut profile = RiskProfile::new(USER);
        profile.volatility_threshold = threshold;
        profile
    }

    async fn evaluate(market: StubMarketData, threshold: Decimal) -> Vec<RiskAssessment> {
        let (ports, _, _) = ports(market, StubAccounts::new());
        VolatilityControl::new(ports.market_data)
            .evaluate(USER, &profile(threshold))
            .await
            .unwrap()
    }

    fn volatile_market() -> StubMarketData {
        // 7 returns of +/-10% give roughly 9.9% volatility
        StubMarketData::new()
            .with_symbol("VOL", SymbolStatus::Trading)
            .with_closes("VOL", &alternating(8, 0.1))
    }

    #[tokio::test]
    async fn test_severity_bands() {
        let medium = evaluate(volatile_market(), dec!(9)).await;
        assert_eq!(medium[0].level, RiskLevel::Medium);

        let high = evaluate(volatile_market(), dec!(6)).await;
        assert_eq!(high[0].level, RiskLevel::High);

        let critical = evaluate(volatile_market(), dec!(4)).await;
        assert_eq!(critical[0].level, RiskLevel::Critical);

        assert!(evaluate(volatile_market(), dec!(10)).await.is_empty());
    }

    #[tokio::test]
    async fn test_message_and_recommendation() {
        let assessments = evaluate(volatile_market(), dec!(9)).await;
        assert_eq!(assessments.len(), 1);
        assert_eq!(assessments[0].symbol.as_deref(), Some("VOL"));
        assert_eq!(
            assessments[0].message,
            "Market volatility for VOL is 9.90%, exceeding threshold of 900.00%"
        );
        assert_eq!(
            assessments[0].recommendation,
            "Consider reducing position size or using tighter stop losses"
        );
    }

    #[tokio::test]
    async fn test_fractional_threshold_compared_against_percent() {
        // about 0.099% volatility against the default 0.05 threshold
        let market = StubMarketData::new()
            .with_symbol("CALM", SymbolStatus::Trading)
            .with_closes("CALM", &alternating(8, 0.001));

        let assessments = evaluate(market, dec!(0.05)).await;
        assert_eq!(assessments.len(), 1);
        assert_eq!(assessments[0].level, RiskLevel::High);
        assert!(assessments[0]
            .message
            .ends_with("exceeding threshold of 5.00%"));
    }

    #[tokio::test]
    async fn test_too_few_candles_skipped() {
        let market = StubMarketData::new()
            .with_symbol("NEW", SymbolStatus::Trading)
            .with_closes("NEW", &alternating(6, 0.2));
        assert!(evaluate(market, dec!(1)).await.is_empty());
    }

    #[tokio::test]
    async fn test_only_last_fourteen_candles_used() {
        let mut closes = alternating(6, 0.5);
        closes.extend(std::iter::repeat(100.0).take(LOOKBACK_CANDLES));
        let market = StubMarketData::new()
            .with_symbol("OLD", SymbolStatus::Trading)
            .with_closes("OLD", &closes);

        assert!(evaluate(market, dec!(0.01)).await.is_empty());
    }

    #[tokio::test]
    async fn test_candle_failure_and_halted_symbols_skipped() {
        let market = StubMarketData::new()
            .with_symbol("DOWN", SymbolStatus::Trading)
            .with_symbol("HALT", SymbolStatus::Halt)
            .with_symbol("VOL", SymbolStatus::Trading)
            .with_closes("HALT", &alternating(8, 0.3))
            .with_closes("VOL", &alternating(8, 0.1))
            .failing("DOWN");

        let assessments = evaluate(market, dec!(5)).await;
        assert_eq!(assessments.len(), 1);
        assert_eq!(assessments[0].symbol.as_deref(), Some("VOL"));
    }
}
