//! Order size check.

use async_trait::async_trait;
use risk_core::{
    MarketDataService, OrderRepository, RiskAssessment, RiskLevel, RiskProfile, RiskResult,
    RiskType,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::control::{fetch_all_orders, RiskControl, DEFAULT_PAGE_SIZE};

/// Flags pending orders whose value at the last price exceeds the profile's
/// maximum position size.
pub struct PositionSizeControl {
    market_data: Arc<dyn MarketDataService>,
    orders: Arc<dyn OrderRepository>,
    page_size: usize,
}

impl PositionSizeControl {
    pub fn new(market_data: Arc<dyn MarketDataService>, orders: Arc<dyn OrderRepository>) -> Self {
        Self {
            market_data,
            orders,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

#[async_trait]
impl RiskControl for PositionSizeControl {
    async fn evaluate(
        &self,
        user_id: &str,
        profile: &RiskProfile,
    ) -> RiskResult<Vec<RiskAssessment>> {
        let orders = fetch_all_orders(self.orders.as_ref(), user_id, self.page_size).await?;
        let mut assessments = Vec::new();

        for order in orders.iter().filter(|o| !o.status.is_filled_or_canceled()) {
            let ticker = match self.market_data.get_ticker(&order.symbol).await {
                Ok(ticker) => ticker,
                Err(e) => {
                    debug!(symbol = %order.symbol, order_id = %order.id, "Skipping order without ticker: {}", e);
                    continue;
                }
            };

            let order_value = order.quantity * ticker.price;
            if order_value <= profile.max_position_size {
                continue;
            }

            let assessment = RiskAssessment::new(
                user_id,
                RiskType::Position,
                RiskLevel::High,
                format!(
                    "Order value {:.2} exceeds maximum position size {:.2}",
                    order_value, profile.max_position_size
                ),
            )
            .with_symbol(&order.symbol)
            .with_order_id(&order.id)
            .with_recommendation(format!(
                "Reduce order size to below {:.2}",
                profile.max_position_size
            ))
            .with_metadata(json!({
                "order_value": order_value,
                "price": ticker.price,
                "max_position_size": profile.max_position_size,
            }));
            assessments.push(assessment);
        }

        Ok(assessments)
    }

    fn risk_type(&self) -> RiskType {
        RiskType::Position
    }

    fn name(&self) -> &str {
        "Position Size"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ports, StubAccounts, StubMarketData, USER};
    use risk_core::{Order, OrderStatus, RiskError, Side};
    use rust_decimal_macros::dec;
    use std::sync::atomic::Ordering;

    fn control(market: StubMarketData, accounts: StubAccounts) -> PositionSizeControl {
        let (ports, _, _) = ports(market, accounts);
        PositionSizeControl::new(ports.market_data, ports.orders)
    }

    #[tokio::test]
    async fn test_pending_order_over_limit() {
        let market = StubMarketData::new().with_ticker("X", dec!(3000), dec!(10));
        let order = Order::market(USER, "X", Side::Buy, dec!(0.5)).with_id("o-1");
        let control = control(market, StubAccounts::new().with_order(order));

        let assessments = control
            .evaluate(USER, &RiskProfile::new(USER))
            .await
            .unwrap();

        assert_eq!(assessments.len(), 1);
        let assessment = &assessments[0];
        assert_eq!(assessment.risk_type, RiskType::Position);
        assert_eq!(assessment.level, RiskLevel::High);
        assert_eq!(assessment.symbol.as_deref(), Some("X"));
        assert_eq!(assessment.order_id.as_deref(), Some("o-1"));
        assert_eq!(
            assessment.message,
            "Order value 1500.00 exceeds maximum position size 1000.00"
        );
        assert_eq!(assessment.recommendation, "Reduce order size to below 1000.00");
    }

    #[tokio::test]
    async fn test_order_at_limit_passes() {
        let market = StubMarketData::new().with_ticker("X", dec!(2000), dec!(10));
        let order = Order::market(USER, "X", Side::Buy, dec!(0.5));
        let control = control(market, StubAccounts::new().with_order(order));

        let assessments = control.evaluate(USER, &RiskProfile::new(USER)).await.unwrap();
        assert!(assessments.is_empty());
    }

    #[tokio::test]
    async fn test_filled_and_canceled_orders_ignored() {
        let market = StubMarketData::new().with_ticker("X", dec!(3000), dec!(10));
        let accounts = StubAccounts::new()
            .with_order(Order::market(USER, "X", Side::Buy, dec!(1)).with_status(OrderStatus::Filled))
            .with_order(
                Order::market(USER, "X", Side::Buy, dec!(1)).with_status(OrderStatus::Canceled),
            )
            .with_order(
                Order::market(USER, "X", Side::Buy, dec!(1)).with_status(OrderStatus::Rejected),
            );
        let control = control(market, accounts);

        let assessments = control.evaluate(USER, &RiskProfile::new(USER)).await.unwrap();
        // Rejected is not filled or canceled, so it is still checked
        assert_eq!(assessments.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_ticker_skips_order() {
        let market = StubMarketData::new()
            .with_ticker("X", dec!(3000), dec!(10))
            .failing("Y");
        let accounts = StubAccounts::new()
            .with_order(Order::market(USER, "Y", Side::Buy, dec!(10)))
            .with_order(Order::market(USER, "X", Side::Sell, dec!(1)));
        let control = control(market, accounts);

        let assessments = control.evaluate(USER, &RiskProfile::new(USER)).await.unwrap();
        assert_eq!(assessments.len(), 1);
        assert_eq!(assessments[0].symbol.as_deref(), Some("X"));
    }

    #[tokio::test]
    async fn test_order_read_failure_propagates() {
        let control = control(StubMarketData::new(), StubAccounts::new().failing_orders());

        let err = control
            .evaluate(USER, &RiskProfile::new(USER))
            .await
            .unwrap_err();
        assert!(matches!(err, RiskError::Repository { resource: "orders", .. }));
        assert!(err.to_string().starts_with("failed to get orders"));
    }

    #[tokio::test]
    async fn test_reads_every_page() {
        let market = StubMarketData::new().with_ticker("X", dec!(3000), dec!(10));
        let mut accounts = StubAccounts::new();
        for _ in 0..5 {
            accounts = accounts.with_order(Order::market(USER, "X", Side::Buy, dec!(1)));
        }
        let (ports, _, accounts) = ports(market, accounts);
        let control = PositionSizeControl::new(ports.market_data, ports.orders).with_page_size(2);

        let assessments = control.evaluate(USER, &RiskProfile::new(USER)).await.unwrap();

        assert_eq!(assessments.len(), 5);
        // pages of 2, 2 and 1
        assert_eq!(accounts.order_pages.load(Ordering::SeqCst), 3);
    }
}
