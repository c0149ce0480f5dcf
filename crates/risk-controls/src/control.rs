//! The shared control contract and the ports controls read from.

use async_trait::async_trait;
use num_traits::ToPrimitive;
use risk_core::{
    MarketDataService, Order, OrderRepository, Position, PositionRepository, RiskAssessment,
    RiskError, RiskProfile, RiskResult, RiskType, WalletRepository,
};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Page size used when walking paged repository reads.
pub const DEFAULT_PAGE_SIZE: usize = 500;

/// A single, stateless risk check.
///
/// Controls only read through their injected ports. A failure to read the
/// user's own orders, positions or wallet is returned as an error; a missing
/// ticker or candle series for one instrument only skips that instrument.
#[async_trait]
pub trait RiskControl: Send + Sync {
    /// Run the check for one user against their profile.
    async fn evaluate(&self, user_id: &str, profile: &RiskProfile)
        -> RiskResult<Vec<RiskAssessment>>;

    /// Category of risk this control reports.
    fn risk_type(&self) -> RiskType;

    /// Human-readable control name.
    fn name(&self) -> &str;
}

/// Read ports shared by the built-in controls.
#[derive(Clone)]
pub struct RiskPorts {
    pub market_data: Arc<dyn MarketDataService>,
    pub positions: Arc<dyn PositionRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub wallets: Arc<dyn WalletRepository>,
}

impl RiskPorts {
    pub fn new(
        market_data: Arc<dyn MarketDataService>,
        positions: Arc<dyn PositionRepository>,
        orders: Arc<dyn OrderRepository>,
        wallets: Arc<dyn WalletRepository>,
    ) -> Self {
        Self {
            market_data,
            positions,
            orders,
            wallets,
        }
    }

    /// Same account ports, different market data source.
    pub fn with_market_data(&self, market_data: Arc<dyn MarketDataService>) -> Self {
        Self {
            market_data,
            ..self.clone()
        }
    }
}

/// Read every order of a user, page by page, until a short page comes back.
pub(crate) async fn fetch_all_orders(
    orders: &dyn OrderRepository,
    user_id: &str,
    page_size: usize,
) -> RiskResult<Vec<Order>> {
    let page_size = page_size.max(1);
    let mut all = Vec::new();
    let mut offset = 0;

    loop {
        let page = orders
            .get_by_user_id(user_id, page_size, offset)
            .await
            .map_err(|e| RiskError::repository("orders", e))?;
        let len = page.len();
        all.extend(page);
        if len < page_size {
            break;
        }
        offset += len;
    }

    Ok(all)
}

/// Read every position of a user regardless of status, page by page.
pub(crate) async fn fetch_all_positions(
    positions: &dyn PositionRepository,
    user_id: &str,
    page_size: usize,
) -> RiskResult<Vec<Position>> {
    let page_size = page_size.max(1);
    let mut all = Vec::new();
    let mut offset = 0;

    loop {
        let page = positions
            .get_by_user_id(user_id, page_size, offset)
            .await
            .map_err(|e| RiskError::repository("positions", e))?;
        let len = page.len();
        all.extend(page);
        if len < page_size {
            break;
        }
        offset += len;
    }

    Ok(all)
}

/// Lossy conversion for display and float comparisons.
pub(crate) fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}
