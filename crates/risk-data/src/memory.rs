//! In-memory port implementations.

use async_trait::async_trait;
use risk_core::{
    Candle, Interval, MarketDataError, MarketDataService, Order, OrderRepository, Position,
    PositionRepository, RepositoryError, RiskAssessment, RiskAssessmentRepository, RiskProfile,
    RiskProfileRepository, SymbolInfo, Ticker, Wallet, WalletRepository,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::snapshot::AccountSnapshot;

/// Market data held in memory.
///
/// Candles are stored per symbol regardless of interval.
#[derive(Default)]
pub struct InMemoryMarketData {
    tickers: RwLock<HashMap<String, Ticker>>,
    symbols: RwLock<Vec<SymbolInfo>>,
    candles: RwLock<HashMap<String, Vec<Candle>>>,
}

impl InMemoryMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: &AccountSnapshot) -> Self {
        let tickers = snapshot
            .tickers
            .iter()
            .map(|t| (t.symbol.clone(), t.clone()))
            .collect();
        let candles = snapshot
            .candles
            .iter()
            .map(|(symbol, candles)| {
                let mut candles = candles.clone();
                candles.sort_by_key(|c| c.open_time);
                (symbol.clone(), candles)
            })
            .collect();

        Self {
            tickers: RwLock::new(tickers),
            symbols: RwLock::new(snapshot.symbols.clone()),
            candles: RwLock::new(candles),
        }
    }

    pub async fn upsert_ticker(&self, ticker: Ticker) {
        self.tickers
            .write()
            .await
            .insert(ticker.symbol.clone(), ticker);
    }

    pub async fn add_symbol(&self, info: SymbolInfo) {
        self.symbols.write().await.push(info);
    }

    /// Replace the candles of a symbol.
    pub async fn set_candles(&self, symbol: &str, mut candles: Vec<Candle>) {
        candles.sort_by_key(|c| c.open_time);
        self.candles.write().await.insert(symbol.to_string(), candles);
    }
}

#[async_trait]
impl MarketDataService for InMemoryMarketData {
    async fn get_ticker(&self, symbol: &str) -> Result<Ticker, MarketDataError> {
        self.tickers
            .read()
            .await
            .get(symbol)
            .cloned()
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))
    }

    async fn get_all_symbols(&self) -> Result<Vec<SymbolInfo>, MarketDataError> {
        Ok(self.symbols.read().await.clone())
    }

    async fn get_candles(
        &self,
        symbol: &str,
        _interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let candles = self.candles.read().await;
        let series = candles
            .get(symbol)
            .ok_or_else(|| MarketDataError::NoDataAvailable(symbol.to_string()))?;
        let start = series.len().saturating_sub(limit);
        Ok(series[start..].to_vec())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

/// Account data and risk records held in memory.
#[derive(Default)]
pub struct InMemoryAccounts {
    positions: RwLock<Vec<Position>>,
    orders: RwLock<Vec<Order>>,
    wallets: RwLock<HashMap<String, Wallet>>,
    assessments: RwLock<Vec<RiskAssessment>>,
    profiles: RwLock<HashMap<String, RiskProfile>>,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: &AccountSnapshot) -> Self {
        Self {
            positions: RwLock::new(snapshot.positions.clone()),
            orders: RwLock::new(snapshot.orders.clone()),
            wallets: RwLock::new(
                snapshot
                    .wallets
                    .iter()
                    .map(|w| (w.user_id.clone(), w.clone()))
                    .collect(),
            ),
            assessments: RwLock::new(Vec::new()),
            profiles: RwLock::new(
                snapshot
                    .profiles
                    .iter()
                    .map(|p| (p.user_id.clone(), p.clone()))
                    .collect(),
            ),
        }
    }

    pub async fn add_position(&self, position: Position) {
        self.positions.write().await.push(position);
    }

    pub async fn add_order(&self, order: Order) {
        self.orders.write().await.push(order);
    }

    pub async fn set_wallet(&self, wallet: Wallet) {
        self.wallets
            .write()
            .await
            .insert(wallet.user_id.clone(), wallet);
    }

    /// Every stored assessment, in insertion order.
    pub async fn assessments(&self) -> Vec<RiskAssessment> {
        self.assessments.read().await.clone()
    }
}

fn page<T>(items: impl Iterator<Item = T>, limit: usize, offset: usize) -> Vec<T> {
    items.skip(offset).take(limit).collect()
}

#[async_trait]
impl PositionRepository for InMemoryAccounts {
    async fn get_active_by_user(&self, user_id: &str) -> Result<Vec<Position>, RepositoryError> {
        Ok(self
            .positions
            .read()
            .await
            .iter()
            .filter(|p| p.user_id == user_id && p.is_open())
            .cloned()
            .collect())
    }

    async fn get_by_user_id(
        &self,
        user_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Position>, RepositoryError> {
        let positions = self.positions.read().await;
        Ok(page(
            positions.iter().filter(|p| p.user_id == user_id).cloned(),
            limit,
            offset,
        ))
    }
}

#[async_trait]
impl OrderRepository for InMemoryAccounts {
    async fn get_by_user_id(
        &self,
        user_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(page(
            orders.iter().filter(|o| o.user_id == user_id).cloned(),
            limit,
            offset,
        ))
    }
}

#[async_trait]
impl WalletRepository for InMemoryAccounts {
    async fn get_by_user_id(&self, user_id: &str) -> Result<Option<Wallet>, RepositoryError> {
        Ok(self.wallets.read().await.get(user_id).cloned())
    }
}

fn upsert_assessment(assessments: &mut Vec<RiskAssessment>, assessment: &RiskAssessment) {
    match assessments.iter_mut().find(|a| a.id == assessment.id) {
        Some(existing) => *existing = assessment.clone(),
        None => assessments.push(assessment.clone()),
    }
}

#[async_trait]
impl RiskAssessmentRepository for InMemoryAccounts {
    async fn save(&self, assessment: &RiskAssessment) -> Result<(), RepositoryError> {
        upsert_assessment(&mut *self.assessments.write().await, assessment);
        Ok(())
    }

    async fn save_all(&self, batch: &[RiskAssessment]) -> Result<(), RepositoryError> {
        let mut assessments = self.assessments.write().await;
        for assessment in batch {
            upsert_assessment(&mut assessments, assessment);
        }
        Ok(())
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<RiskAssessment>, RepositoryError> {
        Ok(self
            .assessments
            .read()
            .await
            .iter()
            .find(|a| &a.id == id)
            .cloned())
    }

    async fn get_active_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<RiskAssessment>, RepositoryError> {
        let mut active: Vec<RiskAssessment> = self
            .assessments
            .read()
            .await
            .iter()
            .filter(|a| a.user_id == user_id && a.is_active())
            .cloned()
            .collect();
        active.sort_by_key(|a| a.created_at);
        Ok(active)
    }
}

#[async_trait]
impl RiskProfileRepository for InMemoryAccounts {
    async fn get_by_user_id(&self, user_id: &str) -> Result<Option<RiskProfile>, RepositoryError> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn save(&self, profile: &RiskProfile) -> Result<(), RepositoryError> {
        self.profiles
            .write()
            .await
            .insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_core::{PositionStatus, RiskLevel, RiskType, Side, SymbolStatus};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_market_data_lookups() {
        let market = InMemoryMarketData::new();
        market
            .upsert_ticker(Ticker::new("BTCUSDT", dec!(42000), dec!(10)))
            .await;
        market
            .add_symbol(SymbolInfo::new("BTCUSDT", SymbolStatus::Trading))
            .await;
        market
            .set_candles(
                "BTCUSDT",
                (0..20).rev().map(|i| Candle::flat(i, i as f64)).collect(),
            )
            .await;

        assert_eq!(market.get_ticker("BTCUSDT").await.unwrap().price, dec!(42000));
        assert!(matches!(
            market.get_ticker("DOGEUSDT").await,
            Err(MarketDataError::SymbolNotFound(_))
        ));
        assert_eq!(market.get_all_symbols().await.unwrap().len(), 1);

        let candles = market
            .get_candles("BTCUSDT", Interval::Day1, 14)
            .await
            .unwrap();
        assert_eq!(candles.len(), 14);
        assert_eq!(candles[0].open_time, 6);
        assert_eq!(candles[13].open_time, 19);
        assert!(market.get_candles("ETHUSDT", Interval::Day1, 14).await.is_err());
    }

    #[tokio::test]
    async fn test_positions_active_and_paged() {
        let accounts = InMemoryAccounts::new();
        for i in 0..5 {
            let mut position = Position::new("u1", format!("S{}", i), dec!(1), dec!(10));
            if i % 2 == 0 {
                position = position.with_status(PositionStatus::Closed);
            }
            accounts.add_position(position).await;
        }
        accounts
            .add_position(Position::new("u2", "S9", dec!(1), dec!(10)))
            .await;

        assert_eq!(
            PositionRepository::get_active_by_user(&accounts, "u1")
                .await
                .unwrap()
                .len(),
            2
        );

        let first = PositionRepository::get_by_user_id(&accounts, "u1", 3, 0)
            .await
            .unwrap();
        let second = PositionRepository::get_by_user_id(&accounts, "u1", 3, 3)
            .await
            .unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 2);
        assert_eq!(second[1].symbol, "S4");
    }

    #[tokio::test]
    async fn test_orders_and_wallets_by_user() {
        let accounts = InMemoryAccounts::new();
        accounts
            .add_order(Order::market("u1", "BTCUSDT", Side::Buy, dec!(1)))
            .await;
        accounts.set_wallet(Wallet::new("u1")).await;

        let orders = OrderRepository::get_by_user_id(&accounts, "u1", 10, 0)
            .await
            .unwrap();
        assert_eq!(orders.len(), 1);
        assert!(WalletRepository::get_by_user_id(&accounts, "u1")
            .await
            .unwrap()
            .is_some());
        assert!(WalletRepository::get_by_user_id(&accounts, "u2")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_assessment_save_replaces_by_id() {
        let accounts = InMemoryAccounts::new();
        let mut assessment =
            RiskAssessment::new("u1", RiskType::Liquidity, RiskLevel::Medium, "thin");
        RiskAssessmentRepository::save(&accounts, &assessment)
            .await
            .unwrap();

        assessment.resolve();
        RiskAssessmentRepository::save(&accounts, &assessment)
            .await
            .unwrap();

        assert_eq!(accounts.assessments().await.len(), 1);
        assert!(RiskAssessmentRepository::get_active_by_user(&accounts, "u1")
            .await
            .unwrap()
            .is_empty());
        let stored = accounts.get_by_id(&assessment.id).await.unwrap().unwrap();
        assert!(stored.resolved_at.is_some());
    }

    #[tokio::test]
    async fn test_save_all_stores_batch() {
        let accounts = InMemoryAccounts::new();
        let first = RiskAssessment::new("u1", RiskType::Exposure, RiskLevel::High, "big");
        let second = RiskAssessment::new("u1", RiskType::Drawdown, RiskLevel::Medium, "down");
        RiskAssessmentRepository::save(&accounts, &first)
            .await
            .unwrap();

        accounts
            .save_all(&[first.clone(), second.clone()])
            .await
            .unwrap();

        let stored = accounts.assessments().await;
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].id, first.id);
        assert_eq!(stored[1].id, second.id);
    }

    #[tokio::test]
    async fn test_profiles() {
        let accounts = InMemoryAccounts::new();
        assert!(RiskProfileRepository::get_by_user_id(&accounts, "u1")
            .await
            .unwrap()
            .is_none());

        RiskProfileRepository::save(&accounts, &RiskProfile::new("u1"))
            .await
            .unwrap();
        assert!(RiskProfileRepository::get_by_user_id(&accounts, "u1")
            .await
            .unwrap()
            .is_some());
    }
}
