//! Stub ports for control tests, with failure injection.

use async_trait::async_trait;
use risk_core::{
    Candle, Interval, MarketDataError, MarketDataService, Order, OrderRepository, Position,
    PositionRepository, RepositoryError, RiskAssessment, RiskAssessmentRepository, RiskProfile,
    RiskProfileRepository, SymbolInfo, SymbolStatus, Ticker, Wallet, WalletRepository,
};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::control::RiskPorts;

pub const USER: &str = "user-1";

#[derive(Default)]
pub struct StubMarketData {
    tickers: HashMap<String, Ticker>,
    symbols: Vec<SymbolInfo>,
    candles: HashMap<String, Vec<Candle>>,
    failing: HashSet<String>,
    fail_symbol_list: bool,
    pub ticker_calls: AtomicUsize,
}

impl StubMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ticker(mut self, symbol: &str, price: Decimal, volume: Decimal) -> Self {
        self.tickers
            .insert(symbol.to_string(), Ticker::new(symbol, price, volume));
        self
    }

    /// Set the 24h price change of an existing ticker.
    pub fn with_price_change(mut self, symbol: &str, pct: f64) -> Self {
        if let Some(ticker) = self.tickers.get_mut(symbol) {
            ticker.price_change_pct = pct;
        }
        self
    }

    pub fn with_symbol(mut self, symbol: &str, status: SymbolStatus) -> Self {
        self.symbols.push(SymbolInfo::new(symbol, status));
        self
    }

    pub fn with_closes(mut self, symbol: &str, closes: &[f64]) -> Self {
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, close)| Candle::flat(i as i64 * 86_400_000, *close))
            .collect();
        self.candles.insert(symbol.to_string(), candles);
        self
    }

    /// Every lookup for `symbol` fails.
    pub fn failing(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }

    pub fn failing_symbol_list(mut self) -> Self {
        self.fail_symbol_list = true;
        self
    }
}

#[async_trait]
impl MarketDataService for StubMarketData {
    async fn get_ticker(&self, symbol: &str) -> Result<Ticker, MarketDataError> {
        self.ticker_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(symbol) {
            return Err(MarketDataError::Connection(format!("{} unavailable", symbol)));
        }
        self.tickers
            .get(symbol)
            .cloned()
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))
    }

    async fn get_all_symbols(&self) -> Result<Vec<SymbolInfo>, MarketDataError> {
        if self.fail_symbol_list {
            return Err(MarketDataError::Connection("exchange down".to_string()));
        }
        Ok(self.symbols.clone())
    }

    async fn get_candles(
        &self,
        symbol: &str,
        _interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        if self.failing.contains(symbol) {
            return Err(MarketDataError::Connection(format!("{} unavailable", symbol)));
        }
        let candles = self
            .candles
            .get(symbol)
            .ok_or_else(|| MarketDataError::NoDataAvailable(symbol.to_string()))?;
        let start = candles.len().saturating_sub(limit);
        Ok(candles[start..].to_vec())
    }
}

#[derive(Default)]
pub struct StubAccounts {
    positions: Vec<Position>,
    orders: Vec<Order>,
    wallet: Option<Wallet>,
    fail_positions: bool,
    fail_orders: bool,
    fail_wallet: bool,
    fail_assessment_writes: bool,
    pub order_pages: AtomicUsize,
    pub assessment_writes: AtomicUsize,
    pub assessments: Mutex<Vec<RiskAssessment>>,
    pub profiles: Mutex<HashMap<String, RiskProfile>>,
}

impl StubAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.positions.push(position);
        self
    }

    pub fn with_order(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }

    pub fn with_wallet(mut self, wallet: Wallet) -> Self {
        self.wallet = Some(wallet);
        self
    }

    pub fn failing_positions(mut self) -> Self {
        self.fail_positions = true;
        self
    }

    pub fn failing_orders(mut self) -> Self {
        self.fail_orders = true;
        self
    }

    pub fn failing_wallet(mut self) -> Self {
        self.fail_wallet = true;
        self
    }

    pub fn failing_assessment_writes(mut self) -> Self {
        self.fail_assessment_writes = true;
        self
    }

    fn write_assessments(&self, batch: &[RiskAssessment]) -> Result<(), RepositoryError> {
        self.assessment_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_assessment_writes {
            return Err(RepositoryError::Connection("assessments db down".to_string()));
        }
        let mut saved = self.assessments.lock().unwrap();
        for assessment in batch {
            match saved.iter_mut().find(|a| a.id == assessment.id) {
                Some(existing) => *existing = assessment.clone(),
                None => saved.push(assessment.clone()),
            }
        }
        Ok(())
    }

    fn page<T: Clone>(items: &[T], limit: usize, offset: usize) -> Vec<T> {
        items.iter().skip(offset).take(limit).cloned().collect()
    }
}

#[async_trait]
impl PositionRepository for StubAccounts {
    async fn get_active_by_user(&self, user_id: &str) -> Result<Vec<Position>, RepositoryError> {
        if self.fail_positions {
            return Err(RepositoryError::Connection("positions db down".to_string()));
        }
        Ok(self
            .positions
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
        if self.fail_positions {
            return Err(RepositoryError::Connection("positions db down".to_string()));
        }
        let mine: Vec<Position> = self
            .positions
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        Ok(Self::page(&mine, limit, offset))
    }
}

#[async_trait]
impl OrderRepository for StubAccounts {
    async fn get_by_user_id(
        &self,
        user_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Order>, RepositoryError> {
        self.order_pages.fetch_add(1, Ordering::SeqCst);
        if self.fail_orders {
            return Err(RepositoryError::Connection("orders db down".to_string()));
        }
        let mine: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        Ok(Self::page(&mine, limit, offset))
    }
}

#[async_trait]
impl WalletRepository for StubAccounts {
    async fn get_by_user_id(&self, user_id: &str) -> Result<Option<Wallet>, RepositoryError> {
        if self.fail_wallet {
            return Err(RepositoryError::Connection("wallet db down".to_string()));
        }
        Ok(self.wallet.clone().filter(|w| w.user_id == user_id))
    }
}

#[async_trait]
impl RiskAssessmentRepository for StubAccounts {
    async fn save(&self, assessment: &RiskAssessment) -> Result<(), RepositoryError> {
        self.write_assessments(std::slice::from_ref(assessment))
    }

    async fn save_all(&self, batch: &[RiskAssessment]) -> Result<(), RepositoryError> {
        self.write_assessments(batch)
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<RiskAssessment>, RepositoryError> {
        let saved = self.assessments.lock().unwrap();
        Ok(saved.iter().find(|a| &a.id == id).cloned())
    }

    async fn get_active_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<RiskAssessment>, RepositoryError> {
        let saved = self.assessments.lock().unwrap();
        Ok(saved
            .iter()
            .filter(|a| a.user_id == user_id && a.is_active())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RiskProfileRepository for StubAccounts {
    async fn get_by_user_id(&self, user_id: &str) -> Result<Option<RiskProfile>, RepositoryError> {
        Ok(self.profiles.lock().unwrap().get(user_id).cloned())
    }

    async fn save(&self, profile: &RiskProfile) -> Result<(), RepositoryError> {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }
}

/// Wire both stubs into a port bundle, keeping handles for inspection.
pub fn ports(
    market: StubMarketData,
    accounts: StubAccounts,
) -> (RiskPorts, Arc<StubMarketData>, Arc<StubAccounts>) {
    let market = Arc::new(market);
    let accounts = Arc::new(accounts);
    let ports = RiskPorts::new(
        market.clone(),
        accounts.clone(),
        accounts.clone(),
        accounts.clone(),
    );
    (ports, market, accounts)
}
