//! Market data port.

use crate::error::MarketDataError;
use crate::types::{Candle, Interval, SymbolInfo, Ticker};
use async_trait::async_trait;

/// Read-only access to exchange market data.
///
/// Implementations are shared between controls as `Arc<dyn MarketDataService>`.
#[async_trait]
pub trait MarketDataService: Send + Sync {
    /// Latest ticker for a symbol.
    async fn get_ticker(&self, symbol: &str) -> Result<Ticker, MarketDataError>;

    /// Every symbol listed on the exchange, in exchange order.
    async fn get_all_symbols(&self) -> Result<Vec<SymbolInfo>, MarketDataError>;

    /// The most recent `limit` candles for a symbol, oldest first.
    async fn get_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError>;

    /// Name of the data source.
    fn name(&self) -> &str {
        "market-data"
    }
}
