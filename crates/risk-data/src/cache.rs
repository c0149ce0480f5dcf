//! Per-evaluation market data cache.

use async_trait::async_trait;
use risk_core::{Candle, Interval, MarketDataError, MarketDataService, SymbolInfo, Ticker};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Memoizes market data lookups for the lifetime of one evaluation, so every
/// control sees the same tickers and candles.
///
/// Build a fresh one per evaluation. Failed lookups are not cached.
/// Concurrent misses for the same key may both reach the inner source.
pub struct SnapshotMarketData {
    inner: Arc<dyn MarketDataService>,
    tickers: Mutex<HashMap<String, Ticker>>,
    symbols: Mutex<Option<Vec<SymbolInfo>>>,
    candles: Mutex<HashMap<(String, Interval, usize), Vec<Candle>>>,
}

impl SnapshotMarketData {
    pub fn new(inner: Arc<dyn MarketDataService>) -> Self {
        Self {
            inner,
            tickers: Mutex::new(HashMap::new()),
            symbols: Mutex::new(None),
            candles: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl MarketDataService for SnapshotMarketData {
    async fn get_ticker(&self, symbol: &str) -> Result<Ticker, MarketDataError> {
        if let Some(ticker) = self.tickers.lock().await.get(symbol) {
            return Ok(ticker.clone());
        }
        let ticker = self.inner.get_ticker(symbol).await?;
        self.tickers
            .lock()
            .await
            .insert(symbol.to_string(), ticker.clone());
        Ok(ticker)
    }

    async fn get_all_symbols(&self) -> Result<Vec<SymbolInfo>, MarketDataError> {
        if let Some(symbols) = self.symbols.lock().await.as_ref() {
            return Ok(symbols.clone());
        }
        let symbols = self.inner.get_all_symbols().await?;
        *self.symbols.lock().await = Some(symbols.clone());
        Ok(symbols)
    }

    async fn get_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let key = (symbol.to_string(), interval, limit);
        if let Some(candles) = self.candles.lock().await.get(&key) {
            return Ok(candles.clone());
        }
        let candles = self.inner.get_candles(symbol, interval, limit).await?;
        self.candles.lock().await.insert(key, candles.clone());
        Ok(candles)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
