//! Data adapters for the risk engine.
//!
//! In-memory implementations of every port, loaders for JSON account
//! snapshots and candle CSV files, and a per-evaluation market data cache.

mod cache;
mod csv_source;
mod error;
mod memory;
mod snapshot;

pub use cache::SnapshotMarketData;
pub use csv_source::{load_candle_dir, load_candles};
pub use error::DataError;
pub use memory::{InMemoryAccounts, InMemoryMarketData};
pub use snapshot::AccountSnapshot;

use std::path::Path;
use std::sync::Arc;

/// Load a JSON account snapshot, merge candle CSV files from `candle_dir`
/// if given, and build the in-memory ports.
pub fn load_snapshot(
    snapshot_path: &Path,
    candle_dir: Option<&Path>,
) -> Result<(Arc<InMemoryMarketData>, Arc<InMemoryAccounts>), DataError> {
    let mut snapshot = AccountSnapshot::load(snapshot_path)?;
    if let Some(dir) = candle_dir {
        snapshot.candles.extend(load_candle_dir(dir)?);
    }

    Ok((
        Arc::new(InMemoryMarketData::from_snapshot(&snapshot)),
        Arc::new(InMemoryAccounts::from_snapshot(&snapshot)),
    ))
}
