//! Core types and traits for the risk control engine.
//!
//! This crate provides the foundational building blocks including:
//! - Risk profile and risk assessment types
//! - Market data, order, position and wallet read models
//! - Port traits for market data, account reads and assessment persistence

pub mod types;
pub mod traits;
pub mod error;

pub use error::{MarketDataError, RepositoryError, RiskError, RiskResult};
pub use types::*;
pub use traits::*;
