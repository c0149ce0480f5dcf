//! Core data types for the risk engine.

mod interval;
mod market;
mod order;
mod position;
mod risk;
mod wallet;

pub use interval::Interval;
pub use market::{Candle, SymbolInfo, SymbolStatus, Ticker};
pub use order::{Order, OrderRequest, OrderStatus, OrderType, Side};
pub use position::{Position, PositionSide, PositionStatus};
pub use risk::{RiskAssessment, RiskLevel, RiskMetrics, RiskProfile, RiskStatus, RiskType};
pub use wallet::{Asset, Balance, Wallet};
