//! Ports the risk engine reads from and writes to.

mod market_data;
mod repository;

pub use market_data::MarketDataService;
pub use repository::{
    OrderRepository, PositionRepository, RiskAssessmentRepository, RiskProfileRepository,
    WalletRepository,
};
