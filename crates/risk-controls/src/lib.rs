//! Risk controls for the trading backend.
//!
//! Provides the six built-in controls (position size, concentration,
//! liquidity, volatility, exposure, drawdown), the evaluator that runs them
//! for a user, and the service that persists their findings.

mod concentration;
mod control;
mod drawdown;
mod evaluator;
mod exposure;
mod liquidity;
mod position_size;
mod service;
pub mod stats;
mod volatility;

#[cfg(test)]
mod test_support;

pub use concentration::ConcentrationControl;
pub use control::{RiskControl, RiskPorts, DEFAULT_PAGE_SIZE};
pub use drawdown::DrawdownControl;
pub use evaluator::{EvaluationMode, RiskEvaluator};
pub use exposure::ExposureControl;
pub use liquidity::LiquidityControl;
pub use position_size::PositionSizeControl;
pub use service::{RiskService, ServiceSettings};
pub use volatility::VolatilityControl;
