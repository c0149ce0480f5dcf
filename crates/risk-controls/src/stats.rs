//! Return and volatility statistics over candle closes.

use risk_core::Candle;
use statrs::statistics::Statistics;

/// Simple returns `(close[i] - close[i-1]) / close[i-1]`.
///
/// A step whose previous close is zero yields no return.
pub fn simple_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Population standard deviation. Zero for an empty slice.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().population_std_dev()
}

/// Volatility of close-to-close returns, in percent.
///
/// Returns `None` when the candles produce no returns.
pub fn volatility_pct(candles: &[Candle]) -> Option<f64> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let returns = simple_returns(&closes);
    if returns.is_empty() {
        return None;
    }
    Some(population_std_dev(&returns) * 100.0)
}
