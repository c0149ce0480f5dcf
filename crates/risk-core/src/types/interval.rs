//! Candle interval definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kline/candle interval as exchanges name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Interval {
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "1d")]
    #[default]
    Day1,
    #[serde(rename = "1w")]
    Week1,
    #[serde(rename = "1M")]
    Month1,
}

impl Interval {
    /// Exchange wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Minute1 => "1m",
            Interval::Minute15 => "15m",
            Interval::Hour1 => "1h",
            Interval::Hour4 => "4h",
            Interval::Day1 => "1d",
            Interval::Week1 => "1w",
            Interval::Month1 => "1M",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "1M" (month) and "1m" (minute) only differ by case
        if s == "1M" {
            return Ok(Interval::Month1);
        }
        match s.to_lowercase().as_str() {
            "1m" | "1min" => Ok(Interval::Minute1),
            "15m" | "15min" => Ok(Interval::Minute15),
            "1h" | "60m" => Ok(Interval::Hour1),
            "4h" => Ok(Interval::Hour4),
            "1d" | "day" | "daily" => Ok(Interval::Day1),
            "1w" | "week" | "weekly" => Ok(Interval::Week1),
            "month" | "monthly" => Ok(Interval::Month1),
            _ => Err(format!("Invalid interval: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_parse() {
        assert_eq!(Interval::from_str("1d").unwrap(), Interval::Day1);
        assert_eq!(Interval::from_str("daily").unwrap(), Interval::Day1);
        assert_eq!(Interval::from_str("1m").unwrap(), Interval::Minute1);
        assert_eq!(Interval::from_str("1M").unwrap(), Interval::Month1);
        assert!(Interval::from_str("7x").is_err());
    }

    #[test]
    fn test_interval_display_round_trips_wire_name() {
        for interval in [Interval::Minute1, Interval::Day1, Interval::Month1] {
            assert_eq!(Interval::from_str(&interval.to_string()).unwrap(), interval);
        }
    }
}
