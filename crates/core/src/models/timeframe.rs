use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Bar interval requested from price history providers. Only daily bars are used.
pub const DAILY_INTERVAL: &str = "1d";

/// Lookback window for price history requests.
///
/// Serialized as the provider-facing range string (`"1mo"`, `"6mo"`, ...),
/// which is also what the dashboard dropdown sends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[default]
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
}

impl Timeframe {
    /// All timeframes, shortest first.
    pub const ALL: [Timeframe; 5] = [
        Timeframe::OneMonth,
        Timeframe::ThreeMonths,
        Timeframe::SixMonths,
        Timeframe::OneYear,
        Timeframe::TwoYears,
    ];

    /// Range string understood by Yahoo Finance.
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneMonth => "1mo",
            Timeframe::ThreeMonths => "3mo",
            Timeframe::SixMonths => "6mo",
            Timeframe::OneYear => "1y",
            Timeframe::TwoYears => "2y",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::OneMonth => "1 Month",
            Timeframe::ThreeMonths => "3 Months",
            Timeframe::SixMonths => "6 Months",
            Timeframe::OneYear => "1 Year",
            Timeframe::TwoYears => "2 Years",
        }
    }

    pub fn months(&self) -> u32 {
        match self {
            Timeframe::OneMonth => 1,
            Timeframe::ThreeMonths => 3,
            Timeframe::SixMonths => 6,
            Timeframe::OneYear => 12,
            Timeframe::TwoYears => 24,
        }
    }

    /// First calendar date covered by this timeframe when looking back from `today`.
    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_months(Months::new(self.months()))
            .unwrap_or(NaiveDate::MIN)
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Timeframe {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Timeframe::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unsupported timeframe '{s}': expected one of 1mo, 3mo, 6mo, 1y, 2y"
                ))
            })
    }
}
