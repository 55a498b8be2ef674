use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Absolute tolerance on the 100% weight-sum check at save time.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// One persisted allocation: `weight` is a percentage (0-100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub ticker: String,
    pub weight: f64,
    pub as_of: NaiveDate,
}

impl AllocationEntry {
    pub fn new(ticker: impl Into<String>, weight: f64, as_of: NaiveDate) -> Self {
        Self {
            ticker: ticker.into(),
            weight,
            as_of,
        }
    }
}

/// The canonical allocation snapshot: an ordered list of entries for one date.
///
/// Tickers are expected to be unique but this is not enforced. A ticker
/// listed twice contributes both of its weights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub entries: Vec<AllocationEntry>,
}

impl Portfolio {
    pub fn new(entries: Vec<AllocationEntry>) -> Self {
        Self { entries }
    }

    /// Seed allocation used when nothing has been persisted yet.
    pub fn seed() -> Self {
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
        Self::new(vec![
            AllocationEntry::new("AAPL", 40.0, as_of),
            AllocationEntry::new("MSFT", 35.0, as_of),
            AllocationEntry::new("GOOG", 25.0, as_of),
        ])
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Sum of all percentage weights.
    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(|e| e.weight).sum()
    }

    /// Tickers in allocation order (duplicates preserved).
    pub fn tickers(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.ticker.clone()).collect()
    }

    /// `(ticker, fraction)` pairs: percentages divided by 100.
    pub fn weight_fractions(&self) -> Vec<(String, f64)> {
        self.entries
            .iter()
            .map(|e| (e.ticker.clone(), e.weight / 100.0))
            .collect()
    }

    /// Date the snapshot was taken, if it has any entries.
    pub fn as_of(&self) -> Option<NaiveDate> {
        self.entries.first().map(|e| e.as_of)
    }
}
