use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::timeframe::Timeframe;

/// One daily OHLC bar as returned by a price history provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Close adjusted for splits and dividends (provider's basis).
    pub adj_close: f64,
}

/// A date-indexed series of scalar values, always iterated in date order.
///
/// Dates are the natural key. Missing trading days are simply absent,
/// never stored as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSeries {
    points: BTreeMap<NaiveDate, f64>,
}

/// Adjusted-close prices of a single ticker.
pub type PriceSeries = TimeSeries;

/// Simple (fractional) returns; the first price date has no return.
pub type ReturnSeries = TimeSeries;

/// Growth of one unit invested at the start of the series.
pub type CumulativeReturnSeries = TimeSeries;

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adjusted-close series from provider bars. Later bars win on duplicate dates.
    pub fn from_adjusted_close(bars: &[PriceBar]) -> Self {
        bars.iter().map(|b| (b.date, b.adj_close)).collect()
    }

    /// Raw close series from provider bars.
    pub fn from_close(bars: &[PriceBar]) -> Self {
        bars.iter().map(|b| (b.date, b.close)).collect()
    }

    pub fn insert(&mut self, date: NaiveDate, value: f64) -> Option<f64> {
        self.points.insert(date, value)
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points.get(&date).copied()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.points.contains_key(&date)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<(NaiveDate, f64)> {
        self.points.first_key_value().map(|(d, v)| (*d, *v))
    }

    pub fn last(&self) -> Option<(NaiveDate, f64)> {
        self.points.last_key_value().map(|(d, v)| (*d, *v))
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.keys().copied()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.values().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points.iter().map(|(d, v)| (*d, *v))
    }
}

impl FromIterator<(NaiveDate, f64)> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// Cache key: (ticker, timeframe) e.g., ("SPY", 6mo)
pub type HistoryCacheKey = (String, Timeframe);

#[derive(Debug, Clone)]
struct CachedHistory {
    fetched_on: NaiveDate,
    bars: Vec<PriceBar>,
}

/// In-memory cache of fetched price histories.
///
/// Entries are only served on the day they were fetched: a new trading day
/// brings a new bar, so yesterday's window is stale.
#[derive(Debug, Clone, Default)]
pub struct HistoryCache {
    entries: HashMap<HistoryCacheKey, CachedHistory>,
}

impl HistoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached bars for `(ticker, timeframe)` if they were fetched on `today`.
    pub fn get(&self, ticker: &str, timeframe: Timeframe, today: NaiveDate) -> Option<&[PriceBar]> {
        let key = (ticker.to_uppercase(), timeframe);
        self.entries
            .get(&key)
            .filter(|c| c.fetched_on == today)
            .map(|c| c.bars.as_slice())
    }

    /// Store bars fetched on `today`. Entries from earlier days are pruned first.
    pub fn insert(&mut self, ticker: &str, timeframe: Timeframe, today: NaiveDate, bars: Vec<PriceBar>) {
        self.prune_stale(today);
        let key = (ticker.to_uppercase(), timeframe);
        self.entries.insert(
            key,
            CachedHistory {
                fetched_on: today,
                bars,
            },
        );
    }

    /// Remove entries fetched before `today`. Returns the number removed.
    pub fn prune_stale(&mut self, today: NaiveDate) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, cached| cached.fetched_on >= today);
        before - self.entries.len()
    }

    /// Drop every cached timeframe of one ticker. Returns the number of entries removed.
    pub fn invalidate(&mut self, ticker: &str) -> usize {
        let upper = ticker.to_uppercase();
        let before = self.entries.len();
        self.entries.retain(|(t, _), _| *t != upper);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
