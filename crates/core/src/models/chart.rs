use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::price::PriceBar;

/// Rolling indicator values by date. `None` until the window is full.
pub type IndicatorSeries = BTreeMap<NaiveDate, Option<f64>>;

/// A moving-average overlay for the price-action chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageLine {
    /// Window length in trading days (9, 50, 200)
    pub window: usize,

    pub values: IndicatorSeries,
}

/// Candlestick data plus moving-average overlays for one ticker.
///
/// The core computes the numbers; the frontend only renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAction {
    /// Uppercased ticker symbol
    pub ticker: String,

    /// Daily OHLC bars, oldest first
    pub bars: Vec<PriceBar>,

    /// One line per standard window, shortest first
    pub moving_averages: Vec<MovingAverageLine>,
}

impl PriceAction {
    /// Moving-average line for a given window, if it was computed.
    pub fn moving_average(&self, window: usize) -> Option<&MovingAverageLine> {
        self.moving_averages.iter().find(|m| m.window == window)
    }
}
