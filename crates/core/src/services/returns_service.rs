use chrono::NaiveDate;
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::price::{CumulativeReturnSeries, PriceSeries, ReturnSeries};

/// Turns price series into simple returns and growth-of-one series.
///
/// Pure business logic with no I/O or hidden state. Identical inputs always
/// produce bit-identical outputs.
pub struct ReturnsService;

impl ReturnsService {
    pub fn new() -> Self {
        Self
    }

    /// Simple daily returns `p[t] / p[t-1] - 1`. The first date has no return.
    pub fn daily_returns(&self, prices: &PriceSeries) -> ReturnSeries {
        let points: Vec<(NaiveDate, f64)> = prices.iter().collect();
        points
            .windows(2)
            .map(|pair| {
                let (_, prev) = pair[0];
                let (date, curr) = pair[1];
                (date, curr / prev - 1.0)
            })
            .collect()
    }

    /// Running product of `1 + r` over a return series.
    pub fn cumulative_returns(&self, returns: &ReturnSeries) -> CumulativeReturnSeries {
        let mut growth = 1.0;
        returns
            .iter()
            .map(|(date, r)| {
                growth *= 1.0 + r;
                (date, growth)
            })
            .collect()
    }

    /// Growth of one unit held in a single instrument, anchored at `1.0` on
    /// its first price date.
    pub fn asset_cumulative_returns(&self, prices: &PriceSeries) -> CumulativeReturnSeries {
        let mut series = self.cumulative_returns(&self.daily_returns(prices));
        if let Some((anchor, _)) = prices.first() {
            series.insert(anchor, 1.0);
        }
        series
    }

    /// Weighted daily portfolio returns over the dates every ticker shares.
    ///
    /// `weights` are `(ticker, fraction)` pairs; a ticker listed twice
    /// counts twice.
    pub fn portfolio_daily_returns(
        &self,
        prices: &HashMap<String, PriceSeries>,
        weights: &[(String, f64)],
    ) -> Result<ReturnSeries, CoreError> {
        let (_, returns) = self.weighted_returns(prices, weights)?;
        Ok(returns)
    }

    /// Weighted cumulative portfolio growth.
    ///
    /// Dates are the inner join of all weighted tickers' price dates. The
    /// first common date is the anchor (`1.0`); each later date holds
    /// `prod(1 + sum_i(w_i * r_i))` up to and including that date.
    pub fn build_portfolio_returns(
        &self,
        prices: &HashMap<String, PriceSeries>,
        weights: &[(String, f64)],
    ) -> Result<CumulativeReturnSeries, CoreError> {
        let (anchor, returns) = self.weighted_returns(prices, weights)?;
        let mut series = self.cumulative_returns(&returns);
        series.insert(anchor, 1.0);
        Ok(series)
    }

    fn weighted_returns(
        &self,
        prices: &HashMap<String, PriceSeries>,
        weights: &[(String, f64)],
    ) -> Result<(NaiveDate, ReturnSeries), CoreError> {
        if weights.is_empty() {
            return Err(CoreError::InsufficientData(
                "no tickers to build returns from".into(),
            ));
        }
        if let Some((ticker, weight)) = weights.iter().find(|(_, w)| !w.is_finite()) {
            return Err(CoreError::Validation(format!(
                "weight for {ticker} must be finite, got {weight}"
            )));
        }

        let legs = weights
            .iter()
            .map(|(ticker, weight)| {
                prices
                    .get(ticker)
                    .map(|series| (series, *weight))
                    .ok_or_else(|| {
                        CoreError::InsufficientData(format!("no price series for {ticker}"))
                    })
            })
            .collect::<Result<Vec<(&PriceSeries, f64)>, CoreError>>()?;

        let dates = aligned_dates(legs.iter().map(|(series, _)| *series));
        let anchor = *dates.first().ok_or_else(|| {
            let tickers: Vec<&str> = weights.iter().map(|(t, _)| t.as_str()).collect();
            CoreError::InsufficientData(format!(
                "no common trading dates across {}",
                tickers.join(", ")
            ))
        })?;

        let returns = dates
            .windows(2)
            .map(|pair| {
                let (prev, curr) = (pair[0], pair[1]);
                let r: f64 = legs
                    .iter()
                    .map(|(series, weight)| weight * simple_return(series, prev, curr))
                    .sum();
                (curr, r)
            })
            .collect();

        Ok((anchor, returns))
    }
}

impl Default for ReturnsService {
    fn default() -> Self {
        Self::new()
    }
}

/// Dates present in every series, ascending.
fn aligned_dates<'a>(mut series: impl Iterator<Item = &'a PriceSeries>) -> Vec<NaiveDate> {
    let Some(first) = series.next() else {
        return Vec::new();
    };
    let rest: Vec<&PriceSeries> = series.collect();
    first
        .dates()
        .filter(|date| rest.iter().all(|s| s.contains(*date)))
        .collect()
}

// Both dates come from `aligned_dates`, so the lookups always succeed.
fn simple_return(series: &PriceSeries, prev: NaiveDate, curr: NaiveDate) -> f64 {
    match (series.get(prev), series.get(curr)) {
        (Some(p0), Some(p1)) => p1 / p0 - 1.0,
        _ => 0.0,
    }
}
