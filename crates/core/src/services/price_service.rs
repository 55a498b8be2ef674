use chrono::NaiveDate;
use futures::future::join_all;
use std::collections::{BTreeSet, HashMap};

use crate::errors::CoreError;
use crate::models::price::{HistoryCache, PriceBar, PriceSeries};
use crate::models::timeframe::Timeframe;
use crate::providers::registry::PriceProviderRegistry;

/// Fetches daily price histories from the registered providers.
///
/// - Tickers are fetched concurrently; there is no ordering dependency
///   between them.
/// - Providers are tried in registration order; the first valid answer wins.
/// - With caching enabled, a `(ticker, timeframe)` history fetched today is
///   reused instead of hitting the network again. Without it every call
///   re-fetches the full window.
pub struct PriceService {
    registry: PriceProviderRegistry,
    caching: bool,
}

impl PriceService {
    pub fn new(registry: PriceProviderRegistry) -> Self {
        Self {
            registry,
            caching: true,
        }
    }

    pub fn with_caching(mut self, caching: bool) -> Self {
        self.caching = caching;
        self
    }

    pub fn is_caching(&self) -> bool {
        self.caching
    }

    /// Check if at least one provider is registered.
    pub fn has_providers(&self) -> bool {
        !self.registry.is_empty()
    }

    /// Names of the registered providers in fallback order.
    pub fn get_provider_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Daily bars for a single ticker.
    pub async fn get_history(
        &self,
        cache: &mut HistoryCache,
        ticker: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<PriceBar>, CoreError> {
        let today = chrono::Utc::now().date_naive();
        if let Some(bars) = self.cached(cache, ticker, timeframe, today) {
            return Ok(bars.to_vec());
        }

        let bars = self.fetch_from_providers(ticker, timeframe).await?;
        if self.caching {
            cache.insert(ticker, timeframe, today, bars.clone());
        }
        Ok(bars)
    }

    /// Adjusted-close series for every requested ticker.
    ///
    /// Fails with the first error encountered if any ticker cannot be fetched:
    /// partial results are never returned.
    pub async fn get_price_series(
        &self,
        cache: &mut HistoryCache,
        tickers: &[String],
        timeframe: Timeframe,
    ) -> Result<HashMap<String, PriceSeries>, CoreError> {
        let today = chrono::Utc::now().date_naive();
        let unique: BTreeSet<&String> = tickers.iter().collect();

        let mut series = HashMap::with_capacity(unique.len());
        let mut missing: Vec<&String> = Vec::new();

        for ticker in unique {
            match self.cached(cache, ticker, timeframe, today) {
                Some(bars) => {
                    series.insert(ticker.clone(), PriceSeries::from_adjusted_close(bars));
                }
                None => missing.push(ticker),
            }
        }

        if !missing.is_empty() {
            tracing::debug!(count = missing.len(), %timeframe, "fetching price histories");
        }

        let outcomes = join_all(
            missing
                .iter()
                .map(|ticker| self.fetch_from_providers(ticker, timeframe)),
        )
        .await;

        let mut first_error = None;
        for (ticker, outcome) in missing.into_iter().zip(outcomes) {
            match outcome {
                Ok(bars) => {
                    series.insert(ticker.clone(), PriceSeries::from_adjusted_close(&bars));
                    if self.caching {
                        cache.insert(ticker, timeframe, today, bars);
                    }
                }
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(series),
        }
    }

    fn cached<'c>(
        &self,
        cache: &'c HistoryCache,
        ticker: &str,
        timeframe: Timeframe,
        today: NaiveDate,
    ) -> Option<&'c [PriceBar]> {
        if !self.caching {
            return None;
        }
        let hit = cache.get(ticker, timeframe, today);
        if hit.is_some() {
            tracing::debug!(ticker, %timeframe, "price history cache hit");
        }
        hit
    }

    /// Internal: fetch one ticker's bars with automatic provider fallback.
    ///
    /// Rejects responses containing non-finite or non-positive prices and
    /// moves on to the next provider.
    async fn fetch_from_providers(
        &self,
        ticker: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<PriceBar>, CoreError> {
        let providers = self.registry.providers();
        if providers.is_empty() {
            return Err(CoreError::NoProvider(format!(
                "no provider registered to fetch {ticker}"
            )));
        }

        let mut last_error = None;

        for provider in &providers {
            match provider.fetch_history(ticker, timeframe).await {
                Ok(bars) if bars.is_empty() => {
                    last_error = Some(CoreError::InsufficientData(format!(
                        "{} returned no {timeframe} history for {ticker}",
                        provider.name()
                    )));
                }
                Ok(bars) => {
                    if let Some(bad) = bars.iter().find(|b| !is_valid_price(b)) {
                        last_error = Some(CoreError::Api {
                            provider: provider.name().to_string(),
                            message: format!(
                                "Invalid price returned for {ticker} on {}: {} (must be finite and positive)",
                                bad.date, bad.adj_close
                            ),
                        });
                    } else {
                        return Ok(bars);
                    }
                }
                Err(e) => {
                    last_error = Some(e);
                }
            }

            if let Some(e) = &last_error {
                tracing::warn!(provider = provider.name(), ticker, error = %e, "price history fetch failed");
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(ticker.to_string())))
    }
}

fn is_valid_price(bar: &PriceBar) -> bool {
    bar.adj_close.is_finite() && bar.adj_close > 0.0 && bar.close.is_finite() && bar.close > 0.0
}
