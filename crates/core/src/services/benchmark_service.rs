use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::benchmark::{BenchmarkDefinition, BenchmarkRecord};
use crate::models::price::{CumulativeReturnSeries, HistoryCache, PriceSeries};
use crate::models::timeframe::Timeframe;
use crate::services::price_service::PriceService;
use crate::services::returns_service::ReturnsService;

/// Named benchmark composites, in configured order.
///
/// Loaded once at startup and treated as read-only configuration.
/// Records keep their persisted comma-joined form and are parsed when
/// a benchmark is resolved.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkRegistry {
    records: Vec<BenchmarkRecord>,
}

impl BenchmarkRegistry {
    pub fn new(records: Vec<BenchmarkRecord>) -> Self {
        Self { records }
    }

    /// Registry holding the three built-in benchmarks.
    pub fn with_defaults() -> Self {
        Self::new(BenchmarkRecord::defaults())
    }

    /// Benchmark names in configured order (dropdown options).
    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn records(&self) -> &[BenchmarkRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a benchmark by exact name and parse its constituents.
    pub fn get(&self, name: &str) -> Result<BenchmarkDefinition, CoreError> {
        self.records
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| CoreError::UnknownBenchmark(name.to_string()))?
            .parse()
    }
}

/// Produces a benchmark composite's cumulative-return series.
///
/// Composition is delegated to `ReturnsService`, so a benchmark behaves
/// exactly like a portfolio holding the same weights.
pub struct BenchmarkService {
    returns_service: ReturnsService,
}

impl BenchmarkService {
    pub fn new() -> Self {
        Self {
            returns_service: ReturnsService::new(),
        }
    }

    /// Compose a benchmark from already-fetched prices.
    pub fn resolve_benchmark(
        &self,
        definition: &BenchmarkDefinition,
        prices: &HashMap<String, PriceSeries>,
    ) -> Result<CumulativeReturnSeries, CoreError> {
        definition.validate()?;
        self.returns_service
            .build_portfolio_returns(prices, &definition.weight_pairs())
    }

    /// Fetch a benchmark's constituents over `timeframe`, then compose it.
    pub async fn resolve_with_prices(
        &self,
        definition: &BenchmarkDefinition,
        price_service: &PriceService,
        cache: &mut HistoryCache,
        timeframe: Timeframe,
    ) -> Result<CumulativeReturnSeries, CoreError> {
        definition.validate()?;
        let prices = price_service
            .get_price_series(cache, &definition.tickers, timeframe)
            .await?;
        self.resolve_benchmark(definition, &prices)
    }
}

impl Default for BenchmarkService {
    fn default() -> Self {
        Self::new()
    }
}
