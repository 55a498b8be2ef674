pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::collections::BTreeMap;

use models::{
    allocation::{AllocationRow, RowEdit, TableState},
    analytics::{KpiSnapshot, PerformanceReport},
    chart::PriceAction,
    portfolio::Portfolio,
    price::{HistoryCache, PriceSeries},
    settings::Settings,
    timeframe::Timeframe,
};
use providers::registry::PriceProviderRegistry;
use services::{
    allocation_service::AllocationTable,
    benchmark_service::{BenchmarkRegistry, BenchmarkService},
    indicator_service::{IndicatorService, STANDARD_WINDOWS},
    kpi_service::KpiService,
    price_service::PriceService,
    returns_service::ReturnsService,
};
use storage::{
    allocation_store::{AllocationStore, CsvAllocationStore},
    benchmark_store::BenchmarkStore,
};

use errors::CoreError;

/// Lookback used for the single-ticker price-action chart.
const PRICE_ACTION_TIMEFRAME: Timeframe = Timeframe::TwoYears;

/// Main entry point for the Portfolio Insights core library.
/// Holds the allocation table, the benchmark registry and all services
/// needed to compute dashboard data from them.
#[must_use]
pub struct PortfolioInsights {
    allocation: AllocationTable,
    benchmarks: BenchmarkRegistry,
    price_service: PriceService,
    price_cache: HistoryCache,
    returns_service: ReturnsService,
    benchmark_service: BenchmarkService,
    kpi_service: KpiService,
    indicator_service: IndicatorService,
}

impl std::fmt::Debug for PortfolioInsights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioInsights")
            .field("allocation", &self.allocation)
            .field("benchmarks", &self.benchmarks.len())
            .field("providers", &self.price_service.get_provider_names())
            .field("cached_histories", &self.price_cache.len())
            .finish()
    }
}

impl PortfolioInsights {
    /// Open the CSV files named in `settings`, seeding either one if missing,
    /// and register the default price providers.
    pub fn open(settings: &Settings) -> Result<Self, CoreError> {
        let store = CsvAllocationStore::new(&settings.portfolio_file);
        let benchmarks = BenchmarkStore::new(&settings.benchmark_file).load_or_seed()?;
        let registry = PriceProviderRegistry::new_with_defaults(&settings.api_keys);
        let price_service = PriceService::new(registry).with_caching(settings.cache_prices);

        tracing::info!(
            portfolio = %settings.portfolio_file.display(),
            benchmarks = benchmarks.len(),
            "portfolio insights opened"
        );
        Self::build(Box::new(store), benchmarks, price_service)
    }

    /// Assemble from explicitly constructed parts (custom stores or providers).
    pub fn with_components(
        store: Box<dyn AllocationStore>,
        benchmarks: BenchmarkRegistry,
        price_service: PriceService,
    ) -> Result<Self, CoreError> {
        Self::build(store, benchmarks, price_service)
    }

    // ── Performance ─────────────────────────────────────────────────

    /// Compute the portfolio-vs-benchmark view for one timeframe.
    ///
    /// Uses the persisted allocation, not unsaved edits.
    pub async fn performance_report(
        &mut self,
        timeframe: Timeframe,
        benchmark_name: &str,
    ) -> Result<PerformanceReport, CoreError> {
        let definition = self.benchmarks.get(benchmark_name)?;
        let portfolio = self.allocation.portfolio().clone();
        if portfolio.is_empty() {
            return Err(CoreError::InsufficientData(
                "the portfolio has no allocations".into(),
            ));
        }

        let prices = self
            .price_service
            .get_price_series(&mut self.price_cache, &portfolio.tickers(), timeframe)
            .await?;

        let portfolio_series = self
            .returns_service
            .build_portfolio_returns(&prices, &portfolio.weight_fractions())?;
        let kpis = self.kpi_service.compute_kpis(&portfolio_series)?;

        let benchmark_series = self
            .benchmark_service
            .resolve_with_prices(&definition, &self.price_service, &mut self.price_cache, timeframe)
            .await?;

        let assets = prices
            .iter()
            .map(|(ticker, series)| {
                (
                    ticker.clone(),
                    self.returns_service.asset_cumulative_returns(series),
                )
            })
            .collect::<BTreeMap<_, _>>();

        tracing::debug!(%timeframe, benchmark = benchmark_name, %kpis, "performance report computed");

        Ok(PerformanceReport {
            timeframe,
            benchmark_name: definition.name,
            allocation: portfolio.entries,
            portfolio: portfolio_series,
            benchmark: benchmark_series,
            kpis,
            assets,
        })
    }

    /// KPIs of the persisted portfolio over `timeframe`.
    pub async fn portfolio_kpis(&mut self, timeframe: Timeframe) -> Result<KpiSnapshot, CoreError> {
        let portfolio = self.allocation.portfolio().clone();
        let prices = self
            .price_service
            .get_price_series(&mut self.price_cache, &portfolio.tickers(), timeframe)
            .await?;
        let series = self
            .returns_service
            .build_portfolio_returns(&prices, &portfolio.weight_fractions())?;
        self.kpi_service.compute_kpis(&series)
    }

    /// Benchmark names in configured order.
    #[must_use]
    pub fn benchmark_names(&self) -> Vec<&str> {
        self.benchmarks.names()
    }

    // ── Price Action ────────────────────────────────────────────────

    /// Two years of daily bars for `ticker` with 9/50/200-day moving
    /// averages of the close.
    pub async fn price_action(&mut self, ticker: &str) -> Result<PriceAction, CoreError> {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(CoreError::Validation("Enter a ticker to view price action".into()));
        }

        let bars = self
            .price_service
            .get_history(&mut self.price_cache, &ticker, PRICE_ACTION_TIMEFRAME)
            .await?;
        if bars.is_empty() {
            return Err(CoreError::InsufficientData(format!(
                "No valid price data found for ticker: {ticker}"
            )));
        }

        let closes = PriceSeries::from_close(&bars);
        let moving_averages = self
            .indicator_service
            .moving_averages(&closes, &STANDARD_WINDOWS)?;

        Ok(PriceAction {
            ticker,
            bars,
            moving_averages,
        })
    }

    // ── Allocation Table ────────────────────────────────────────────

    /// Rows as currently edited.
    #[must_use]
    pub fn allocation_rows(&self) -> &[AllocationRow] {
        self.allocation.rows()
    }

    /// The last persisted allocation.
    #[must_use]
    pub fn current_allocation(&self) -> &Portfolio {
        self.allocation.portfolio()
    }

    /// Append a blank row. Returns its index.
    pub fn add_allocation_row(&mut self) -> usize {
        self.allocation.add_row()
    }

    /// Change the ticker or weight of one row.
    pub fn edit_allocation_row(&mut self, index: usize, edit: RowEdit) -> Result<(), CoreError> {
        self.allocation.edit_row(index, edit)
    }

    /// Validate and persist the edited rows, stamped with today's date.
    pub fn save_allocation(&mut self) -> Result<&Portfolio, CoreError> {
        self.allocation.save()
    }

    /// Discard unsaved edits and re-read the persisted allocation.
    pub fn reload_allocation(&mut self) -> Result<(), CoreError> {
        self.allocation.reload()
    }

    #[must_use]
    pub fn allocation_state(&self) -> TableState {
        self.allocation.state()
    }

    /// Returns `true` if the allocation rows were edited since the last save or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.allocation.is_dirty()
    }

    // ── Cache Management ────────────────────────────────────────────

    /// Number of cached (ticker, timeframe) histories.
    #[must_use]
    pub fn cached_history_count(&self) -> usize {
        self.price_cache.len()
    }

    /// Forget every cached history of `ticker`. Returns the number removed.
    pub fn invalidate_prices(&mut self, ticker: &str) -> usize {
        self.price_cache.invalidate(ticker)
    }

    /// Clear all cached price histories.
    pub fn clear_price_cache(&mut self) {
        self.price_cache.clear();
    }

    /// Names of the registered price providers in fallback order.
    #[must_use]
    pub fn get_provider_names(&self) -> Vec<String> {
        self.price_service.get_provider_names()
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(
        store: Box<dyn AllocationStore>,
        benchmarks: BenchmarkRegistry,
        price_service: PriceService,
    ) -> Result<Self, CoreError> {
        let allocation = AllocationTable::load(store)?;

        Ok(Self {
            allocation,
            benchmarks,
            price_service,
            price_cache: HistoryCache::new(),
            returns_service: ReturnsService::new(),
            benchmark_service: BenchmarkService::new(),
            kpi_service: KpiService::new(),
            indicator_service: IndicatorService::new(),
        })
    }
}
