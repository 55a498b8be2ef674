use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::portfolio::AllocationEntry;
use super::price::CumulativeReturnSeries;
use super::timeframe::Timeframe;

/// Summary statistics of one cumulative-return series. Recomputed per request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiSnapshot {
    /// Final growth minus one, e.g. `0.10` for +10%.
    pub total_return: f64,

    /// Deepest peak-to-trough decline, `<= 0`, e.g. `-0.25` for -25%.
    pub max_drawdown: f64,
}

impl std::fmt::Display for KpiSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Total Return: {:.2}%, Max Drawdown: {:.2}%",
            self.total_return * 100.0,
            self.max_drawdown * 100.0
        )
    }
}

/// Everything the dashboard's performance panels need for one
/// (timeframe, benchmark) selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub timeframe: Timeframe,

    /// Benchmark name the portfolio is compared against
    pub benchmark_name: String,

    /// The persisted allocation the report was computed from (pie chart data)
    pub allocation: Vec<AllocationEntry>,

    /// Weighted cumulative growth of the portfolio
    pub portfolio: CumulativeReturnSeries,

    /// Weighted cumulative growth of the benchmark composite
    pub benchmark: CumulativeReturnSeries,

    /// KPIs of the portfolio series
    pub kpis: KpiSnapshot,

    /// Each holding's own cumulative growth, keyed by ticker
    pub assets: BTreeMap<String, CumulativeReturnSeries>,
}
