use crate::errors::CoreError;
use crate::models::analytics::KpiSnapshot;
use crate::models::price::CumulativeReturnSeries;

/// Reduces a cumulative-return series to summary KPIs.
pub struct KpiService;

impl KpiService {
    pub fn new() -> Self {
        Self
    }

    /// Total return and maximum drawdown of a growth-of-one series.
    ///
    /// - `total_return = last - 1`
    /// - `max_drawdown = min_t(v[t] / max(v[..=t]) - 1)`, never positive
    pub fn compute_kpis(&self, series: &CumulativeReturnSeries) -> Result<KpiSnapshot, CoreError> {
        let (_, last) = series.last().ok_or(CoreError::EmptySeries)?;

        Ok(KpiSnapshot {
            total_return: last - 1.0,
            max_drawdown: self.max_drawdown(series),
        })
    }

    /// Deepest decline from a running peak; `0.0` for a non-decreasing series.
    pub fn max_drawdown(&self, series: &CumulativeReturnSeries) -> f64 {
        let mut peak = f64::NEG_INFINITY;
        let mut worst = 0.0_f64;
        for value in series.values() {
            peak = peak.max(value);
            if peak > 0.0 {
                worst = worst.min(value / peak - 1.0);
            }
        }
        worst
    }
}

impl Default for KpiService {
    fn default() -> Self {
        Self::new()
    }
}
