use crate::errors::CoreError;
use crate::models::chart::{IndicatorSeries, MovingAverageLine};
use crate::models::price::PriceSeries;

/// Moving-average windows drawn on the price-action chart.
pub const STANDARD_WINDOWS: [usize; 3] = [9, 50, 200];

/// Rolling technical indicators over a single price series.
pub struct IndicatorService;

impl IndicatorService {
    pub fn new() -> Self {
        Self
    }

    /// Simple moving average over `window` observations.
    ///
    /// Emits `None` until the window is full, so the first `window - 1`
    /// dates carry no value. Partial-window averages are never produced.
    pub fn moving_average(
        &self,
        prices: &PriceSeries,
        window: usize,
    ) -> Result<IndicatorSeries, CoreError> {
        if window == 0 {
            return Err(CoreError::Validation(
                "moving average window must be positive".into(),
            ));
        }

        let values: Vec<f64> = prices.values().collect();

        // Each window is summed afresh; a running sum drifts over 200-day windows.
        Ok(prices
            .dates()
            .enumerate()
            .map(|(i, date)| {
                let average = (i + 1 >= window).then(|| {
                    values[i + 1 - window..=i].iter().sum::<f64>() / window as f64
                });
                (date, average)
            })
            .collect())
    }

    /// One moving-average line per window, in the order given.
    pub fn moving_averages(
        &self,
        prices: &PriceSeries,
        windows: &[usize],
    ) -> Result<Vec<MovingAverageLine>, CoreError> {
        windows
            .iter()
            .map(|&window| {
                Ok(MovingAverageLine {
                    window,
                    values: self.moving_average(prices, window)?,
                })
            })
            .collect()
    }
}

impl Default for IndicatorService {
    fn default() -> Self {
        Self::new()
    }
}
