use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::price::PriceBar;
use crate::models::timeframe::Timeframe;

/// Source of daily price history for a single ticker.
///
/// Each upstream API (Yahoo Finance, Alpha Vantage) implements this trait.
/// If an API stops working or changes, only that one implementation is
/// replaced. The rest of the codebase is untouched.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Daily bars for `ticker` covering `timeframe`, sorted by date.
    ///
    /// Must fail rather than return an empty Vec when the ticker is
    /// unknown or has no data in range.
    async fn fetch_history(
        &self,
        ticker: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<PriceBar>, CoreError>;
}
