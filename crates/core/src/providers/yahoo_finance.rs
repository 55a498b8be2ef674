use async_trait::async_trait;
use chrono::NaiveDate;
use yahoo_finance_api::{YResponse, YahooError};

use crate::errors::CoreError;
use crate::models::price::PriceBar;
use crate::models::timeframe::{Timeframe, DAILY_INTERVAL};
use super::traits::PriceHistoryProvider;

const PROVIDER: &str = "Yahoo Finance";

/// Yahoo Finance price history provider.
///
/// - **Free**: No API key required.
/// - **No strict rate limits** (unofficial public API).
/// - **Coverage**: Global equities, ETFs, indices, mutual funds.
/// - **Data**: Daily OHLC with split/dividend adjusted close.
///
/// Uses the `yahoo_finance_api` crate which wraps Yahoo Finance's
/// public chart endpoint. The timeframe maps directly onto Yahoo's
/// `range` parameter.
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new()
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to create connector: {e}"),
            })?;
        Ok(Self { connector })
    }

    /// Convert a unix timestamp (seconds) to `chrono::NaiveDate`.
    fn timestamp_to_naive_date(ts: i64) -> Option<NaiveDate> {
        chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
    }

    /// Turn a chart response into date-ordered bars.
    pub fn bars_from_response(
        resp: &YResponse,
        ticker: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<PriceBar>, CoreError> {
        let quotes = resp
            .quotes()
            .map_err(|e| Self::classify_error(e, ticker, timeframe))?;

        let mut bars: Vec<PriceBar> = quotes
            .iter()
            .filter_map(|q| {
                let date = Self::timestamp_to_naive_date(q.timestamp)?;
                Some(PriceBar {
                    date,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    adj_close: q.adjclose,
                })
            })
            .collect();
        bars.sort_by_key(|b| b.date);

        if bars.is_empty() {
            return Err(CoreError::InsufficientData(format!(
                "{PROVIDER} returned no {timeframe} history for {ticker}"
            )));
        }

        Ok(bars)
    }

    /// Map a connector error onto `CoreError`.
    ///
    /// Unknown symbols and empty data sets are `InsufficientData`; transport,
    /// throttling and malformed responses stay `Api`.
    pub fn classify_error(err: YahooError, ticker: &str, timeframe: Timeframe) -> CoreError {
        match err {
            YahooError::NoResult | YahooError::NoQuotes => CoreError::InsufficientData(format!(
                "{PROVIDER} returned no {timeframe} history for {ticker}"
            )),
            YahooError::ApiError(ref msg)
                if is_not_found(msg.code.as_deref(), msg.description.as_deref()) =>
            {
                CoreError::InsufficientData(format!(
                    "{PROVIDER} has no data for {ticker}: {}",
                    msg.description.as_deref().unwrap_or("not found")
                ))
            }
            other => CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to fetch {timeframe} history for {ticker}: {other}"),
            },
        }
    }
}

fn is_not_found(code: Option<&str>, description: Option<&str>) -> bool {
    code.is_some_and(|c| c.eq_ignore_ascii_case("Not Found"))
        || description.is_some_and(|d| d.contains("No data found"))
}

#[async_trait]
impl PriceHistoryProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_history(
        &self,
        ticker: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<PriceBar>, CoreError> {
        let resp = self
            .connector
            .get_quote_range(ticker, DAILY_INTERVAL, timeframe.as_str())
            .await
            .map_err(|e| Self::classify_error(e, ticker, timeframe))?;

        Self::bars_from_response(&resp, ticker, timeframe)
    }
}
