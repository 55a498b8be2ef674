use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::price::PriceBar;
use crate::models::timeframe::Timeframe;
use super::traits::PriceHistoryProvider;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER: &str = "Alpha Vantage";

/// Alpha Vantage price history provider (fallback).
///
/// - **Free tier**: 25 requests/day (across ALL endpoints).
/// - **Requires**: API key (set via settings as "alphavantage").
/// - **Coverage**: 100k+ global equity symbols.
///
/// The free daily endpoint is not dividend-adjusted, so `adj_close`
/// equals `close` for bars from this provider.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
}

impl AlphaVantageProvider {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, api_key }
    }

    /// Parse a `TIME_SERIES_DAILY` response body into bars dated `from..=to`.
    pub fn parse_time_series(
        body: &str,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PriceBar>, CoreError> {
        let resp: TimeSeriesResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse time series for {ticker}: {e}"),
        })?;

        let series = match resp.time_series {
            Some(series) => series,
            // Alpha Vantage answers an unknown symbol with an "Error Message" body.
            None if resp.error_message.is_some() => {
                return Err(CoreError::InsufficientData(format!(
                    "{PROVIDER} has no data for {ticker}: {}",
                    resp.error_message.unwrap_or_default()
                )));
            }
            None => {
                let detail = resp.note.or(resp.information).unwrap_or_default();
                return Err(CoreError::Api {
                    provider: PROVIDER.into(),
                    message: format!(
                        "No time series data for {ticker}. API limit may be exceeded. {detail}"
                    )
                    .trim_end()
                    .to_string(),
                });
            }
        };

        let mut bars: Vec<PriceBar> = series
            .iter()
            .filter_map(|(date_str, data)| {
                let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;
                if date < from || date > to {
                    return None;
                }
                let close: f64 = data.close.parse().ok()?;
                Some(PriceBar {
                    date,
                    open: data.open.parse().ok()?,
                    high: data.high.parse().ok()?,
                    low: data.low.parse().ok()?,
                    close,
                    adj_close: close,
                })
            })
            .collect();
        bars.sort_by_key(|b| b.date);

        if bars.is_empty() {
            return Err(CoreError::InsufficientData(format!(
                "{PROVIDER} returned no history for {ticker} between {from} and {to}"
            )));
        }

        Ok(bars)
    }
}

// ── Alpha Vantage API response types ────────────────────────────────

#[derive(Deserialize)]
struct TimeSeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyData>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Deserialize)]
struct DailyData {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
}

#[async_trait]
impl PriceHistoryProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_history(
        &self,
        ticker: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<PriceBar>, CoreError> {
        // Compact output covers the last 100 trading days (~4.5 months).
        let output_size = match timeframe {
            Timeframe::OneMonth | Timeframe::ThreeMonths => "compact",
            _ => "full",
        };

        let body = self
            .client
            .get(BASE_URL)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", &ticker.to_uppercase()),
                ("outputsize", output_size),
                ("apikey", &self.api_key),
            ])
            .send()
            .await?
            .text()
            .await?;

        let today = chrono::Utc::now().date_naive();
        Self::parse_time_series(&body, ticker, timeframe.start_date(today), today)
    }
}
