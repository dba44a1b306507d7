//! Yahoo Finance price provider.
//!
//! Fetches daily bars (with adjusted close) from Yahoo's v8 chart API.
//! Yahoo has no official API and changes format without notice, so parsing is
//! a pure function over the response body and every structural surprise maps
//! to `ResponseFormatChanged`.
//!
//! There is no retry here. A transient failure is returned to the caller, and
//! the circuit breaker only stops us from hammering a provider that has
//! already banned or throttled us.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, PriceProvider, ProviderError, RawBar};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

/// Only the exchange's UTC offset is needed, to date bars in exchange time.
#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl YahooProvider {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            circuit_breaker,
        })
    }

    /// Chart API URL for a symbol over an inclusive date range.
    fn chart_url(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        // period2 is exclusive on Yahoo's side; push it to the end of `end`.
        let end_ts = (end + chrono::Duration::days(1))
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .timestamp()
            - 1;
        format!(
            "{}/v8/finance/chart/{symbol}?period1={start_ts}&period2={end_ts}\
             &interval=1d&includeAdjustedClose=true",
            self.base_url
        )
    }
}

/// Parse a chart API body into raw bars.
///
/// Rows where every OHLCV field is missing (holidays) are skipped. A missing
/// individual price becomes NaN and is left for the loader to drop. When the
/// response carries no adjusted-close block at all, the close is used.
///
/// Bar dates are taken in the exchange's local time (`meta.gmtoffset`), so a
/// session opening at local midnight east of UTC keeps its own date.
pub fn parse_chart(symbol: &str, body: &str) -> Result<Vec<RawBar>, DataError> {
    let resp: ChartResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::ResponseFormatChanged(format!("failed to parse chart for {symbol}: {e}"))
    })?;

    let result = match (resp.chart.result, resp.chart.error) {
        (Some(result), _) => result,
        (None, Some(err)) if err.code == "Not Found" => {
            return Err(DataError::unavailable(symbol, err.description));
        }
        (None, Some(err)) => {
            return Err(ProviderError::ResponseFormatChanged(format!(
                "{}: {}",
                err.code, err.description
            ))
            .into());
        }
        (None, None) => {
            return Err(
                ProviderError::ResponseFormatChanged("empty result with no error".into()).into(),
            );
        }
    };

    let Some(data) = result.into_iter().next() else {
        return Err(DataError::unavailable(symbol, "empty chart result"));
    };

    // No timestamps means no trading days in range.
    let Some(timestamps) = data.timestamp else {
        return Err(DataError::unavailable(symbol, "no trading days in range"));
    };

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::ResponseFormatChanged("no quote data".into()))?;

    let adj_closes = data
        .indicators
        .adjclose
        .and_then(|v| v.into_iter().next())
        .map(|a| a.adjclose);

    let offset = data.meta.gmtoffset;
    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(ts + offset, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| ProviderError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))?;

        let open = quote.open.get(i).copied().flatten();
        let high = quote.high.get(i).copied().flatten();
        let low = quote.low.get(i).copied().flatten();
        let close = quote.close.get(i).copied().flatten();
        let volume = quote.volume.get(i).copied().flatten();

        if open.is_none() && high.is_none() && low.is_none() && close.is_none() && volume.is_none() {
            continue;
        }

        let adj_close = match &adj_closes {
            Some(v) => v.get(i).copied().flatten(),
            None => close,
        };

        bars.push(RawBar {
            date,
            open: open.unwrap_or(f64::NAN),
            high: high.unwrap_or(f64::NAN),
            low: low.unwrap_or(f64::NAN),
            close: close.unwrap_or(f64::NAN),
            adj_close: adj_close.unwrap_or(f64::NAN),
            volume: volume.unwrap_or(0),
        });
    }

    Ok(bars)
}

impl PriceProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        if !self.circuit_breaker.is_allowed() {
            tracing::warn!(
                symbol,
                cooldown_secs = self.circuit_breaker.remaining_cooldown().as_secs(),
                "yahoo circuit breaker open, refusing request"
            );
            return Err(ProviderError::CircuitBreakerTripped.into());
        }

        let url = self.chart_url(symbol, start, end);
        tracing::debug!(symbol, %start, %end, "requesting yahoo chart");

        let resp = match self.client.get(&url).send() {
            Ok(resp) => resp,
            Err(e) => {
                self.circuit_breaker.record_failure();
                return Err(ProviderError::NetworkUnreachable(e.to_string()).into());
            }
        };

        let status = resp.status();
        if status == reqwest::StatusCode::FORBIDDEN {
            tracing::warn!(symbol, "yahoo returned 403, tripping circuit breaker");
            self.circuit_breaker.trip();
            return Err(ProviderError::CircuitBreakerTripped.into());
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(
                ProviderError::Credential("Yahoo Finance requires authentication".into()).into(),
            );
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            self.circuit_breaker.record_failure();
            let retry_after = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ProviderError::RateLimited {
                retry_after_secs: retry_after,
            }
            .into());
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            // Yahoo answers unknown symbols with 404 and a chart.error body.
            let body = resp.text().unwrap_or_default();
            return match parse_chart(symbol, &body) {
                Err(e @ DataError::DataUnavailable { .. }) => Err(e),
                _ => Err(DataError::unavailable(symbol, "symbol not found")),
            };
        }
        if !status.is_success() {
            self.circuit_breaker.record_failure();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                detail: format!("chart request for {symbol}"),
            }
            .into());
        }

        let body = resp.text()?;
        let bars = parse_chart(symbol, &body)?;
        self.circuit_breaker.record_success();
        tracing::debug!(symbol, rows = bars.len(), "yahoo chart parsed");
        Ok(bars)
    }
}
