//! Alpha Vantage client: annual statements and the news sentiment feed.
//!
//! Statements arrive as a list of per-period report objects. They are pivoted
//! into a [`ProviderTable`] whose rows are line items and whose columns are
//! `lineItem`, `reportedCurrency`, then one column per `fiscalDateEnding`.
//! The normalizer turns that back into a period-indexed table.
//!
//! Alpha Vantage reports most failures with HTTP 200 and an explanatory key
//! in the body, so every response goes through [`classify_body`] first.

use chrono::NaiveDateTime;
use indexmap::IndexSet;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::provider::{
    DataError, FeedRow, FundamentalsProvider, NewsProvider, ProviderError, ProviderTable,
};
use crate::domain::statement::{StatementKind, StatementValue};

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";

const LINE_ITEM_COLUMN: &str = "lineItem";
const CURRENCY_COLUMN: &str = "reportedCurrency";
const PERIOD_KEY: &str = "fiscalDateEnding";
const FEED_LIMIT: &str = "50";
const NOTICE_RETRY_SECS: u64 = 60;

fn function_name(kind: StatementKind) -> &'static str {
    match kind {
        StatementKind::BalanceSheet => "BALANCE_SHEET",
        StatementKind::IncomeStatement => "INCOME_STATEMENT",
        StatementKind::CashFlow => "CASH_FLOW",
    }
}

pub struct AlphaVantageClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl AlphaVantageClient {
    /// Build a client. A missing key is not an error here; every fetch then
    /// fails with a credential error so the other sections still render.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        api_key: Option<SecretString>,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn get_json(&self, symbol: &str, params: &[(&str, &str)]) -> Result<Value, DataError> {
        let key = self.api_key.as_ref().ok_or_else(|| {
            ProviderError::Credential("no Alpha Vantage API key configured".into())
        })?;

        let url = format!("{}/query", self.base_url);
        tracing::debug!(symbol, ?params, "requesting alpha vantage");

        let resp = self
            .client
            .get(&url)
            .query(params)
            .query(&[("apikey", key.expose_secret())])
            .send()
            .map_err(|e| ProviderError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::Credential(format!("HTTP {status}")).into());
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                retry_after_secs: NOTICE_RETRY_SECS,
            }
            .into());
        }
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                detail: format!("alpha vantage request for {symbol}"),
            }
            .into());
        }

        let body: Value = resp
            .json()
            .map_err(|e| ProviderError::ResponseFormatChanged(e.to_string()))?;
        classify_body(symbol, &body)?;
        Ok(body)
    }
}

/// Map Alpha Vantage's in-body error conventions onto the error taxonomy.
///
/// Notices share one or two keys for very different failures, so the text
/// decides: throttling is transient, a bad key is a credential problem, an
/// unknown symbol is missing data, and anything else (premium-only
/// endpoints included) is a permanent rejection.
pub fn classify_body(symbol: &str, body: &Value) -> Result<(), DataError> {
    if let Some(msg) = body.get("Error Message").and_then(Value::as_str) {
        return Err(DataError::unavailable(symbol, msg));
    }

    let notice = body
        .get("Information")
        .or_else(|| body.get("Note"))
        .and_then(Value::as_str);
    let Some(msg) = notice else {
        return Ok(());
    };

    let lower = msg.to_ascii_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(*n));

    if has(&["rate limit", "call frequency", "requests per", "calls per"]) {
        return Err(ProviderError::RateLimited {
            retry_after_secs: NOTICE_RETRY_SECS,
        }
        .into());
    }
    if has(&["apikey", "api key"]) {
        return Err(ProviderError::Credential(msg.to_string()).into());
    }
    if has(&["invalid inputs", "invalid api call"]) {
        return Err(DataError::unavailable(symbol, msg));
    }
    Err(ProviderError::Rejected(msg.to_string()).into())
}

fn cell(value: Option<&Value>) -> StatementValue {
    match value {
        Some(Value::String(s)) => StatementValue::parse(s),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(StatementValue::Number)
            .unwrap_or_else(|| StatementValue::Raw(n.to_string())),
        Some(Value::Null) | None => StatementValue::Raw("None".into()),
        Some(other) => StatementValue::Raw(other.to_string()),
    }
}

/// Pivot `annualReports` into a line-item-by-period provider table.
pub fn pivot_annual_reports(symbol: &str, body: &Value) -> Result<ProviderTable, DataError> {
    classify_body(symbol, body)?;

    let reports = match body.get("annualReports") {
        Some(Value::Array(reports)) => reports,
        Some(_) => {
            return Err(ProviderError::ResponseFormatChanged(
                "annualReports is not an array".into(),
            )
            .into());
        }
        // Unknown symbols come back as an empty object.
        None if body.as_object().is_some_and(|o| o.is_empty()) => {
            return Err(DataError::unavailable(symbol, "no fundamentals for symbol"));
        }
        None => {
            return Err(
                ProviderError::ResponseFormatChanged("missing annualReports".into()).into(),
            );
        }
    };

    if reports.is_empty() {
        return Err(DataError::unavailable(symbol, "no annual reports"));
    }

    let mut periods = Vec::with_capacity(reports.len());
    let mut line_items: IndexSet<String> = IndexSet::new();
    for report in reports {
        let obj = report.as_object().ok_or_else(|| {
            ProviderError::ResponseFormatChanged("annual report is not an object".into())
        })?;
        let period = obj.get(PERIOD_KEY).and_then(Value::as_str).ok_or_else(|| {
            ProviderError::ResponseFormatChanged(format!("report without {PERIOD_KEY}"))
        })?;
        periods.push(period.to_string());
        for key in obj.keys() {
            if key != PERIOD_KEY && key != CURRENCY_COLUMN {
                line_items.insert(key.clone());
            }
        }
    }

    let currency = reports[0]
        .get(CURRENCY_COLUMN)
        .and_then(Value::as_str)
        .unwrap_or("None");

    let mut columns = Vec::with_capacity(periods.len() + 2);
    columns.push(LINE_ITEM_COLUMN.to_string());
    columns.push(CURRENCY_COLUMN.to_string());
    columns.extend(periods);

    let rows = line_items
        .iter()
        .map(|item| {
            let mut row = Vec::with_capacity(columns.len());
            row.push(StatementValue::Raw(item.clone()));
            row.push(StatementValue::Raw(currency.to_string()));
            row.extend(reports.iter().map(|r| cell(r.get(item))));
            row
        })
        .collect();

    Ok(ProviderTable::new(columns, rows))
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    feed: Vec<FeedEntry>,
}

#[derive(Debug, Deserialize)]
struct FeedEntry {
    title: String,
    #[serde(default)]
    summary: String,
    time_published: String,
    overall_sentiment_score: f64,
    #[serde(default)]
    ticker_sentiment: Vec<TickerSentiment>,
}

#[derive(Debug, Deserialize)]
struct TickerSentiment {
    ticker: String,
    ticker_sentiment_score: String,
}

fn format_published(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw, "%Y%m%dT%H%M%S")
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Map a `NEWS_SENTIMENT` body onto feed rows, keeping feed order.
///
/// Title sentiment is the score Alpha Vantage assigns to the requested
/// ticker within the article; summary sentiment is the article's overall
/// score.
pub fn parse_news_feed(symbol: &str, body: Value) -> Result<Vec<FeedRow>, DataError> {
    classify_body(symbol, &body)?;
    let resp: NewsResponse = serde_json::from_value(body)
        .map_err(|e| ProviderError::ResponseFormatChanged(format!("news feed: {e}")))?;

    Ok(resp
        .feed
        .into_iter()
        .map(|entry| {
            let ticker_score = entry
                .ticker_sentiment
                .iter()
                .find(|t| t.ticker.eq_ignore_ascii_case(symbol))
                .and_then(|t| t.ticker_sentiment_score.trim().parse::<f64>().ok())
                .filter(|s| s.is_finite());
            FeedRow {
                published: format_published(&entry.time_published),
                title: entry.title,
                summary: entry.summary,
                sentiment_title: ticker_score.unwrap_or(entry.overall_sentiment_score),
                sentiment_summary: entry.overall_sentiment_score,
            }
        })
        .collect())
}

impl FundamentalsProvider for AlphaVantageClient {
    fn name(&self) -> &str {
        "alpha_vantage"
    }

    fn fetch_statement(
        &self,
        symbol: &str,
        kind: StatementKind,
    ) -> Result<ProviderTable, DataError> {
        let body = self.get_json(symbol, &[("function", function_name(kind)), ("symbol", symbol)])?;
        pivot_annual_reports(symbol, &body)
    }
}

impl NewsProvider for AlphaVantageClient {
    fn name(&self) -> &str {
        "alpha_vantage_news"
    }

    fn fetch_feed(&self, symbol: &str) -> Result<Vec<FeedRow>, DataError> {
        let body = self.get_json(
            symbol,
            &[
                ("function", "NEWS_SENTIMENT"),
                ("tickers", symbol),
                ("limit", FEED_LIMIT),
            ],
        )?;
        parse_news_feed(symbol, body)
    }
}
