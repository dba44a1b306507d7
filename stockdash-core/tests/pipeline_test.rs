//! Integration tests for the provider-to-domain pipelines, without network.
//!
//! Each test feeds a recorded or hand-written provider payload through the
//! same functions the HTTP clients use, then through the core components.

use chrono::NaiveDate;
use serde_json::json;
use std::io::Write;

use stockdash_core::data::alpha_vantage::{parse_news_feed, pivot_annual_reports};
use stockdash_core::data::yahoo::parse_chart;
use stockdash_core::data::{
    CsvPriceProvider, DataError, FeedRow, FundamentalsProvider, NewsProvider, ProviderTable,
};
use stockdash_core::domain::{StatementKind, StatementValue, Ticker};
use stockdash_core::metrics::ReturnMetrics;
use stockdash_core::{news, price_loader, statements};

fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, day).unwrap()
}

fn ticker(s: &str) -> Ticker {
    Ticker::parse(s).unwrap()
}

/// Replays a fixed Alpha Vantage body for every statement kind.
struct RecordedFundamentals(serde_json::Value);

impl FundamentalsProvider for RecordedFundamentals {
    fn name(&self) -> &str {
        "recorded"
    }

    fn fetch_statement(&self, symbol: &str, _kind: StatementKind) -> Result<ProviderTable, DataError> {
        pivot_annual_reports(symbol, &self.0)
    }
}

struct RecordedNews(serde_json::Value);

impl NewsProvider for RecordedNews {
    fn name(&self) -> &str {
        "recorded"
    }

    fn fetch_feed(&self, symbol: &str) -> Result<Vec<FeedRow>, DataError> {
        parse_news_feed(symbol, self.0.clone())
    }
}

// ── Statements ───────────────────────────────────────────────────────

#[test]
fn alpha_vantage_balance_sheet_normalizes_to_periods() {
    let body = json!({
        "symbol": "IBM",
        "annualReports": [
            {"fiscalDateEnding": "2023-12-31", "reportedCurrency": "USD", "totalAssets": "135241000000", "goodwill": "None"},
            {"fiscalDateEnding": "2022-12-31", "reportedCurrency": "USD", "totalAssets": "127243000000", "goodwill": "55949000000"},
            {"fiscalDateEnding": "2021-12-31", "reportedCurrency": "USD", "totalAssets": "132001000000", "goodwill": "55643000000"}
        ]
    });
    let provider = RecordedFundamentals(body);
    let stmt = statements::fetch_statement(&provider, &ticker("ibm"), StatementKind::BalanceSheet)
        .unwrap();

    assert_eq!(stmt.period_count(), 3);
    assert_eq!(stmt.headers(), ["totalAssets", "goodwill"]);
    assert_eq!(
        stmt.value("2023-12-31", "totalAssets"),
        Some(&StatementValue::Number(135_241_000_000.0))
    );
    assert_eq!(
        stmt.value("2023-12-31", "goodwill"),
        Some(&StatementValue::Raw("None".into()))
    );
}

#[test]
fn unknown_symbol_fundamentals_are_unavailable() {
    let provider = RecordedFundamentals(json!({}));
    let err = statements::fetch_statement(&provider, &ticker("ZZZZ"), StatementKind::CashFlow)
        .unwrap_err();
    assert!(matches!(err, DataError::DataUnavailable { .. }));
}

#[test]
fn missing_key_notice_is_a_credential_error() {
    let provider = RecordedFundamentals(json!({
        "Information": "Please provide a valid apikey parameter."
    }));
    let err = statements::fetch_statement(&provider, &ticker("IBM"), StatementKind::IncomeStatement)
        .unwrap_err();
    assert!(err.is_credential());
}

// ── News ─────────────────────────────────────────────────────────────

#[test]
fn news_feed_maps_scores_and_caps() {
    let entries: Vec<_> = (0..15)
        .map(|i| {
            json!({
                "title": format!("IBM story {i}"),
                "summary": "summary",
                "time_published": "20240105T133000",
                "overall_sentiment_score": 0.25,
                "ticker_sentiment": [
                    {"ticker": "IBM", "ticker_sentiment_score": "0.5"}
                ]
            })
        })
        .collect();
    let provider = RecordedNews(json!({ "feed": entries }));
    let items = news::fetch(&provider, &ticker("IBM")).unwrap();

    assert_eq!(items.len(), news::NEWS_LIMIT);
    assert_eq!(items[0].title, "IBM story 0");
    assert_eq!(items[0].published_at, "2024-01-05 13:30:00");
    assert_eq!(items[0].title_sentiment, 0.5);
    assert_eq!(items[0].summary_sentiment, 0.25);
}

// ── Prices ───────────────────────────────────────────────────────────

#[test]
fn csv_prices_load_and_compute_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = std::fs::File::create(dir.path().join("SPY.csv")).unwrap();
    writeln!(file, "Date,Open,High,Low,Close,Adj Close,Volume").unwrap();
    // Out of order, with one row outside the requested range.
    writeln!(file, "2024-01-04,101,102,100,101,101,1000").unwrap();
    writeln!(file, "2024-01-02,100,101,99,100,100,1000").unwrap();
    writeln!(file, "2024-01-03,100,103,99,102,102,1000").unwrap();
    writeln!(file, "2024-02-01,90,90,90,90,90,1000").unwrap();
    drop(file);

    let provider = CsvPriceProvider::new(dir.path());
    let series = price_loader::load(&provider, &ticker("spy"), d(1, 1), d(1, 31)).unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series.first_date(), Some(d(1, 2)));

    let metrics = ReturnMetrics::compute(&series);
    let expected = (0.02 + (-1.0 / 102.0)) / 2.0 * 252.0 * 100.0;
    assert!((metrics.annualized_return_pct - expected).abs() < 1e-9);
}

#[test]
fn csv_missing_file_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let provider = CsvPriceProvider::new(dir.path());
    let err = price_loader::load(&provider, &ticker("NOPE"), d(1, 1), d(1, 31)).unwrap_err();
    assert!(matches!(err, DataError::DataUnavailable { .. }));
}

#[test]
fn yahoo_chart_body_feeds_metrics() {
    // 2024-01-02, 2024-01-03, 2024-01-04 at 14:30 UTC.
    let body = json!({
        "chart": {
            "result": [{
                "timestamp": [1704205800, 1704292200, 1704378600],
                "indicators": {
                    "quote": [{
                        "open": [100.0, 102.0, 101.0],
                        "high": [100.0, 102.0, 101.0],
                        "low": [100.0, 102.0, 101.0],
                        "close": [100.0, 102.0, 101.0],
                        "volume": [10, 10, 10]
                    }],
                    "adjclose": [{"adjclose": [100.0, 102.0, 101.0]}]
                }
            }],
            "error": null
        }
    })
    .to_string();

    let bars = parse_chart("SPY", &body).unwrap();
    assert_eq!(bars.len(), 3);
    assert_eq!(bars[0].date, d(1, 2));

    let closes: Vec<f64> = bars.iter().map(|b| b.adj_close).collect();
    let metrics = ReturnMetrics::from_adjusted_closes(&closes);
    assert!((metrics.annualized_return_pct - 128.47).abs() < 0.01);
}
