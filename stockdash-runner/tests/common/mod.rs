//! Mock providers shared by the runner integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use stockdash_core::data::{
    DataError, FeedRow, FundamentalsProvider, NewsProvider, PriceProvider, ProviderError,
    ProviderTable, RawBar,
};
use stockdash_core::domain::{StatementKind, StatementValue};
use stockdash_runner::{CancelToken, Orchestrator};

pub fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, day).unwrap()
}

/// Daily bars from 2024-01-02 with the given adjusted closes.
pub fn bars(closes: &[f64]) -> Vec<RawBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| RawBar {
            date: d(1, 2) + chrono::Duration::days(i as i64),
            open: c,
            high: c,
            low: c,
            close: c,
            adj_close: c,
            volume: 1_000,
        })
        .collect()
}

pub fn balance_sheet_table() -> ProviderTable {
    ProviderTable::new(
        vec![
            "lineItem".into(),
            "reportedCurrency".into(),
            "2023-12-31".into(),
            "2022-12-31".into(),
            "2021-12-31".into(),
        ],
        vec![vec![
            StatementValue::Raw("totalAssets".into()),
            StatementValue::Raw("USD".into()),
            StatementValue::Number(3.0),
            StatementValue::Number(2.0),
            StatementValue::Number(1.0),
        ]],
    )
}

pub fn feed(n: usize) -> Vec<FeedRow> {
    (0..n)
        .map(|i| FeedRow {
            published: format!("2024-01-02 0{}:00:00", i % 10),
            title: format!("story {i}"),
            summary: format!("summary {i}"),
            sentiment_title: 0.3,
            sentiment_summary: 0.1,
        })
        .collect()
}

pub struct MockPrice {
    pub result: Result<Vec<RawBar>, DataError>,
    pub calls: AtomicUsize,
    /// Cancelled from inside `fetch`, simulating a newer request arriving mid-build.
    pub cancel_on_fetch: Option<CancelToken>,
}

impl MockPrice {
    pub fn ok(closes: &[f64]) -> Self {
        Self::with(Ok(bars(closes)))
    }

    pub fn with(result: Result<Vec<RawBar>, DataError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
            cancel_on_fetch: None,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PriceProvider for MockPrice {
    fn name(&self) -> &str {
        "mock_price"
    }

    fn fetch(&self, _: &str, _: NaiveDate, _: NaiveDate) -> Result<Vec<RawBar>, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = &self.cancel_on_fetch {
            token.cancel();
        }
        self.result.clone()
    }
}

pub struct MockFundamentals {
    pub result: Result<ProviderTable, DataError>,
    pub calls: AtomicUsize,
}

impl MockFundamentals {
    pub fn ok() -> Self {
        Self::with(Ok(balance_sheet_table()))
    }

    pub fn with(result: Result<ProviderTable, DataError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_credential() -> Self {
        Self::with(Err(ProviderError::Credential("no key".into()).into()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FundamentalsProvider for MockFundamentals {
    fn name(&self) -> &str {
        "mock_fundamentals"
    }

    fn fetch_statement(&self, _: &str, _: StatementKind) -> Result<ProviderTable, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

pub struct MockNews {
    pub result: Result<Vec<FeedRow>, DataError>,
    pub calls: AtomicUsize,
}

impl MockNews {
    pub fn ok(n: usize) -> Self {
        Self::with(Ok(feed(n)))
    }

    pub fn with(result: Result<Vec<FeedRow>, DataError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl NewsProvider for MockNews {
    fn name(&self) -> &str {
        "mock_news"
    }

    fn fetch_feed(&self, _: &str) -> Result<Vec<FeedRow>, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Providers kept alongside the orchestrator so tests can inspect call counts.
pub struct Harness {
    pub price: Arc<MockPrice>,
    pub fundamentals: Arc<MockFundamentals>,
    pub news: Arc<MockNews>,
}

impl Harness {
    pub fn new(price: MockPrice, fundamentals: MockFundamentals, news: MockNews) -> Self {
        Self {
            price: Arc::new(price),
            fundamentals: Arc::new(fundamentals),
            news: Arc::new(news),
        }
    }

    pub fn healthy() -> Self {
        Self::new(
            MockPrice::ok(&[100.0, 102.0, 101.0]),
            MockFundamentals::ok(),
            MockNews::ok(3),
        )
    }

    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(
            self.price.clone(),
            self.fundamentals.clone(),
            self.news.clone(),
        )
    }

    pub fn total_calls(&self) -> usize {
        self.price.calls() + self.fundamentals.calls() + self.news.calls()
    }
}
