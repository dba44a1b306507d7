//! Provider traits and structured error types.
//!
//! Three collaborators feed the core: a daily price history source, a
//! fundamentals source delivering pivoted statement tables, and a news feed.
//! Each is a trait so the HTTP clients can be swapped for CSV files,
//! synthetic data, or mocks in tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::statement::{StatementKind, StatementValue};

/// Raw daily bar from a price provider (before ordering and validation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: u64,
}

/// Raw pivoted statement table as delivered by a fundamentals provider.
///
/// Rows are line items, columns are metadata followed by fiscal periods.
/// Every row must have exactly one cell per column label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<StatementValue>>,
}

impl ProviderTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<StatementValue>>) -> Self {
        Self { columns, rows }
    }
}

/// One row of a provider's news feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedRow {
    pub published: String,
    pub title: String,
    pub summary: String,
    pub sentiment_title: f64,
    pub sentiment_summary: f64,
}

/// Failures talking to an external provider.
///
/// Credential failures are configuration problems; everything else except a
/// changed response format is a candidate for caller-side retry.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ProviderError {
    #[error("credential rejected or missing: {0}")]
    Credential(String),

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("hard stop: provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// The provider refused this request permanently (e.g. a plan-restricted
    /// endpoint). Repeating it will not help.
    #[error("request rejected by provider: {0}")]
    Rejected(String),
}

impl ProviderError {
    /// True when the failure is a configuration problem (missing or rejected key).
    pub fn is_credential(&self) -> bool {
        matches!(self, ProviderError::Credential(_))
    }

    /// True when retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::NetworkUnreachable(_)
            | ProviderError::RateLimited { .. }
            | ProviderError::CircuitBreakerTripped => true,
            ProviderError::Http { status, .. } => *status >= 500,
            ProviderError::Credential(_)
            | ProviderError::ResponseFormatChanged(_)
            | ProviderError::Rejected(_) => false,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ProviderError::ResponseFormatChanged(e.to_string())
        } else if let Some(status) = e.status() {
            ProviderError::Http {
                status: status.as_u16(),
                detail: e.to_string(),
            }
        } else {
            ProviderError::NetworkUnreachable(e.to_string())
        }
    }
}

/// Section-level error taxonomy.
///
/// These are designed to be rendered inline next to the section they belong
/// to, in both CLI and JSON output.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum DataError {
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("no data for '{symbol}': {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("malformed statement: {0}")]
    MalformedStatement(String),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl DataError {
    pub fn unavailable(symbol: &str, reason: impl Into<String>) -> Self {
        DataError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }

    /// True when the underlying provider failure is worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            DataError::Provider(e) => e.is_transient(),
            _ => false,
        }
    }

    /// True when the failure is a missing or rejected credential.
    pub fn is_credential(&self) -> bool {
        matches!(self, DataError::Provider(e) if e.is_credential())
    }
}

impl From<reqwest::Error> for DataError {
    fn from(e: reqwest::Error) -> Self {
        DataError::Provider(e.into())
    }
}

/// Daily price history source.
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for a symbol over the inclusive range `[start, end]`.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<RawBar>, DataError>;
}

/// Annual financial statement source.
pub trait FundamentalsProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch the raw pivoted table for one statement kind.
    fn fetch_statement(&self, symbol: &str, kind: StatementKind)
        -> Result<ProviderTable, DataError>;
}

/// Sentiment-scored news feed source.
pub trait NewsProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch the feed for a symbol in provider order.
    fn fetch_feed(&self, symbol: &str) -> Result<Vec<FeedRow>, DataError>;
}
