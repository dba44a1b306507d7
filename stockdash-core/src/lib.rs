//! StockDash Core: price, fundamentals, and news aggregation for one ticker.
//!
//! This crate contains everything below the orchestration layer:
//! - Domain types (tickers, price bars and series, statements, news items)
//! - Provider traits with Yahoo, Alpha Vantage, CSV, and synthetic implementations
//! - Price series loading and validation
//! - Return metrics (percent change, annualized return and volatility)
//! - Statement normalization
//! - News feed adaptation

pub mod data;
pub mod domain;
pub mod metrics;
pub mod news;
pub mod price_loader;
pub mod statements;

pub use data::{DataError, ProviderError};
pub use domain::{NewsItem, NormalizedStatement, PriceBar, PriceSeries, StatementKind, Ticker};
pub use metrics::{ReturnMetrics, RiskAdjustedReturn};
