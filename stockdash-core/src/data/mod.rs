//! Providers: price history, fundamentals, and news collaborators.

pub mod alpha_vantage;
pub mod circuit_breaker;
pub mod csv_import;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

#[cfg(test)]
pub(crate) mod test_server;

pub use alpha_vantage::AlphaVantageClient;
pub use circuit_breaker::CircuitBreaker;
pub use csv_import::CsvPriceProvider;
pub use provider::{
    DataError, FeedRow, FundamentalsProvider, NewsProvider, PriceProvider, ProviderError,
    ProviderTable, RawBar,
};
pub use synthetic::SyntheticPriceProvider;
pub use yahoo::YahooProvider;
