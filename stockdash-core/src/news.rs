//! NewsAdapter: map a provider feed into at most [`NEWS_LIMIT`] news items.

use crate::data::provider::{DataError, NewsProvider};
use crate::domain::{NewsItem, Ticker};

/// Maximum number of items surfaced per request.
pub const NEWS_LIMIT: usize = 10;

/// Fetch the feed for `ticker` and keep the first [`NEWS_LIMIT`] rows in
/// provider order. Duplicates are not removed.
pub fn fetch(provider: &dyn NewsProvider, ticker: &Ticker) -> Result<Vec<NewsItem>, DataError> {
    let feed = provider.fetch_feed(ticker.as_str())?;
    let total = feed.len();
    let items: Vec<NewsItem> = feed.into_iter().take(NEWS_LIMIT).map(NewsItem::from).collect();
    tracing::debug!(ticker = %ticker, total, kept = items.len(), "news feed mapped");
    Ok(items)
}
