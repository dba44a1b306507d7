//! NewsItem: one sentiment-scored headline.

use serde::{Deserialize, Serialize};

use crate::data::provider::FeedRow;

/// A news item as exposed to the presentation layer.
///
/// Sentiment scores are polarity values attached by the news provider; the
/// core does not rescore text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub published_at: String,
    pub title: String,
    pub summary: String,
    pub title_sentiment: f64,
    pub summary_sentiment: f64,
}

impl From<FeedRow> for NewsItem {
    fn from(row: FeedRow) -> Self {
        Self {
            published_at: row.published,
            title: row.title,
            summary: row.summary,
            title_sentiment: row.sentiment_title,
            summary_sentiment: row.sentiment_summary,
        }
    }
}
