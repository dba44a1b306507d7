//! PriceBar and PriceSeries: the daily price history of one ticker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ticker::Ticker;
use crate::data::provider::RawBar;

/// Daily OHLCV bar with the dividend/split adjusted close.
///
/// Return calculations use `adj_close`; the other fields are kept for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: u64,
}

impl PriceBar {
    /// Returns true if the adjusted close can be used as a return base.
    pub fn has_usable_adj_close(&self) -> bool {
        self.adj_close.is_finite() && self.adj_close > 0.0
    }
}

impl From<RawBar> for PriceBar {
    fn from(raw: RawBar) -> Self {
        Self {
            date: raw.date,
            open: raw.open,
            high: raw.high,
            low: raw.low,
            close: raw.close,
            adj_close: raw.adj_close,
            volume: raw.volume,
        }
    }
}

/// Ordered daily bars for one ticker over the inclusive range `[start, end]`.
///
/// Bars are ascending by date and dates are unique. The series is immutable
/// once built; an empty series is a valid value. Deserialized series go
/// through [`PriceSeries::new`] as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SeriesParts")]
pub struct PriceSeries {
    ticker: Ticker,
    start: NaiveDate,
    end: NaiveDate,
    bars: Vec<PriceBar>,
}

#[derive(Deserialize)]
struct SeriesParts {
    ticker: Ticker,
    start: NaiveDate,
    end: NaiveDate,
    bars: Vec<PriceBar>,
}

impl From<SeriesParts> for PriceSeries {
    fn from(parts: SeriesParts) -> Self {
        Self::new(parts.ticker, parts.start, parts.end, parts.bars)
    }
}

impl PriceSeries {
    /// Build a series, enforcing order and date uniqueness.
    ///
    /// Bars are stably sorted by date; when a date repeats the last bar
    /// delivered wins. Bars outside `[start, end]` are discarded, and an
    /// inverted range yields an empty series.
    pub fn new(ticker: Ticker, start: NaiveDate, end: NaiveDate, mut bars: Vec<PriceBar>) -> Self {
        if start > end {
            return Self::empty(ticker, start, end);
        }
        bars.retain(|b| b.date >= start && b.date <= end);
        bars.sort_by_key(|b| b.date);

        let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }

        Self {
            ticker,
            start,
            end,
            bars: deduped,
        }
    }

    pub fn empty(ticker: Ticker, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            ticker,
            start,
            end,
            bars: Vec::new(),
        }
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn adjusted_closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.bars.iter().map(|b| b.adj_close)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Deterministic BLAKE3 hash over the ticker and every bar.
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.ticker.as_str().as_bytes());
        for bar in &self.bars {
            hasher.update(bar.date.to_string().as_bytes());
            hasher.update(&bar.open.to_le_bytes());
            hasher.update(&bar.high.to_le_bytes());
            hasher.update(&bar.low.to_le_bytes());
            hasher.update(&bar.close.to_le_bytes());
            hasher.update(&bar.adj_close.to_le_bytes());
            hasher.update(&bar.volume.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}
