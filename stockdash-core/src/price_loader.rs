//! PriceSeriesLoader: fetch and validate a daily price series.
//!
//! The loader owns the checks that turn raw provider rows into a
//! [`PriceSeries`]: range validation before any fetch, dropping rows whose
//! adjusted close cannot anchor a return, and mapping "nothing left" to
//! `DataUnavailable`. It never retries.

use chrono::NaiveDate;

use crate::data::provider::{DataError, PriceProvider};
use crate::domain::{PriceBar, PriceSeries, Ticker};

/// Load `[start, end]` for `ticker` from `provider`.
pub fn load(
    provider: &dyn PriceProvider,
    ticker: &Ticker,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, DataError> {
    if start > end {
        return Err(DataError::InvalidRange { start, end });
    }

    let raw = provider.fetch(ticker.as_str(), start, end)?;
    if raw.is_empty() {
        return Err(DataError::unavailable(
            ticker.as_str(),
            format!("{} returned no rows for {start}..={end}", provider.name()),
        ));
    }

    let fetched = raw.len();
    let bars: Vec<PriceBar> = raw
        .into_iter()
        .map(PriceBar::from)
        .filter(PriceBar::has_usable_adj_close)
        .collect();

    let dropped = fetched - bars.len();
    if dropped > 0 {
        tracing::warn!(
            ticker = %ticker,
            dropped,
            fetched,
            "dropped bars without a usable adjusted close"
        );
    }

    let series = PriceSeries::new(ticker.clone(), start, end, bars);
    if series.is_empty() {
        return Err(DataError::unavailable(
            ticker.as_str(),
            "no usable bars in requested range",
        ));
    }

    tracing::debug!(ticker = %ticker, bars = series.len(), "price series loaded");
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::{ProviderError, RawBar};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedProvider {
        result: Result<Vec<RawBar>, DataError>,
        calls: AtomicUsize,
    }

    impl FixedProvider {
        fn new(result: Result<Vec<RawBar>, DataError>) -> Self {
            Self {
                result,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl PriceProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn fetch(&self, _: &str, _: NaiveDate, _: NaiveDate) -> Result<Vec<RawBar>, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn raw(day: u32, adj: f64) -> RawBar {
        RawBar {
            date: d(day),
            open: adj,
            high: adj,
            low: adj,
            close: adj,
            adj_close: adj,
            volume: 10,
        }
    }

    fn spy() -> Ticker {
        Ticker::parse("SPY").unwrap()
    }

    #[test]
    fn inverted_range_rejected_before_fetch() {
        let provider = FixedProvider::new(Ok(vec![raw(2, 1.0)]));
        let err = load(&provider, &spy(), d(10), d(1)).unwrap_err();
        assert_eq!(err, DataError::InvalidRange { start: d(10), end: d(1) });
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_provider_result_is_unavailable() {
        let provider = FixedProvider::new(Ok(vec![]));
        let err = load(&provider, &spy(), d(1), d(31)).unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable { .. }));
    }

    #[test]
    fn rows_without_adj_close_are_dropped() {
        let provider = FixedProvider::new(Ok(vec![raw(2, 100.0), raw(3, f64::NAN), raw(4, 101.0)]));
        let series = load(&provider, &spy(), d(1), d(31)).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn only_unusable_rows_is_unavailable() {
        let provider = FixedProvider::new(Ok(vec![raw(2, 0.0), raw(3, f64::NAN)]));
        let err = load(&provider, &spy(), d(1), d(31)).unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable { .. }));
    }

    #[test]
    fn provider_errors_propagate_unchanged() {
        let failure = DataError::Provider(ProviderError::NetworkUnreachable("down".into()));
        let provider = FixedProvider::new(Err(failure.clone()));
        assert_eq!(load(&provider, &spy(), d(1), d(31)).unwrap_err(), failure);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn result_is_ordered_and_unique() {
        let provider = FixedProvider::new(Ok(vec![raw(4, 3.0), raw(2, 1.0), raw(4, 4.0)]));
        let series = load(&provider, &spy(), d(1), d(31)).unwrap();
        let closes: Vec<f64> = series.adjusted_closes().collect();
        assert_eq!(closes, vec![1.0, 4.0]);
    }
}
