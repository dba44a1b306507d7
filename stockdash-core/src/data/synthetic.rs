//! Synthetic price provider for demos and offline development.
//!
//! Produces a deterministic random walk from 100.0 seeded by the symbol, so
//! the same request always yields the same bars. Weekends are skipped.
//! Output is clearly fake and the provider name says so.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, PriceProvider, RawBar};

#[derive(Debug, Default, Clone, Copy)]
pub struct SyntheticPriceProvider;

impl SyntheticPriceProvider {
    pub fn new() -> Self {
        Self
    }

    /// Generate bars for `[start, end]`, seeded from the upper-cased symbol.
    pub fn generate(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<RawBar> {
        let seed = blake3::hash(symbol.to_ascii_uppercase().as_bytes());
        let mut rng = StdRng::from_seed(*seed.as_bytes());

        let mut bars = Vec::new();
        let mut price = 100.0_f64;
        let mut current = start;

        while current <= end {
            if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                current += chrono::Duration::days(1);
                continue;
            }

            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000u64);

            bars.push(RawBar {
                date: current,
                open,
                high,
                low,
                close,
                adj_close: close,
                volume,
            });

            price = close;
            current += chrono::Duration::days(1);
        }

        bars
    }
}

impl PriceProvider for SyntheticPriceProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        Ok(Self::generate(symbol, start, end))
    }
}
