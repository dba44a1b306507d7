//! CSV price provider: offline daily bars from `<dir>/<SYMBOL>.csv`.
//!
//! Accepts both snake_case headers (`date,open,high,low,close,adj_close,volume`)
//! and the column names of a yfinance export (`Date,Open,...,Adj Close,Volume`).

use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::provider::{DataError, PriceProvider, ProviderError, RawBar};

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date")]
    date: NaiveDate,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(alias = "Adj Close", alias = "adjusted_close")]
    adj_close: f64,
    #[serde(alias = "Volume")]
    volume: f64,
}

pub struct CsvPriceProvider {
    dir: PathBuf,
}

impl CsvPriceProvider {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol.to_ascii_uppercase()))
    }
}

impl PriceProvider for CsvPriceProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::unavailable(
                symbol,
                format!("no CSV file at {}", path.display()),
            ));
        }

        let mut reader = csv::Reader::from_path(&path).map_err(|e| {
            ProviderError::ResponseFormatChanged(format!("{}: {e}", path.display()))
        })?;

        let mut bars = Vec::new();
        for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row = row.map_err(|e| {
                ProviderError::ResponseFormatChanged(format!(
                    "{} row {}: {e}",
                    path.display(),
                    line + 1
                ))
            })?;
            if row.date < start || row.date > end {
                continue;
            }
            bars.push(RawBar {
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                adj_close: row.adj_close,
                volume: if row.volume.is_finite() && row.volume > 0.0 {
                    row.volume.round() as u64
                } else {
                    0
                },
            });
        }

        tracing::debug!(symbol, rows = bars.len(), path = %path.display(), "csv bars read");
        Ok(bars)
    }
}
