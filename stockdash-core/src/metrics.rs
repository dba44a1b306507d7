//! Return metrics: pure functions over a price series.
//!
//! Every statistic here is a pure function of the adjusted closes: no I/O, no
//! hidden state, identical input gives bit-identical output.
//!
//! Conventions are fixed for parity with the dashboard's published numbers:
//! 252 trading days per year and the population (not sample) standard
//! deviation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::PriceSeries;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Annualized return divided by annualized volatility.
///
/// `Undefined` is a distinct state for zero volatility, so callers render it
/// specially instead of printing NaN or infinity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum RiskAdjustedReturn {
    Defined(f64),
    Undefined,
}

impl RiskAdjustedReturn {
    pub fn value(self) -> Option<f64> {
        match self {
            RiskAdjustedReturn::Defined(v) => Some(v),
            RiskAdjustedReturn::Undefined => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, RiskAdjustedReturn::Defined(_))
    }
}

impl fmt::Display for RiskAdjustedReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskAdjustedReturn::Defined(v) => write!(f, "{v:.2}"),
            RiskAdjustedReturn::Undefined => f.write_str("undefined (zero volatility)"),
        }
    }
}

/// Percent-change series and annualized summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnMetrics {
    /// One entry per bar; the first is always `None`.
    pub percent_change: Vec<Option<f64>>,
    pub annualized_return_pct: f64,
    pub annualized_stdev_pct: f64,
    pub risk_adjusted_return: RiskAdjustedReturn,
}

impl ReturnMetrics {
    pub fn compute(series: &PriceSeries) -> Self {
        let closes: Vec<f64> = series.adjusted_closes().collect();
        Self::from_adjusted_closes(&closes)
    }

    pub fn from_adjusted_closes(closes: &[f64]) -> Self {
        let percent_change = percent_change(closes);
        let returns: Vec<f64> = percent_change.iter().flatten().copied().collect();

        let annualized_return_pct = mean(&returns) * TRADING_DAYS_PER_YEAR * 100.0;
        let annualized_stdev_pct = population_std_dev(&returns) * TRADING_DAYS_PER_YEAR.sqrt() * 100.0;

        let risk_adjusted_return = if annualized_stdev_pct > 0.0 {
            RiskAdjustedReturn::Defined(annualized_return_pct / annualized_stdev_pct)
        } else {
            RiskAdjustedReturn::Undefined
        };

        Self {
            percent_change,
            annualized_return_pct,
            annualized_stdev_pct,
            risk_adjusted_return,
        }
    }

    /// Number of defined daily returns that fed the statistics.
    pub fn observation_count(&self) -> usize {
        self.percent_change.iter().filter(|p| p.is_some()).count()
    }
}

// ─── Individual functions ───────────────────────────────────────────

/// Day-over-day fractional change of each value.
///
/// Entry 0 is `None`. A change whose base is zero or non-finite is `None`
/// as well, so it never poisons the aggregates.
pub fn percent_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(None);
    for w in values.windows(2) {
        let change = (w[1] - w[0]) / w[0];
        out.push(change.is_finite().then_some(change));
    }
    out
}

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divide by n); 0.0 for an empty slice.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}
