//! Financial statement types: kinds, cell values, and the normalized table.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three standard annual financial reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    BalanceSheet,
    IncomeStatement,
    CashFlow,
}

impl StatementKind {
    pub const ALL: [StatementKind; 3] = [
        StatementKind::BalanceSheet,
        StatementKind::IncomeStatement,
        StatementKind::CashFlow,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatementKind::BalanceSheet => "Balance Sheet",
            StatementKind::IncomeStatement => "Income Statement",
            StatementKind::CashFlow => "Cash Flow Statement",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A statement cell: a number when the provider's value parses as one,
/// otherwise the raw provider text (e.g. `"None"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatementValue {
    Number(f64),
    Raw(String),
}

impl StatementValue {
    /// Classify a provider string.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => StatementValue::Number(n),
            _ => StatementValue::Raw(raw.to_string()),
        }
    }

    /// Text form used when a cell becomes a header or a period label.
    pub fn to_label(&self) -> String {
        match self {
            StatementValue::Number(n) => n.to_string(),
            StatementValue::Raw(s) => s.clone(),
        }
    }
}

impl From<&str> for StatementValue {
    fn from(s: &str) -> Self {
        StatementValue::Raw(s.to_string())
    }
}

impl From<f64> for StatementValue {
    fn from(n: f64) -> Self {
        StatementValue::Number(n)
    }
}

impl fmt::Display for StatementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementValue::Number(n) => write!(f, "{n}"),
            StatementValue::Raw(s) => f.write_str(s),
        }
    }
}

/// Period-indexed line-item table.
///
/// Periods keep provider order (most recent first for annual reports); each
/// period maps every header, in header order, to its value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedStatement {
    headers: Vec<String>,
    periods: IndexMap<String, IndexMap<String, StatementValue>>,
}

impl NormalizedStatement {
    pub(crate) fn from_parts(
        headers: Vec<String>,
        periods: IndexMap<String, IndexMap<String, StatementValue>>,
    ) -> Self {
        Self { headers, periods }
    }

    /// Line-item names, in provider order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn period_labels(&self) -> impl Iterator<Item = &str> {
        self.periods.keys().map(String::as_str)
    }

    pub fn period_count(&self) -> usize {
        self.periods.len()
    }

    pub fn period(&self, label: &str) -> Option<&IndexMap<String, StatementValue>> {
        self.periods.get(label)
    }

    pub fn value(&self, period: &str, line_item: &str) -> Option<&StatementValue> {
        self.periods.get(period).and_then(|items| items.get(line_item))
    }

    pub fn periods(&self) -> impl Iterator<Item = (&str, &IndexMap<String, StatementValue>)> {
        self.periods.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_numbers_and_raw_text() {
        assert_eq!(StatementValue::parse("1234"), StatementValue::Number(1234.0));
        assert_eq!(StatementValue::parse("-5.5"), StatementValue::Number(-5.5));
        assert_eq!(StatementValue::parse("None"), StatementValue::Raw("None".into()));
        assert_eq!(StatementValue::parse("USD"), StatementValue::Raw("USD".into()));
    }

    #[test]
    fn non_finite_text_stays_raw() {
        assert_eq!(StatementValue::parse("NaN"), StatementValue::Raw("NaN".into()));
        assert_eq!(StatementValue::parse("inf"), StatementValue::Raw("inf".into()));
    }

    #[test]
    fn untagged_serialization() {
        let json = serde_json::to_string(&vec![
            StatementValue::Number(1.5),
            StatementValue::Raw("None".into()),
        ])
        .unwrap();
        assert_eq!(json, "[1.5,\"None\"]");
    }

    #[test]
    fn kinds_cover_all_three_reports() {
        assert_eq!(StatementKind::ALL.len(), 3);
        assert_eq!(StatementKind::CashFlow.to_string(), "Cash Flow Statement");
    }
}
