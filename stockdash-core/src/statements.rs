//! StatementNormalizer: reshape a pivoted provider table into a
//! period-indexed line-item table.
//!
//! The same reshaping applies to every statement kind:
//!
//! 1. transpose, so each raw column becomes a row labelled with its column name;
//! 2. take the values of transposed row 0 as headers (line-item names);
//! 3. drop transposed rows 0 and 1 (headers and reporting metadata);
//! 4. every remaining row is one fiscal period keyed by its label.
//!
//! The structural precondition is asserted, never assumed: a table that does
//! not have at least one period row after the two metadata rows, or whose
//! shape is otherwise inconsistent, fails with `MalformedStatement` rather
//! than producing a partial table.

use indexmap::{IndexMap, IndexSet};

use crate::data::provider::{DataError, FundamentalsProvider, ProviderTable};
use crate::domain::statement::{NormalizedStatement, StatementKind, StatementValue};
use crate::domain::Ticker;

/// Rows consumed by headers and metadata before the first period.
const METADATA_ROWS: usize = 2;

/// A column of the raw table viewed as a row.
#[derive(Debug, Clone, PartialEq)]
pub struct TransposedRow<'a> {
    pub label: &'a str,
    pub values: Vec<&'a StatementValue>,
}

/// Transpose a provider table, checking that it is rectangular.
pub fn transpose(raw: &ProviderTable) -> Result<Vec<TransposedRow<'_>>, DataError> {
    let width = raw.columns.len();
    if let Some((i, row)) = raw.rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(DataError::MalformedStatement(format!(
            "row {i} has {} cells, expected {width}",
            row.len()
        )));
    }

    Ok(raw
        .columns
        .iter()
        .enumerate()
        .map(|(j, label)| TransposedRow {
            label: label.as_str(),
            values: raw.rows.iter().map(|r| &r[j]).collect(),
        })
        .collect())
}

/// Normalize one raw statement table.
pub fn normalize(raw: &ProviderTable) -> Result<NormalizedStatement, DataError> {
    let transposed = transpose(raw)?;
    if transposed.len() <= METADATA_ROWS {
        return Err(DataError::MalformedStatement(format!(
            "expected at least {} rows after transpose, got {}",
            METADATA_ROWS + 1,
            transposed.len()
        )));
    }

    let mut seen = IndexSet::with_capacity(transposed[0].values.len());
    for header in transposed[0].values.iter().map(|v| v.to_label()) {
        if !seen.insert(header.clone()) {
            return Err(DataError::MalformedStatement(format!(
                "duplicate line item '{header}'"
            )));
        }
    }
    let headers: Vec<String> = seen.into_iter().collect();

    let mut periods = IndexMap::with_capacity(transposed.len() - METADATA_ROWS);
    for row in &transposed[METADATA_ROWS..] {
        let items: IndexMap<String, StatementValue> = headers
            .iter()
            .cloned()
            .zip(row.values.iter().map(|v| (*v).clone()))
            .collect();
        if periods.insert(row.label.to_string(), items).is_some() {
            return Err(DataError::MalformedStatement(format!(
                "duplicate period '{}'",
                row.label
            )));
        }
    }

    Ok(NormalizedStatement::from_parts(headers, periods))
}

/// Fetch one statement kind from `provider` and normalize it.
pub fn fetch_statement(
    provider: &dyn FundamentalsProvider,
    ticker: &Ticker,
    kind: StatementKind,
) -> Result<NormalizedStatement, DataError> {
    let raw = provider.fetch_statement(ticker.as_str(), kind)?;
    let statement = normalize(&raw).map_err(|e| {
        tracing::warn!(ticker = %ticker, %kind, error = %e, "statement failed to normalize");
        e
    })?;
    tracing::debug!(
        ticker = %ticker,
        %kind,
        periods = statement.period_count(),
        line_items = statement.headers().len(),
        "statement normalized"
    );
    Ok(statement)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(s: &str) -> StatementValue {
        StatementValue::Raw(s.into())
    }

    /// Two line items, two metadata columns, three periods.
    fn well_formed() -> ProviderTable {
        ProviderTable::new(
            vec![
                "lineItem".into(),
                "reportedCurrency".into(),
                "2023-12-31".into(),
                "2022-12-31".into(),
                "2021-12-31".into(),
            ],
            vec![
                vec![raw("totalAssets"), raw("USD"), 30.0.into(), 20.0.into(), 10.0.into()],
                vec![raw("goodwill"), raw("USD"), 3.0.into(), raw("None"), 1.0.into()],
            ],
        )
    }

    #[test]
    fn five_transposed_rows_yield_three_periods() {
        let table = well_formed();
        assert_eq!(transpose(&table).unwrap().len(), 5);

        let stmt = normalize(&table).unwrap();
        assert_eq!(stmt.period_count(), 3);
        assert_eq!(stmt.headers(), ["totalAssets", "goodwill"]);
        let labels: Vec<&str> = stmt.period_labels().collect();
        assert_eq!(labels, ["2023-12-31", "2022-12-31", "2021-12-31"]);
        assert_eq!(
            stmt.value("2022-12-31", "totalAssets"),
            Some(&StatementValue::Number(20.0))
        );
        assert_eq!(stmt.value("2022-12-31", "goodwill"), Some(&raw("None")));
    }

    #[test]
    fn metadata_rows_are_dropped() {
        let stmt = normalize(&well_formed()).unwrap();
        assert!(stmt.period("lineItem").is_none());
        assert!(stmt.period("reportedCurrency").is_none());
    }

    #[test]
    fn two_rows_is_malformed() {
        let table = ProviderTable::new(
            vec!["lineItem".into(), "reportedCurrency".into()],
            vec![vec![raw("totalAssets"), raw("USD")]],
        );
        assert!(matches!(normalize(&table), Err(DataError::MalformedStatement(_))));
    }

    #[test]
    fn empty_table_is_malformed() {
        let table = ProviderTable::new(vec![], vec![]);
        assert!(matches!(normalize(&table), Err(DataError::MalformedStatement(_))));
    }

    #[test]
    fn ragged_rows_are_malformed() {
        let mut table = well_formed();
        table.rows[1].pop();
        let err = normalize(&table).unwrap_err();
        assert_eq!(
            err,
            DataError::MalformedStatement("row 1 has 4 cells, expected 5".into())
        );
    }

    #[test]
    fn duplicate_periods_are_malformed() {
        let mut table = well_formed();
        table.columns[4] = "2022-12-31".into();
        assert!(matches!(normalize(&table), Err(DataError::MalformedStatement(_))));
    }

    #[test]
    fn duplicate_headers_are_malformed() {
        let mut table = well_formed();
        table.rows[1][0] = raw("totalAssets");
        assert!(matches!(normalize(&table), Err(DataError::MalformedStatement(_))));
    }

    #[test]
    fn no_line_items_gives_empty_periods() {
        let table = ProviderTable::new(
            vec!["lineItem".into(), "reportedCurrency".into(), "2023-12-31".into()],
            vec![],
        );
        let stmt = normalize(&table).unwrap();
        assert_eq!(stmt.period_count(), 1);
        assert!(stmt.headers().is_empty());
    }
}
