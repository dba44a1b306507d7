//! ResultBundle: the aggregated outcome of one dashboard request.
//!
//! Every section carries its own `Result`, so one failing provider never
//! hides the sections that succeeded.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockdash_core::domain::{NewsItem, NormalizedStatement, PriceSeries, StatementKind, Ticker};
use stockdash_core::metrics::ReturnMetrics;
use stockdash_core::DataError;

/// Identity of a request: the memo key and the label of a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    pub ticker: Ticker,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl RequestKey {
    pub fn new(ticker: Ticker, start: NaiveDate, end: NaiveDate) -> Self {
        Self { ticker, start, end }
    }
}

pub type SectionResult<T> = Result<T, DataError>;

/// The three statement sections, each independently fallible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statements {
    pub balance_sheet: SectionResult<NormalizedStatement>,
    pub income_statement: SectionResult<NormalizedStatement>,
    pub cash_flow: SectionResult<NormalizedStatement>,
}

impl Statements {
    pub fn get(&self, kind: StatementKind) -> &SectionResult<NormalizedStatement> {
        match kind {
            StatementKind::BalanceSheet => &self.balance_sheet,
            StatementKind::IncomeStatement => &self.income_statement,
            StatementKind::CashFlow => &self.cash_flow,
        }
    }

    /// Statements in [`StatementKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (StatementKind, &SectionResult<NormalizedStatement>)> {
        StatementKind::ALL.into_iter().map(move |k| (k, self.get(k)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultBundle {
    pub key: RequestKey,
    pub price_series: SectionResult<PriceSeries>,
    pub return_metrics: SectionResult<ReturnMetrics>,
    pub statements: Statements,
    pub news: SectionResult<Vec<NewsItem>>,
}

impl ResultBundle {
    /// Every section error paired with a section name, in display order.
    pub fn errors(&self) -> Vec<(&'static str, &DataError)> {
        let mut out = Vec::new();
        if let Err(e) = &self.price_series {
            out.push(("price_series", e));
        }
        if let Err(e) = &self.return_metrics {
            out.push(("return_metrics", e));
        }
        for (kind, section) in self.statements.iter() {
            if let Err(e) = section {
                out.push((statement_section_name(kind), e));
            }
        }
        if let Err(e) = &self.news {
            out.push(("news", e));
        }
        out
    }

    pub fn is_complete(&self) -> bool {
        self.errors().is_empty()
    }

    /// True when any section failed for a reason a later retry may fix.
    pub fn has_transient_error(&self) -> bool {
        self.errors().iter().any(|(_, e)| e.is_transient())
    }
}

pub fn statement_section_name(kind: StatementKind) -> &'static str {
    match kind {
        StatementKind::BalanceSheet => "balance_sheet",
        StatementKind::IncomeStatement => "income_statement",
        StatementKind::CashFlow => "cash_flow",
    }
}
