//! AggregationOrchestrator: fan out one request to every section and
//! assemble the results into a [`ResultBundle`].
//!
//! Five independent fetches make up a request: price history, three
//! statement kinds, and news. Metrics are derived from the price section
//! after the fetches are joined. A failing section only marks itself (and,
//! for price, the metrics derived from it); the rest of the bundle is built
//! regardless. No retry, caching, or rate limiting happens here.

use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

use stockdash_core::data::{
    AlphaVantageClient, CircuitBreaker, FundamentalsProvider, NewsProvider, PriceProvider,
    YahooProvider,
};
use stockdash_core::domain::{NewsItem, NormalizedStatement, PriceSeries, StatementKind, Ticker};
use stockdash_core::metrics::ReturnMetrics;
use stockdash_core::{news, price_loader, statements, ProviderError};

use crate::bundle::{RequestKey, ResultBundle, SectionResult, Statements};
use crate::config::{ConfigError, DashboardConfig, FetchMode};
use crate::session::CancelToken;

/// Fetch tasks issued per request in concurrent mode.
const SECTION_TASKS: usize = 5;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("provider setup failed: {0}")]
    Provider(#[from] ProviderError),
    #[error("failed to build fetch thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Raw section outcomes before metrics are derived.
struct Sections {
    price: SectionResult<PriceSeries>,
    balance_sheet: SectionResult<NormalizedStatement>,
    income_statement: SectionResult<NormalizedStatement>,
    cash_flow: SectionResult<NormalizedStatement>,
    news: SectionResult<Vec<NewsItem>>,
}

pub struct Orchestrator {
    price: Arc<dyn PriceProvider>,
    fundamentals: Arc<dyn FundamentalsProvider>,
    news: Arc<dyn NewsProvider>,
    mode: FetchMode,
    pool: Option<rayon::ThreadPool>,
}

impl Orchestrator {
    /// Sequential orchestrator over injected providers.
    pub fn new(
        price: Arc<dyn PriceProvider>,
        fundamentals: Arc<dyn FundamentalsProvider>,
        news: Arc<dyn NewsProvider>,
    ) -> Self {
        Self {
            price,
            fundamentals,
            news,
            mode: FetchMode::Sequential,
            pool: None,
        }
    }

    /// Build the Yahoo and Alpha Vantage clients described by `config`.
    ///
    /// The Alpha Vantage key is read from the environment here; when it is
    /// missing the client is still built and its sections report a
    /// credential error.
    pub fn from_config(config: &DashboardConfig) -> Result<Self, OrchestratorError> {
        config.validate()?;
        let timeout = config.timeout();

        let yahoo = YahooProvider::new(
            config.providers.yahoo_base_url.clone(),
            timeout,
            Arc::new(CircuitBreaker::default_provider()),
        )?;

        let alpha = Arc::new(AlphaVantageClient::new(
            config.providers.alpha_vantage_base_url.clone(),
            timeout,
            config.api_key(),
        )?);
        if !alpha.has_credential() {
            tracing::warn!(
                env = %config.providers.api_key_env,
                "no fundamentals API key set; statements and news will report a credential error"
            );
        }

        Self::new(Arc::new(yahoo), alpha.clone(), alpha).with_fetch_mode(config.fetch.mode)
    }

    /// Replace the price provider (CSV or synthetic data for offline use).
    pub fn with_price_provider(mut self, price: Arc<dyn PriceProvider>) -> Self {
        self.price = price;
        self
    }

    pub fn with_fetch_mode(mut self, mode: FetchMode) -> Result<Self, OrchestratorError> {
        self.pool = match mode {
            FetchMode::Sequential => None,
            FetchMode::Concurrent => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(SECTION_TASKS)
                    .thread_name(|i| format!("stockdash-fetch-{i}"))
                    .build()?,
            ),
        };
        self.mode = mode;
        Ok(self)
    }

    pub fn fetch_mode(&self) -> FetchMode {
        self.mode
    }

    pub fn price_provider_name(&self) -> &str {
        self.price.name()
    }

    /// Build the full bundle for `ticker` over `[start, end]`.
    pub fn build(&self, ticker: &Ticker, start: NaiveDate, end: NaiveDate) -> ResultBundle {
        let Some(sections) = self.fetch_sections(ticker, start, end, None) else {
            unreachable!("sections are only skipped under a cancelled token");
        };
        self.assemble(ticker, start, end, sections)
    }

    /// Like [`build`](Self::build), but every section checks `token` before
    /// fetching. Returns `None` when the request was cancelled; partial
    /// results are discarded.
    pub fn build_cancellable(
        &self,
        ticker: &Ticker,
        start: NaiveDate,
        end: NaiveDate,
        token: &CancelToken,
    ) -> Option<ResultBundle> {
        let sections = self.fetch_sections(ticker, start, end, Some(token));
        if token.is_cancelled() {
            tracing::debug!(ticker = %ticker, "request cancelled, discarding sections");
            return None;
        }
        sections.map(|s| self.assemble(ticker, start, end, s))
    }

    fn fetch_sections(
        &self,
        ticker: &Ticker,
        start: NaiveDate,
        end: NaiveDate,
        token: Option<&CancelToken>,
    ) -> Option<Sections> {
        let live = || token.map_or(true, |t| !t.is_cancelled());

        let price_task = || live().then(|| price_loader::load(self.price.as_ref(), ticker, start, end));
        let statement_task = |kind: StatementKind| {
            live().then(|| statements::fetch_statement(self.fundamentals.as_ref(), ticker, kind))
        };
        let news_task = || live().then(|| news::fetch(self.news.as_ref(), ticker));

        let (mut price, mut balance, mut income, mut cash, mut feed) = (None, None, None, None, None);

        match &self.pool {
            Some(pool) => pool.scope(|s| {
                s.spawn(|_| price = price_task());
                s.spawn(|_| balance = statement_task(StatementKind::BalanceSheet));
                s.spawn(|_| income = statement_task(StatementKind::IncomeStatement));
                s.spawn(|_| cash = statement_task(StatementKind::CashFlow));
                s.spawn(|_| feed = news_task());
            }),
            None => {
                price = price_task();
                balance = statement_task(StatementKind::BalanceSheet);
                income = statement_task(StatementKind::IncomeStatement);
                cash = statement_task(StatementKind::CashFlow);
                feed = news_task();
            }
        }

        Some(Sections {
            price: price?,
            balance_sheet: balance?,
            income_statement: income?,
            cash_flow: cash?,
            news: feed?,
        })
    }

    fn assemble(
        &self,
        ticker: &Ticker,
        start: NaiveDate,
        end: NaiveDate,
        sections: Sections,
    ) -> ResultBundle {
        let return_metrics = match &sections.price {
            Ok(series) => Ok(ReturnMetrics::compute(series)),
            Err(e) => Err(e.clone()),
        };

        let bundle = ResultBundle {
            key: RequestKey::new(ticker.clone(), start, end),
            price_series: sections.price,
            return_metrics,
            statements: Statements {
                balance_sheet: sections.balance_sheet,
                income_statement: sections.income_statement,
                cash_flow: sections.cash_flow,
            },
            news: sections.news,
        };

        let errors = bundle.errors();
        for (section, err) in &errors {
            tracing::warn!(ticker = %ticker, section, error = %err, "section failed");
        }
        tracing::info!(
            ticker = %ticker,
            %start,
            %end,
            mode = ?self.mode,
            failed_sections = errors.len(),
            "bundle built"
        );
        bundle
    }
}
