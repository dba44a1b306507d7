//! StockDash CLI: price, fundamentals, and news views for one ticker.
//!
//! Commands:
//! - `show`: build the full result bundle and render every section
//! - `metrics`: offline return metrics from a CSV price file

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use stockdash_core::data::{CsvPriceProvider, SyntheticPriceProvider};
use stockdash_core::domain::{NewsItem, NormalizedStatement, PriceSeries, Ticker};
use stockdash_core::metrics::ReturnMetrics;
use stockdash_core::{price_loader, DataError};
use stockdash_runner::{DashboardConfig, FetchMode, Orchestrator, ResultBundle};

const TICKER_PROMPT: &str = "Enter a ticker symbol (e.g. MSFT) to load the dashboard.";

#[derive(Parser)]
#[command(
    name = "stockdash",
    about = "StockDash CLI: price history, return metrics, financial statements, and news"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every section for a ticker and render it.
    Show {
        /// Ticker symbol (case-insensitive).
        ticker: Option<String>,

        /// Start date (YYYY-MM-DD). Defaults to one year ago.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Read prices from <DIR>/<TICKER>.csv instead of Yahoo.
        #[arg(long, conflicts_with = "synthetic")]
        csv_dir: Option<PathBuf>,

        /// Use deterministic synthetic prices instead of Yahoo.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Fetch sections concurrently, overriding the config file.
        #[arg(long, default_value_t = false)]
        concurrent: bool,

        /// Print the bundle as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Compute return metrics offline from <DIR>/<TICKER>.csv.
    Metrics {
        ticker: String,

        /// Directory containing the CSV file.
        #[arg(long, default_value = "data")]
        csv_dir: PathBuf,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // A missing .env file is normal.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("stockdash=info,stockdash_core=info,stockdash_runner=info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show {
            ticker,
            start,
            end,
            config,
            csv_dir,
            synthetic,
            concurrent,
            json,
        } => run_show(ShowArgs {
            ticker,
            start,
            end,
            config,
            csv_dir,
            synthetic,
            concurrent,
            json,
        }),
        Commands::Metrics {
            ticker,
            csv_dir,
            start,
            end,
            json,
        } => run_metrics(&ticker, csv_dir, start, end, json),
    }
}

struct ShowArgs {
    ticker: Option<String>,
    start: Option<String>,
    end: Option<String>,
    config: Option<PathBuf>,
    csv_dir: Option<PathBuf>,
    synthetic: bool,
    concurrent: bool,
    json: bool,
}

/// `None` when the user gave no usable ticker; the caller prompts instead.
fn parse_ticker(raw: Option<&str>) -> Result<Option<Ticker>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Ok(Some(Ticker::parse(s)?)),
    }
}

fn parse_range(start: Option<&str>, end: Option<&str>) -> Result<(NaiveDate, NaiveDate)> {
    let parse = |s: &str| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
    };
    let end = end
        .map(parse)
        .transpose()?
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let start = start
        .map(parse)
        .transpose()?
        .unwrap_or_else(|| end - chrono::Duration::days(365));
    Ok((start, end))
}

fn run_show(args: ShowArgs) -> Result<()> {
    let Some(ticker) = parse_ticker(args.ticker.as_deref())? else {
        println!("{TICKER_PROMPT}");
        return Ok(());
    };
    let (start, end) = parse_range(args.start.as_deref(), args.end.as_deref())?;

    let mut config = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    if args.concurrent {
        config.fetch.mode = FetchMode::Concurrent;
    }

    let mut orchestrator = Orchestrator::from_config(&config)?;
    if let Some(dir) = args.csv_dir {
        orchestrator = orchestrator.with_price_provider(Arc::new(CsvPriceProvider::new(dir)));
    } else if args.synthetic {
        orchestrator = orchestrator.with_price_provider(Arc::new(SyntheticPriceProvider::new()));
    }

    tracing::debug!(
        ticker = %ticker,
        price_source = orchestrator.price_provider_name(),
        mode = ?orchestrator.fetch_mode(),
        "building dashboard"
    );
    let bundle = orchestrator.build(&ticker, start, end);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&bundle)?);
    } else {
        print_bundle(&bundle, orchestrator.price_provider_name());
    }
    Ok(())
}

fn run_metrics(
    ticker: &str,
    csv_dir: PathBuf,
    start: Option<String>,
    end: Option<String>,
    json: bool,
) -> Result<()> {
    let Some(ticker) = parse_ticker(Some(ticker))? else {
        println!("{TICKER_PROMPT}");
        return Ok(());
    };
    let (start, end) = parse_range(start.as_deref(), end.as_deref())?;

    let provider = CsvPriceProvider::new(csv_dir);
    let series = price_loader::load(&provider, &ticker, start, end)?;
    let metrics = ReturnMetrics::compute(&series);

    if json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
    } else {
        print_summary(&series, &metrics);
    }
    Ok(())
}

// ── Rendering ────────────────────────────────────────────────────────

fn print_section_error(section: &str, err: &DataError) {
    println!("[{section} unavailable] {err}");
    if err.is_credential() {
        println!("  hint: set the API key environment variable named in the config (see .env)");
    } else if err.is_transient() {
        println!("  hint: temporary provider problem, try again later");
    }
}

fn print_bundle(bundle: &ResultBundle, price_source: &str) {
    println!();
    println!(
        "=== {} | {} to {} ===",
        bundle.key.ticker, bundle.key.start, bundle.key.end
    );

    println!();
    println!("--- Price History ({price_source}) ---");
    match (&bundle.price_series, &bundle.return_metrics) {
        (Ok(series), Ok(metrics)) => {
            print_price_table(series, metrics);
            println!();
            print_summary(series, metrics);
        }
        (Err(e), _) | (_, Err(e)) => print_section_error("price", e),
    }

    for (kind, section) in bundle.statements.iter() {
        println!();
        println!("--- {kind} ---");
        match section {
            Ok(stmt) => print_statement(stmt),
            Err(e) => print_section_error(kind.label(), e),
        }
    }

    println!();
    println!("--- News ---");
    match &bundle.news {
        Ok(items) if items.is_empty() => println!("No news items."),
        Ok(items) => print_news(items),
        Err(e) => print_section_error("news", e),
    }
    println!();
}

fn print_price_table(series: &PriceSeries, metrics: &ReturnMetrics) {
    println!("{:<12} {:>12} {:>10}", "Date", "Adj Close", "Change");
    println!("{}", "-".repeat(36));
    for (bar, change) in series.bars().iter().zip(&metrics.percent_change) {
        let change = change.map_or_else(|| "-".to_string(), |c| format!("{:+.2}%", c * 100.0));
        println!("{:<12} {:>12.2} {:>10}", bar.date, bar.adj_close, change);
    }
}

fn print_summary(series: &PriceSeries, metrics: &ReturnMetrics) {
    println!("Ticker:           {}", series.ticker());
    if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
        println!("Period:           {first} to {last}");
    }
    println!("Bars:             {}", series.len());
    println!("Data Hash:        {}", &series.content_hash()[..16]);
    println!("Annual Return:    {:.2}%", metrics.annualized_return_pct);
    println!("Annual Std Dev:   {:.2}%", metrics.annualized_stdev_pct);
    println!("Risk-Adj Return:  {}", metrics.risk_adjusted_return);
}

fn print_statement(stmt: &NormalizedStatement) {
    let periods: Vec<&str> = stmt.period_labels().collect();
    let item_width = stmt
        .headers()
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max("Line Item".len());

    print!("{:<item_width$}", "Line Item");
    for p in &periods {
        print!(" {p:>18}");
    }
    println!();
    println!("{}", "-".repeat(item_width + periods.len() * 19));

    for item in stmt.headers() {
        print!("{item:<item_width$}");
        for p in &periods {
            let cell = stmt
                .value(p, item)
                .map_or_else(String::new, |v| v.to_string());
            print!(" {cell:>18}");
        }
        println!();
    }
}

fn print_news(items: &[NewsItem]) {
    for (i, item) in items.iter().enumerate() {
        println!("{:>2}. [{}] {}", i + 1, item.published_at, item.title);
        println!(
            "    sentiment: title {:+.3}, summary {:+.3}",
            item.title_sentiment, item.summary_sentiment
        );
        if !item.summary.is_empty() {
            println!("    {}", item.summary);
        }
    }
}
