//! Domain types: tickers, price bars and series, statements, news items.

pub mod bar;
pub mod news;
pub mod statement;
pub mod ticker;

pub use bar::{PriceBar, PriceSeries};
pub use news::NewsItem;
pub use statement::{NormalizedStatement, StatementKind, StatementValue};
pub use ticker::{Ticker, TickerError};
