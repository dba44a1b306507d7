//! Ticker symbol: the one user-supplied identifier every request carries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickerError {
    #[error("ticker symbol is empty")]
    Empty,

    #[error("ticker symbol '{0}' contains whitespace")]
    Whitespace(String),
}

/// A validated, upper-cased ticker symbol.
///
/// Symbols are case-insensitive, so `msft` and `MSFT` compare equal once
/// parsed. An empty ticker cannot be constructed; callers must prompt for
/// input instead of building a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(raw: &str) -> Result<Self, TickerError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TickerError::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(TickerError::Whitespace(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ticker {
    type Err = TickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = TickerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(t: Ticker) -> Self {
        t.0
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
