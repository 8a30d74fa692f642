//! Error types for SQL parsing.
//!
//! # Error Handling Strategy
//!
//! Only table extraction parses SQL. Everything else in this crate works on the
//! query text lexically and degrades to a passthrough on malformed input:
//!
//! - [`ParseError`]: the SQL could not be parsed. Table extraction logs it and
//!   falls back to a lexical scan, so it never stops interpolation by itself.
//!
//! - [`crate::templater::EngineError`]: the two conditions that must stop a query
//!   from running (unknown target table, filters on a data source that forbids them).

use crate::types::Dialect;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Error encountered during SQL parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Human-readable error message.
    pub message: String,
    /// Where the parser gave up, if it said so.
    pub position: Option<Position>,
    /// The SQL dialect being parsed when the error occurred.
    pub dialect: Option<Dialect>,
}

/// Position information for a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        let position = position_from_message(&message);
        Self {
            message,
            position,
            dialect: None,
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }
}

/// Reads `Line: X, Column: Y` out of a sqlparser error message.
fn position_from_message(message: &str) -> Option<Position> {
    static POSITION_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = POSITION_REGEX.get_or_init(|| {
        Regex::new(r"Line:\s*(\d+)\s*,\s*Column:\s*(\d+)").expect("Invalid regex pattern")
    });

    let caps = re.captures(message)?;
    Some(Position {
        line: caps.get(1)?.as_str().parse().ok()?,
        column: caps.get(2)?.as_str().parse().ok()?,
    })
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error")?;

        if let Some(dialect) = self.dialect {
            write!(f, " ({dialect:?})")?;
        }

        if let Some(pos) = self.position {
            write!(f, " at line {}, column {}", pos.line, pos.column)?;
        }

        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<sqlparser::parser::ParserError> for ParseError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        Self::new(err.to_string())
    }
}
