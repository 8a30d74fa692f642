//! Ad-hoc filter injection.
//!
//! Filters are not spliced into the query's `WHERE` clause. They are handed to
//! ClickHouse through the `additional_table_filters` query setting, which the
//! server applies to every read of the named table:
//!
//! ```text
//! SELECT * FROM orders settings additional_table_filters={'orders' : ' status = \'shipped\' '}
//! ```
//!
//! Filtering is best-effort. Empty input, no filters, or a target table the query
//! does not mention all return the query untouched.

mod clause;

pub use clause::{build_filter_clause, render_value};

use crate::extractors::TableExtractor;
use crate::templater::EngineError;
use crate::types::Filter;
use regex::Regex;

/// Applies ad-hoc filters to queries that read the target table.
///
/// The target table persists across [`apply`](Self::apply) calls until it is
/// reassigned, either explicitly or by a filter with a qualified key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdHocFilterApplier {
    target_table: String,
}

impl AdHocFilterApplier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_table(&self) -> &str {
        &self.target_table
    }

    pub fn set_target_table(&mut self, table: impl Into<String>) {
        self.target_table = table.into();
    }

    /// Sets the target table to the primary table of `query`.
    ///
    /// The extracted name is stored even when empty; the error tells the caller not
    /// to go on filtering with an unknown table.
    pub fn set_target_table_from_query(
        &mut self,
        query: &str,
        extractor: &dyn TableExtractor,
    ) -> Result<(), EngineError> {
        self.target_table = extractor.primary_table(query);
        if self.target_table.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::warn!(query, "Failed to get table from ad-hoc filter query");
            return Err(EngineError::Extraction {
                query: query.to_string(),
            });
        }
        Ok(())
    }

    /// Appends the `additional_table_filters` setting for `filters` to `sql`.
    ///
    /// A qualified key on the first filter (`orders.status`) retargets the applier
    /// to that table before anything else is checked.
    pub fn apply(&mut self, sql: &str, filters: &[Filter]) -> String {
        let Some(first) = filters.first() else {
            return sql.to_string();
        };
        if sql.is_empty() {
            return String::new();
        }

        if let (Some(table), _) = first.split_key() {
            self.target_table = table.to_string();
        }

        if !self.is_referenced_by(sql) {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                target_table = %self.target_table,
                "Query does not reference the ad-hoc filter table; filters skipped"
            );
            return sql.to_string();
        }

        let clause = build_filter_clause(filters);
        format!(
            "{} settings additional_table_filters={{'{}' : '{}'}}",
            strip_trailing_semicolon(sql),
            escape_literal(&self.target_table),
            clause
        )
    }

    /// Case-insensitive whole-word match of the target table in `sql`.
    fn is_referenced_by(&self, sql: &str) -> bool {
        if self.target_table.is_empty() {
            return false;
        }
        let pattern = format!(r"(?i)\b{}\b", regex::escape(&self.target_table));
        Regex::new(&pattern).is_ok_and(|re| re.is_match(sql))
    }
}

/// Drops one trailing `;` together with any whitespace after it.
fn strip_trailing_semicolon(sql: &str) -> &str {
    sql.trim_end().strip_suffix(';').unwrap_or(sql)
}

/// Escapes a value for a single-quoted ClickHouse string literal.
fn escape_literal(value: &str) -> String {
    value.replace('\\', r"\\").replace('\'', r"\'")
}
