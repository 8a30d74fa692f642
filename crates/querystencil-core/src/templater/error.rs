//! Error types for the interpolation pipeline.

use crate::types::{issue_codes, Issue};
use thiserror::Error;

/// Conditions that stop a query from being sent to the backend.
///
/// Everything else the pipeline meets (empty query, no filters, a table the query
/// does not mention, malformed macros) is passed through unchanged instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The ad-hoc filter source query does not name a table.
    #[error("failed to get table from ad-hoc filter query: {query}")]
    Extraction { query: String },

    /// Ad-hoc filters were supplied to a data source that has them disabled.
    #[error(
        "ad-hoc filters are disabled for this data source, but {filter_count} filter(s) are active"
    )]
    FilterApplicationDisallowed { filter_count: usize },
}

impl EngineError {
    /// Machine-readable code, see [`issue_codes`].
    pub fn code(&self) -> &'static str {
        match self {
            Self::Extraction { .. } => issue_codes::TABLE_EXTRACTION_FAILED,
            Self::FilterApplicationDisallowed { .. } => issue_codes::AD_HOC_FILTERS_DISALLOWED,
        }
    }
}

impl From<&EngineError> for Issue {
    fn from(err: &EngineError) -> Self {
        Issue::error(err.code(), err.to_string())
    }
}
