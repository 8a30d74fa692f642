//! Response types for the interpolation API.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Machine-readable issue codes.
pub mod issue_codes {
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";
    pub const TABLE_EXTRACTION_FAILED: &str = "TABLE_EXTRACTION_FAILED";
    pub const AD_HOC_FILTERS_DISALLOWED: &str = "AD_HOC_FILTERS_DISALLOWED";
    pub const MALFORMED_MACRO: &str = "MALFORMED_MACRO";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A problem encountered while rewriting a query.
///
/// Errors mean no query was produced. Warnings accompany a query that was
/// produced but left partly unrewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub severity: Severity,

    /// Machine-readable issue code
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Byte offset in the query the issue relates to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

impl Issue {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: code.into(),
            message: message.into(),
            offset: None,
        }
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.into(),
            message: message.into(),
            offset: None,
        }
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// The outcome of one interpolation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InterpolateResult {
    /// The rewritten query, absent when an error stopped the pipeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Target table in effect after ad-hoc filtering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_table: Option<String>,

    #[serde(default)]
    pub issues: Vec<Issue>,

    pub has_errors: bool,
}

impl InterpolateResult {
    pub fn success(query: impl Into<String>, target_table: &str) -> Self {
        Self {
            query: Some(query.into()),
            target_table: (!target_table.is_empty()).then(|| target_table.to_string()),
            issues: Vec::new(),
            has_errors: false,
        }
    }

    /// Create an error result with a single issue.
    /// Useful for returning errors from the WASM boundary or the CLI.
    pub fn from_error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            query: None,
            target_table: None,
            issues: vec![Issue::error(code, message)],
            has_errors: true,
        }
    }

    pub fn with_issue(mut self, issue: Issue) -> Self {
        self.has_errors |= issue.severity == Severity::Error;
        self.issues.push(issue);
        self
    }
}
