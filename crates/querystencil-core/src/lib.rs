//! Query templating for dashboard data sources.
//!
//! Rewrites a panel's SQL before it is sent to the backend: ad-hoc filters are
//! attached as a ClickHouse `additional_table_filters` setting, `$__conditionalAll`
//! macros collapse to `1=1` when their variable selects everything, and dashboard
//! variables are substituted last.
//!
//! Most callers want [`interpolate`] for a self-contained request, or
//! [`TemplateEngine`] with a [`QueryContext`] when they manage state themselves.

pub mod adhoc;
pub mod error;
pub mod extractors;
pub mod parser;
pub mod templater;
pub mod types;

pub use adhoc::AdHocFilterApplier;
pub use error::ParseError;
pub use extractors::{extract_tables, SqlTableExtractor, TableExtractor};
pub use parser::{parse_sql, parse_sql_with_dialect};
pub use templater::{
    interpolate, EngineError, MacroExpander, PlainSubstitution, QueryContext,
    StaticVariableStore, TemplateEngine, VariableStore, VariableSubstitution,
};

pub use types::{
    // Issue codes
    issue_codes,
    // Request types
    AdHocFilterMode,
    Dialect,
    EngineConfig,
    // Variables and filters
    Filter,
    InterpolateRequest,
    // Response types
    InterpolateResult,
    Issue,
    Severity,
    TemplateVariable,
    VariableCurrent,
    VariableValue,
    ALL_VALUES,
};
