//! Query interpolation pipeline.
//!
//! A query is rewritten in three fixed steps before it is sent to the backend:
//!
//! ```text
//! Raw SQL → [ad-hoc filters] → [$__conditionalAll] → [variable substitution] → Backend SQL
//! ```
//!
//! Ad-hoc filters are skipped for the query that feeds the filter picker itself,
//! otherwise the picker would only ever offer values the current filters allow.
//!
//! # Example
//!
//! ```
//! use querystencil_core::templater::{QueryContext, StaticVariableStore, TemplateEngine};
//! use querystencil_core::{EngineConfig, Filter, TemplateVariable};
//!
//! let engine = TemplateEngine::new(EngineConfig::default());
//! let store = StaticVariableStore::default()
//!     .with_variable(TemplateVariable::new("region", "$__all"))
//!     .with_filter(Filter::new("orders.status", "=", "shipped"));
//!
//! let mut ctx = QueryContext::new();
//! let sql = engine
//!     .interpolate(
//!         &mut ctx,
//!         "SELECT * FROM orders WHERE $__conditionalAll(region IN ($region), $region)",
//!         &store,
//!     )
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     r"SELECT * FROM orders WHERE 1=1 settings additional_table_filters={'orders' : ' status = \'shipped\' '}"
//! );
//! ```

mod conditional_all;
mod error;
mod store;
mod substitution;

pub use conditional_all::{
    macro_offsets, parse_invocation, variable_name, Expansion, MacroExpander, MacroInvocation,
    CONDITIONAL_ALL,
};
pub use error::EngineError;
pub use store::{StaticVariableStore, VariableStore};
pub use substitution::{PlainSubstitution, VariableSubstitution};

use crate::adhoc::AdHocFilterApplier;
use crate::extractors::{SqlTableExtractor, TableExtractor};
use crate::types::{
    issue_codes, EngineConfig, Filter, InterpolateRequest, InterpolateResult, Issue,
    TemplateVariable,
};

/// Request-scoped interpolation state.
///
/// Holds the ad-hoc filter target table and the filter-source flag. Callers keep
/// one context per request (or per panel) so concurrent requests never share a
/// target table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryContext {
    filters: AdHocFilterApplier,
    skip_ad_hoc_filter: bool,
}

impl QueryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for the query that lists ad-hoc filter values.
    pub fn filter_source() -> Self {
        Self {
            skip_ad_hoc_filter: true,
            ..Self::default()
        }
    }

    pub fn skip_ad_hoc_filter(&self) -> bool {
        self.skip_ad_hoc_filter
    }

    pub fn set_skip_ad_hoc_filter(&mut self, skip: bool) {
        self.skip_ad_hoc_filter = skip;
    }

    pub fn target_table(&self) -> &str {
        self.filters.target_table()
    }

    pub fn set_target_table(&mut self, table: impl Into<String>) {
        self.filters.set_target_table(table);
    }

    pub fn set_target_table_from_query(
        &mut self,
        query: &str,
        extractor: &dyn TableExtractor,
    ) -> Result<(), EngineError> {
        self.filters.set_target_table_from_query(query, extractor)
    }

    pub fn applier(&self) -> &AdHocFilterApplier {
        &self.filters
    }

    pub fn applier_mut(&mut self) -> &mut AdHocFilterApplier {
        &mut self.filters
    }
}

/// Runs the interpolation pipeline for one data source.
///
/// The engine itself is immutable; all per-request state lives in [`QueryContext`].
#[derive(Debug, Clone)]
pub struct TemplateEngine<S = PlainSubstitution> {
    config: EngineConfig,
    datasource: String,
    expander: MacroExpander,
    substitution: S,
}

impl TemplateEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_substitution(config, PlainSubstitution)
    }
}

impl<S: VariableSubstitution> TemplateEngine<S> {
    /// Uses the host's own substitution for the final step.
    pub fn with_substitution(config: EngineConfig, substitution: S) -> Self {
        Self {
            config,
            datasource: String::new(),
            expander: MacroExpander::new(),
            substitution,
        }
    }

    /// Name the variable store knows this data source by.
    pub fn with_datasource(mut self, name: impl Into<String>) -> Self {
        self.datasource = name.into();
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn datasource(&self) -> &str {
        &self.datasource
    }

    /// Rewrites `query` using the variables and filters held by `store`.
    pub fn interpolate(
        &self,
        ctx: &mut QueryContext,
        query: &str,
        store: &dyn VariableStore,
    ) -> Result<String, EngineError> {
        let variables = store.variables();
        let filters = if ctx.skip_ad_hoc_filter() {
            Vec::new()
        } else {
            store.ad_hoc_filters(&self.datasource)
        };
        self.interpolate_with(ctx, query, &variables, &filters)
            .map(|expansion| expansion.query)
    }

    /// Like [`interpolate`](Self::interpolate), with the side inputs passed directly.
    ///
    /// The returned [`Expansion`] reports how the macro step went; its `query` is
    /// the fully rewritten text.
    pub fn interpolate_with(
        &self,
        ctx: &mut QueryContext,
        query: &str,
        variables: &[TemplateVariable],
        filters: &[Filter],
    ) -> Result<Expansion, EngineError> {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            datasource = %self.datasource,
            filters = filters.len(),
            variables = variables.len(),
            skip_ad_hoc_filter = ctx.skip_ad_hoc_filter(),
            "Interpolating query"
        );

        let filtered = if ctx.skip_ad_hoc_filter() {
            query.to_string()
        } else {
            self.apply_ad_hoc_filters(ctx, query, filters)?
        };

        let mut expansion = self.expander.expand_with_report(&filtered, variables);
        expansion.query = self.substitution.substitute(&expansion.query, variables);
        Ok(expansion)
    }

    /// First pipeline step on its own.
    ///
    /// Fails when the data source has ad-hoc filters disabled but filters are
    /// active: running the query unfiltered would show data the user believes
    /// is filtered out.
    pub fn apply_ad_hoc_filters(
        &self,
        ctx: &mut QueryContext,
        query: &str,
        filters: &[Filter],
    ) -> Result<String, EngineError> {
        if !filters.is_empty() && self.config.ad_hoc_filters.is_disabled() {
            return Err(EngineError::FilterApplicationDisallowed {
                filter_count: filters.len(),
            });
        }
        Ok(ctx.applier_mut().apply(query, filters))
    }

    /// Second pipeline step on its own.
    pub fn expand_macros(&self, query: &str, variables: &[TemplateVariable]) -> String {
        self.expander.expand(query, variables)
    }
}

/// Interpolates a self-contained request.
///
/// This is the entry point for the WASM bindings and the CLI. It never panics on
/// bad input; failures are reported as issues in the result.
pub fn interpolate(request: &InterpolateRequest) -> InterpolateResult {
    let engine = TemplateEngine::new(request.config);
    let mut ctx = QueryContext::new();
    ctx.set_skip_ad_hoc_filter(request.filter_source);

    if let Some(table) = &request.target_table {
        ctx.set_target_table(table.as_str());
    }
    if let Some(source) = &request.target_table_query {
        let extractor = SqlTableExtractor::new(request.config.dialect);
        if let Err(err) = ctx.set_target_table_from_query(source, &extractor) {
            return InterpolateResult::default().with_issue(Issue::from(&err));
        }
    }

    match engine.interpolate_with(&mut ctx, &request.query, &request.variables, &request.filters) {
        Ok(expansion) => {
            let result = InterpolateResult::success(expansion.query, ctx.target_table());
            match expansion.malformed_at {
                Some(offset) => result.with_issue(
                    Issue::warning(
                        issue_codes::MALFORMED_MACRO,
                        "Malformed $__conditionalAll call left unexpanded",
                    )
                    .with_offset(offset),
                ),
                None => result,
            }
        }
        Err(err) => InterpolateResult::default().with_issue(Issue::from(&err)),
    }
}
