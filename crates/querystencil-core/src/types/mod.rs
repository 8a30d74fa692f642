//! Types for the query interpolation API.
//!
//! Requests carry the raw query text together with the host's side inputs
//! (template variables and ad-hoc filters). Results carry the rewritten query
//! or the issues that prevented it from being produced.

mod request;
mod response;
mod variables;

pub use request::{AdHocFilterMode, Dialect, EngineConfig, InterpolateRequest};
pub use response::{issue_codes, InterpolateResult, Issue, Severity};
pub use variables::{
    find_variable, Filter, TemplateVariable, VariableCurrent, VariableValue, ALL_VALUES,
};
