//! Variables, filters and data source settings from flags and context files.

use crate::cli::Args;
use anyhow::{bail, Context, Result};
use querystencil_core::{EngineConfig, Filter, InterpolateRequest, TemplateVariable, VariableValue};
use serde::Deserialize;
use std::path::Path;

/// Operators recognised in `--filter`, two-character forms first.
const FILTER_OPERATORS: [&str; 9] = ["!=", "<>", ">=", "<=", "=~", "!~", "=", "<", ">"];

/// Contents of a `--context` JSON file.
///
/// Same field names as the interpolation request, without the query.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextFile {
    #[serde(default)]
    pub config: EngineConfig,
    #[serde(default)]
    pub variables: Vec<TemplateVariable>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub target_table: Option<String>,
    #[serde(default)]
    pub target_table_query: Option<String>,
}

pub fn load_context(path: &Path) -> Result<ContextFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read context file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid context file: {}", path.display()))
}

/// Builds the request shared by every input; the caller fills in `query`.
///
/// Flags take precedence over the context file. A `--var` replaces a context
/// variable of the same name; `--filter` entries are appended after the
/// context filters.
pub fn base_request(args: &Args) -> Result<InterpolateRequest> {
    let context = match &args.context {
        Some(path) => load_context(path)?,
        None => ContextFile::default(),
    };

    let mut config = context.config;
    if let Some(dialect) = args.dialect {
        config.dialect = dialect.into();
    }
    if let Some(mode) = args.ad_hoc {
        config.ad_hoc_filters = mode.into();
    }

    let mut variables = context.variables;
    for spec in &args.vars {
        let variable = parse_var(spec)?;
        match variables.iter_mut().find(|v| v.name == variable.name) {
            Some(existing) => *existing = variable,
            None => variables.push(variable),
        }
    }

    let mut filters = context.filters;
    for spec in &args.filters {
        filters.push(parse_filter(spec, &args.condition)?);
    }

    Ok(InterpolateRequest {
        query: String::new(),
        config,
        variables,
        filters,
        target_table: args.target_table.clone().or(context.target_table),
        target_table_query: args
            .target_table_query
            .clone()
            .or(context.target_table_query),
        filter_source: args.filter_source,
    })
}

/// Parses `NAME=VALUE`. A value containing commas becomes a multi-value selection.
pub fn parse_var(spec: &str) -> Result<TemplateVariable> {
    let Some((name, value)) = spec.split_once('=') else {
        bail!("Invalid --var '{spec}': expected NAME=VALUE");
    };
    let name = name.trim().trim_start_matches('$');
    if name.is_empty() {
        bail!("Invalid --var '{spec}': empty variable name");
    }

    let value = value.trim();
    let value = if value.contains(',') {
        VariableValue::Multi(value.split(',').map(|v| v.trim().to_string()).collect())
    } else {
        VariableValue::Single(value.to_string())
    };
    Ok(TemplateVariable::new(name, value))
}

/// Parses `KEY<OP>VALUE`, splitting on the first operator found.
pub fn parse_filter(spec: &str, condition: &str) -> Result<Filter> {
    let split = spec.char_indices().find_map(|(i, _)| {
        FILTER_OPERATORS
            .iter()
            .find(|op| spec[i..].starts_with(**op))
            .map(|op| (i, *op))
    });
    let Some((at, operator)) = split else {
        bail!("Invalid --filter '{spec}': no operator (expected one of {FILTER_OPERATORS:?})");
    };

    let key = spec[..at].trim();
    if key.is_empty() {
        bail!("Invalid --filter '{spec}': empty key");
    }
    let value = spec[at + operator.len()..].trim();
    Ok(Filter::new(key, operator, value).with_condition(condition))
}
