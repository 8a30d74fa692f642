//! Request and configuration types for the interpolation API.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::variables::{Filter, TemplateVariable};

/// A request to rewrite one query before it is sent to the backend.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InterpolateRequest {
    /// The raw query text as typed in the query editor
    pub query: String,

    /// Data source settings
    #[serde(default)]
    pub config: EngineConfig,

    /// Snapshot of the dashboard's template variables
    #[serde(default)]
    pub variables: Vec<TemplateVariable>,

    /// Ad-hoc filters currently active for this data source
    #[serde(default)]
    pub filters: Vec<Filter>,

    /// Explicit target table for ad-hoc filters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_table: Option<String>,

    /// Query the target table is extracted from (the ad-hoc filter source query).
    ///
    /// Applied after `target_table`, so it wins when both are given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_table_query: Option<String>,

    /// Marks the query as the ad-hoc filter source itself; filters are not applied to it
    #[serde(default)]
    pub filter_source: bool,
}

impl InterpolateRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            config: EngineConfig::default(),
            variables: Vec::new(),
            filters: Vec::new(),
            target_table: None,
            target_table_query: None,
            filter_source: false,
        }
    }
}

/// Per-data-source settings for the interpolation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Dialect used when extracting the target table from a query
    #[serde(default)]
    pub dialect: Dialect,

    /// Whether ad-hoc filters may be applied to this data source
    #[serde(default)]
    pub ad_hoc_filters: AdHocFilterMode,
}

/// Administrative switch for ad-hoc filtering on a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdHocFilterMode {
    Enabled,
    Disabled,
    /// Never configured. Behaves like `Enabled` so existing data sources keep working.
    #[default]
    Unset,
}

impl AdHocFilterMode {
    /// Maps the optional boolean stored in data source settings.
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => Self::Enabled,
            Some(false) => Self::Disabled,
            None => Self::Unset,
        }
    }

    pub fn is_disabled(self) -> bool {
        matches!(self, Self::Disabled)
    }
}

/// SQL dialect used to parse queries during table extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Generic,
    #[default]
    Clickhouse,
}

impl Dialect {
    pub fn to_sqlparser_dialect(&self) -> Box<dyn sqlparser::dialect::Dialect> {
        use sqlparser::dialect::{ClickHouseDialect, GenericDialect};
        match self {
            Self::Generic => Box::new(GenericDialect {}),
            Self::Clickhouse => Box::new(ClickHouseDialect {}),
        }
    }
}
