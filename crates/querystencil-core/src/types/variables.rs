//! Template variables and ad-hoc filters supplied by the dashboard host.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Selection value the host uses when "All" is picked for a variable.
pub const ALL_VALUES: &str = "$__all";

/// A single ad-hoc filter as supplied by the dashboard host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    /// Column name, optionally qualified with its table (`table.column`).
    pub key: String,

    /// Comparison operator, emitted verbatim (`=`, `!=`, `<`, `LIKE`, ...).
    pub operator: String,

    /// Filter value. Numeric literals are emitted unquoted.
    pub value: String,

    /// Join condition towards the next filter (`AND` when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl Filter {
    pub fn new(
        key: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            operator: operator.into(),
            value: value.into(),
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Splits the key into its table qualifier and column name.
    ///
    /// Only the first `.` separates the table; `db.table.col` yields
    /// `(Some("db"), "table.col")`.
    pub fn split_key(&self) -> (Option<&str>, &str) {
        match self.key.split_once('.') {
            Some((table, column)) => (Some(table), column),
            None => (None, self.key.as_str()),
        }
    }

    /// The join condition, falling back to `AND` when unset or empty.
    pub fn join_condition(&self) -> &str {
        match self.condition.as_deref() {
            Some(condition) if !condition.is_empty() => condition,
            _ => "AND",
        }
    }
}

/// Current selection of a template variable.
///
/// Single-value variables carry a string; multi-value variables carry a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum VariableValue {
    Single(String),
    Multi(Vec<String>),
}

impl VariableValue {
    /// String form of the selection. Lists are joined with `,`.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Single(value) => Cow::Borrowed(value),
            Self::Multi(values) => Cow::Owned(values.join(",")),
        }
    }

    /// True when the selection means "no filtering": empty, or the `$__all` sentinel.
    pub fn selects_everything(&self) -> bool {
        let text = self.as_text();
        text.is_empty() || text == ALL_VALUES
    }
}

impl Default for VariableValue {
    fn default() -> Self {
        Self::Single(String::new())
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for VariableValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multi(values)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariableCurrent {
    #[serde(default)]
    pub value: VariableValue,
}

/// A named dashboard variable and its current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVariable {
    pub name: String,

    #[serde(default)]
    pub current: VariableCurrent,
}

impl TemplateVariable {
    pub fn new(name: impl Into<String>, value: impl Into<VariableValue>) -> Self {
        Self {
            name: name.into(),
            current: VariableCurrent {
                value: value.into(),
            },
        }
    }

    pub fn value(&self) -> &VariableValue {
        &self.current.value
    }
}

/// Looks up a variable by exact name.
pub fn find_variable<'a>(
    variables: &'a [TemplateVariable],
    name: &str,
) -> Option<&'a TemplateVariable> {
    variables.iter().find(|variable| variable.name == name)
}
