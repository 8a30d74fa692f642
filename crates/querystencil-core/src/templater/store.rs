//! Access to the host's template-variable store.

use crate::types::{Filter, TemplateVariable};

/// Read access to host-managed dashboard state.
pub trait VariableStore {
    /// Snapshot of all template variables.
    fn variables(&self) -> Vec<TemplateVariable>;

    /// Ad-hoc filters active for the named data source.
    fn ad_hoc_filters(&self, datasource: &str) -> Vec<Filter>;
}

/// A fixed snapshot of variables and filters for one data source.
///
/// Used when the host hands its state over in a request rather than through a
/// live store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticVariableStore {
    variables: Vec<TemplateVariable>,
    filters: Vec<Filter>,
}

impl StaticVariableStore {
    pub fn new(variables: Vec<TemplateVariable>, filters: Vec<Filter>) -> Self {
        Self { variables, filters }
    }

    pub fn with_variable(mut self, variable: TemplateVariable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }
}

impl VariableStore for StaticVariableStore {
    fn variables(&self) -> Vec<TemplateVariable> {
        self.variables.clone()
    }

    /// The snapshot belongs to a single data source, so the name is not consulted.
    fn ad_hoc_filters(&self, _datasource: &str) -> Vec<Filter> {
        self.filters.clone()
    }
}
