//! Fuzz target for the interpolation pipeline.
//!
//! `interpolate()` must never panic; failures come back as issues.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use querystencil_core::{
    interpolate, AdHocFilterMode, Dialect, EngineConfig, Filter, InterpolateRequest,
    TemplateVariable,
};

#[derive(Debug, Arbitrary)]
struct FuzzFilter {
    key: String,
    operator: String,
    value: String,
    condition: Option<String>,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    query: String,
    variables: Vec<(String, Vec<String>)>,
    filters: Vec<FuzzFilter>,
    target_table_query: Option<String>,
    filter_source: bool,
    mode_idx: u8,
    generic_dialect: bool,
}

impl FuzzInput {
    fn config(&self) -> EngineConfig {
        EngineConfig {
            dialect: if self.generic_dialect {
                Dialect::Generic
            } else {
                Dialect::Clickhouse
            },
            ad_hoc_filters: match self.mode_idx % 3 {
                0 => AdHocFilterMode::Enabled,
                1 => AdHocFilterMode::Disabled,
                _ => AdHocFilterMode::Unset,
            },
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    let config = input.config();
    let request = InterpolateRequest {
        query: input.query,
        config,
        variables: input
            .variables
            .into_iter()
            .map(|(name, values)| match <[String; 1]>::try_from(values) {
                Ok([single]) => TemplateVariable::new(name, single),
                Err(values) => TemplateVariable::new(name, values),
            })
            .collect(),
        filters: input
            .filters
            .into_iter()
            .map(|f| Filter {
                key: f.key,
                operator: f.operator,
                value: f.value,
                condition: f.condition,
            })
            .collect(),
        target_table: None,
        target_table_query: input.target_table_query,
        filter_source: input.filter_source,
    };

    let _result = interpolate(&request);
});
