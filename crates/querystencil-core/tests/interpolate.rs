//! End-to-end tests for the interpolation pipeline.

use insta::{assert_json_snapshot, assert_snapshot};
use querystencil_core::{
    interpolate, issue_codes, AdHocFilterApplier, AdHocFilterMode, EngineConfig, EngineError,
    Filter, InterpolateRequest, MacroExpander, QueryContext, StaticVariableStore, TemplateEngine,
    TemplateVariable, ALL_VALUES,
};
use rstest::rstest;

fn request(query: &str, variables: Vec<TemplateVariable>, filters: Vec<Filter>) -> InterpolateRequest {
    InterpolateRequest {
        variables,
        filters,
        ..InterpolateRequest::new(query)
    }
}

// ============================================================================
// Ad-hoc filters
// ============================================================================

#[test]
fn qualified_filter_sets_table_and_appends_setting() {
    let mut applier = AdHocFilterApplier::new();
    let sql = applier.apply(
        "SELECT * FROM orders",
        &[Filter::new("orders.status", "=", "shipped").with_condition("AND")],
    );
    assert_eq!(
        sql,
        r"SELECT * FROM orders settings additional_table_filters={'orders' : ' status = \'shipped\' '}"
    );
    assert_eq!(applier.target_table(), "orders");
}

#[test]
fn no_filters_leave_query_untouched() {
    let mut applier = AdHocFilterApplier::new();
    assert_eq!(applier.apply("SELECT * FROM orders", &[]), "SELECT * FROM orders");
}

#[rstest]
#[case::integer("42", "42")]
#[case::negative("-7", "-7")]
#[case::decimal("3.5", "3.5")]
#[case::text("shipped", r"\'shipped\'")]
#[case::empty("", r"\'\'")]
fn filter_values_render_by_type(#[case] value: &str, #[case] rendered: &str) {
    let mut applier = AdHocFilterApplier::new();
    let sql = applier.apply("SELECT * FROM t", &[Filter::new("t.id", "=", value)]);
    assert_eq!(
        sql,
        format!("SELECT * FROM t settings additional_table_filters={{'t' : ' id = {rendered} '}}")
    );
}

#[test]
fn several_filters_join_on_their_conditions() {
    let mut applier = AdHocFilterApplier::new();
    let filters = vec![
        Filter::new("logs.level", "=", "error").with_condition("OR"),
        Filter::new("logs.code", ">", "500").with_condition("AND"),
        Filter::new("logs.host", "!=", "db1"),
    ];
    let sql = applier.apply("SELECT * FROM logs;", &filters);
    assert_snapshot!(
        sql,
        @r"SELECT * FROM logs settings additional_table_filters={'logs' : ' level = \'error\' OR code > 500 AND host != \'db1\' '}"
    );
}

#[test]
fn unrelated_query_is_not_filtered() {
    let mut applier = AdHocFilterApplier::new();
    let sql = applier.apply(
        "SELECT * FROM customers",
        &[Filter::new("orders.status", "=", "shipped")],
    );
    assert_eq!(sql, "SELECT * FROM customers");
    assert_eq!(applier.target_table(), "orders");
}

#[test]
fn table_from_filter_source_query() {
    let mut ctx = QueryContext::new();
    ctx.set_target_table_from_query(
        "SELECT DISTINCT status FROM shop.orders",
        &querystencil_core::SqlTableExtractor::default(),
    )
    .unwrap();
    assert_eq!(ctx.target_table(), "shop.orders");
}

#[test]
fn host_supplied_extractor_is_used() {
    let mut ctx = QueryContext::new();
    let err = ctx
        .set_target_table_from_query("anything", &|_: &str| String::new())
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Extraction {
            query: "anything".to_string()
        }
    );
    assert_eq!(ctx.target_table(), "");

    ctx.set_target_table_from_query("anything", &|_: &str| "events".to_string())
        .unwrap();
    assert_eq!(ctx.target_table(), "events");
}

// ============================================================================
// $__conditionalAll
// ============================================================================

#[rstest]
#[case::all_selected(ALL_VALUES, "SELECT * FROM t WHERE 1=1")]
#[case::single_value("EU", "SELECT * FROM t WHERE region = 'EU'")]
#[case::empty_value("", "SELECT * FROM t WHERE 1=1")]
fn conditional_all_follows_variable(#[case] current: &str, #[case] expected: &str) {
    let variables = vec![TemplateVariable::new("region", current)];
    let sql = MacroExpander::new().expand(
        "SELECT * FROM t WHERE $__conditionalAll(region = 'EU', $region)",
        &variables,
    );
    assert_eq!(sql, expected);
}

#[test]
fn nested_parentheses_stay_in_expression() {
    let variables = vec![TemplateVariable::new("v", "x")];
    let sql = MacroExpander::new().expand("WHERE $__conditionalAll(f(x,y) = 1, $v)", &variables);
    assert_eq!(sql, "WHERE f(x,y) = 1");
}

#[test]
fn multiple_macros_expand_independently() {
    let variables = vec![
        TemplateVariable::new("region", ALL_VALUES),
        TemplateVariable::new("kind", vec!["a".to_string(), "b".to_string()]),
    ];
    let sql = MacroExpander::new().expand(
        "SELECT * FROM t WHERE $__conditionalAll(region IN ($region), $region) \
         AND $__conditionalAll(kind IN ($kind), $kind)",
        &variables,
    );
    assert_eq!(sql, "SELECT * FROM t WHERE 1=1 AND kind IN ($kind)");
}

#[test]
fn missing_variable_keeps_expression() {
    let sql = MacroExpander::new().expand("WHERE $__conditionalAll(a = 1, $nope)", &[]);
    assert_eq!(sql, "WHERE a = 1");
}

// ============================================================================
// Full pipeline
// ============================================================================

#[test]
fn pipeline_filters_expands_then_substitutes() {
    let req = request(
        "SELECT * FROM orders WHERE $__conditionalAll(region IN (${region:singlequote}), $region)",
        vec![TemplateVariable::new(
            "region",
            vec!["EU".to_string(), "US".to_string()],
        )],
        vec![Filter::new("orders.id", ">", "100")],
    );
    let result = interpolate(&req);

    assert!(!result.has_errors, "{:?}", result.issues);
    assert_eq!(result.target_table.as_deref(), Some("orders"));
    assert_snapshot!(
        result.query.unwrap_or_default(),
        @"SELECT * FROM orders WHERE region IN ('EU','US') settings additional_table_filters={'orders' : ' id > 100 '}"
    );
}

#[test]
fn disabled_data_source_rejects_filters() {
    let mut req = request(
        "SELECT * FROM orders",
        Vec::new(),
        vec![Filter::new("orders.id", "=", "1")],
    );
    req.config = EngineConfig {
        ad_hoc_filters: AdHocFilterMode::Disabled,
        ..EngineConfig::default()
    };

    assert_json_snapshot!(interpolate(&req), @r#"
    {
      "issues": [
        {
          "severity": "error",
          "code": "AD_HOC_FILTERS_DISALLOWED",
          "message": "ad-hoc filters are disabled for this data source, but 1 filter(s) are active"
        }
      ],
      "hasErrors": true
    }
    "#);
}

#[test]
fn filter_source_request_skips_filters() {
    let mut req = request(
        "SELECT DISTINCT status FROM orders",
        Vec::new(),
        vec![Filter::new("orders.status", "=", "new")],
    );
    req.filter_source = true;
    req.config.ad_hoc_filters = AdHocFilterMode::Disabled;

    let result = interpolate(&req);
    assert!(!result.has_errors);
    assert_eq!(result.query.as_deref(), Some("SELECT DISTINCT status FROM orders"));
}

#[test]
fn unset_mode_applies_filters() {
    let req = request(
        "SELECT * FROM t",
        Vec::new(),
        vec![Filter::new("t.id", "=", "1")],
    );
    assert_eq!(req.config.ad_hoc_filters, AdHocFilterMode::Unset);
    let result = interpolate(&req);
    assert_eq!(
        result.query.as_deref(),
        Some("SELECT * FROM t settings additional_table_filters={'t' : ' id = 1 '}")
    );
}

#[test]
fn bad_extraction_reports_issue() {
    let mut req = InterpolateRequest::new("SELECT * FROM t");
    req.target_table_query = Some("SELECT 1 + 1".to_string());
    let result = interpolate(&req);

    assert!(result.has_errors);
    assert_eq!(result.issues[0].code, issue_codes::TABLE_EXTRACTION_FAILED);
}

#[test]
fn request_round_trips_through_json() {
    let json = r#"{
        "query": "SELECT * FROM t WHERE $__conditionalAll(a = $a, $a)",
        "config": {"dialect": "clickhouse", "adHocFilters": "enabled"},
        "variables": [{"name": "a", "current": {"value": "$__all"}}],
        "filters": [{"key": "t.b", "operator": "=", "value": "x", "condition": "AND"}]
    }"#;
    let req: InterpolateRequest = serde_json::from_str(json).unwrap();
    let result = interpolate(&req);

    assert_eq!(
        result.query.as_deref(),
        Some(r"SELECT * FROM t WHERE 1=1 settings additional_table_filters={'t' : ' b = \'x\' '}")
    );
}

#[test]
fn engine_contexts_do_not_share_target_table() {
    let engine = TemplateEngine::new(EngineConfig::default());
    let store = StaticVariableStore::default().with_filter(Filter::new("a.x", "=", "1"));
    let mut first = QueryContext::new();
    let mut second = QueryContext::new();
    second.set_target_table("b");

    engine.interpolate(&mut first, "SELECT * FROM a", &store).unwrap();

    assert_eq!(first.target_table(), "a");
    assert_eq!(second.target_table(), "b");
}
