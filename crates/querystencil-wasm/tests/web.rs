//! Tests run inside a wasm runtime with `wasm-pack test`.

#![cfg(target_arch = "wasm32")]

use querystencil_wasm::{get_version, init, interpolate_json};
use wasm_bindgen_test::*;

#[wasm_bindgen_test]
fn interpolate_json_in_wasm() {
    init();
    let request = r#"{
        "query": "SELECT * FROM t WHERE $__conditionalAll(a = 1, $a)",
        "variables": [{"name": "a", "current": {"value": "$__all"}}],
        "filters": [{"key": "t.id", "operator": "=", "value": "42"}]
    }"#;

    let parsed: serde_json::Value = serde_json::from_str(&interpolate_json(request)).unwrap();
    assert_eq!(
        parsed["query"],
        "SELECT * FROM t WHERE 1=1 settings additional_table_filters={'t' : ' id = 42 '}"
    );
    assert_eq!(parsed["hasErrors"], false);
}

#[wasm_bindgen_test]
fn invalid_request_does_not_throw() {
    let parsed: serde_json::Value = serde_json::from_str(&interpolate_json("{")).unwrap();
    assert_eq!(parsed["hasErrors"], true);
    assert_eq!(parsed["issues"][0]["code"], "INVALID_REQUEST");
}

#[wasm_bindgen_test]
fn version_is_exposed() {
    assert!(!get_version().is_empty());
}
