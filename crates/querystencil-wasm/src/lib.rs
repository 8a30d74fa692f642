use querystencil_core::{interpolate, issue_codes, InterpolateRequest, InterpolateResult};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Installs the panic hook, and the tracing subscriber when built with `tracing`.
/// Safe to call more than once.
#[wasm_bindgen]
pub fn init() {
    console_error_panic_hook::set_once();

    #[cfg(feature = "tracing")]
    {
        use std::sync::Once;
        static TRACING: Once = Once::new();
        TRACING.call_once(tracing_wasm::set_as_global_default);
    }
}

/// Main interpolation entry point - accepts JSON request, returns JSON result
/// This function never throws - errors are returned in the result's issues array
#[wasm_bindgen]
pub fn interpolate_json(request_json: &str) -> String {
    let request: InterpolateRequest = match serde_json::from_str(request_json) {
        Ok(req) => req,
        Err(e) => {
            let result = InterpolateResult::from_error(
                issue_codes::INVALID_REQUEST,
                format!("Invalid request format: {e}"),
            );
            return to_json(&result);
        }
    };

    to_json(&interpolate(&request))
}

/// Interpolates a bare query with no variables or filters.
///
/// Useful for previewing what the connector will send for a panel.
#[wasm_bindgen]
pub fn interpolate_query(query: &str) -> String {
    to_json(&interpolate(&InterpolateRequest::new(query)))
}

/// Get version information
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| {
        let error_result = InterpolateResult::from_error(
            issue_codes::SERIALIZATION_ERROR,
            "Failed to serialize result".to_string(),
        );
        serde_json::to_string(&error_result)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize error result"}"#.to_string())
    })
}
