//! JSON output formatting.

use querystencil_core::InterpolateResult;
use serde::Serialize;

/// One interpolated input in a multi-file JSON report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceResult<'a> {
    pub source_name: &'a str,
    #[serde(flatten)]
    pub result: &'a InterpolateResult,
}

/// Format interpolation results as JSON.
///
/// A single input is written as a bare result object; several inputs become an
/// array tagged with their source names. If `compact` is true, outputs minified
/// JSON without whitespace.
pub fn format_json(results: &[SourceResult<'_>], compact: bool) -> serde_json::Result<String> {
    match results {
        [single] => to_string(single.result, compact),
        _ => to_string(&results, compact),
    }
}

fn to_string<T: Serialize + ?Sized>(value: &T, compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
}
