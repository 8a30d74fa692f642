//! Rendering of the filter expression placed inside `additional_table_filters`.

use crate::types::Filter;

/// Joins `filters` into one filter expression.
///
/// Each filter renders as `" <column> <operator> <value> <condition>"`. The
/// condition of the last filter is dropped, which leaves a trailing space.
pub fn build_filter_clause(filters: &[Filter]) -> String {
    let last = filters.len().saturating_sub(1);
    filters
        .iter()
        .enumerate()
        .map(|(index, filter)| {
            let (_, column) = filter.split_key();
            let condition = if index == last {
                ""
            } else {
                filter.join_condition()
            };
            format!(
                " {column} {} {} {condition}",
                filter.operator,
                render_value(&filter.value)
            )
        })
        .collect()
}

/// Renders a filter value.
///
/// Numeric literals are emitted bare. Anything else becomes a string literal
/// whose quotes are backslash-escaped, since the whole expression is itself
/// embedded in a single-quoted setting value.
///
/// Only plain decimal numbers count as numeric: hex (`0x10`), `Infinity`, `NaN`
/// and the empty string are quoted.
pub fn render_value(value: &str) -> String {
    match numeric_literal(value) {
        Some(number) => number,
        None => format!(r"\'{}\'", escape_nested(value)),
    }
}

fn numeric_literal(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Integers keep their digits so large ids survive without float rounding.
    let unsigned = trimmed.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(trimmed);
    if !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit()) {
        let digits = unsigned.trim_start_matches('0');
        let digits = if digits.is_empty() { "0" } else { digits };
        return Some(if trimmed.starts_with('-') && digits != "0" {
            format!("-{digits}")
        } else {
            digits.to_string()
        });
    }

    // Restrict to plain decimal syntax; Rust also parses "inf" and "NaN".
    if !trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    let number: f64 = trimmed.parse().ok()?;
    if !number.is_finite() {
        return None;
    }
    Some(if number == 0.0 {
        "0".to_string()
    } else {
        number.to_string()
    })
}

/// Escapes a value for a string literal nested inside another string literal.
///
/// ClickHouse unescapes the outer setting value first, so `'` must reach the
/// inner literal as `\'` and `\` as `\\`.
fn escape_nested(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str(r"\\\\"),
            '\'' => escaped.push_str(r"\\\'"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
