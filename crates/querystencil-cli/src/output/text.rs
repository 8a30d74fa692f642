//! Plain-text output formatting.

use super::json::SourceResult;
use owo_colors::OwoColorize;
use querystencil_core::{InterpolateResult, Severity};
use std::fmt::Write;

/// Format the rewritten queries as SQL text.
///
/// Several inputs are separated by a `-- <source>` comment line. Inputs that
/// produced no query are left out; their issues go to stderr.
pub fn format_text(results: &[SourceResult<'_>]) -> String {
    let mut out = String::new();
    let tagged = results.len() > 1;

    for entry in results {
        let Some(query) = &entry.result.query else {
            continue;
        };
        if tagged {
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = writeln!(out, "-- {}", entry.source_name);
        }
        out.push_str(query);
        out.push('\n');
    }

    out
}

/// Format the issues of one result for stderr.
pub fn format_issues(source_name: &str, result: &InterpolateResult, colored: bool) -> String {
    let mut out = String::new();

    for issue in &result.issues {
        let level = match issue.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        let level = match (colored, issue.severity) {
            (false, _) => level.to_string(),
            (true, Severity::Error) => level.red().bold().to_string(),
            (true, Severity::Warning) => level.yellow().bold().to_string(),
        };

        let location = issue
            .offset
            .map(|offset| format!(" ({source_name}, offset {offset})"))
            .unwrap_or_else(|| format!(" ({source_name})"));

        let _ = writeln!(
            out,
            "querystencil: {level}:{location} [{}] {}",
            issue.code, issue.message
        );
    }

    out
}
