//! `$__conditionalAll(<expr>, <variable>)` expansion.
//!
//! The macro keeps `<expr>` when the variable has a concrete selection and
//! collapses to `1=1` when it selects everything (empty, or `$__all`):
//!
//! ```text
//! WHERE $__conditionalAll(region IN ($region), $region)
//!   region = EU   ->  WHERE region IN ($region)
//!   region = All  ->  WHERE 1=1
//! ```
//!
//! Macro offsets are collected in one pass and resolved right to left, so each
//! replacement only moves text that has already been handled. A macro nested in
//! another macro's expression is therefore expanded before its parent.

use crate::types::{find_variable, TemplateVariable};
use std::ops::Range;

/// The macro name including its opening parenthesis.
pub const CONDITIONAL_ALL: &str = "$__conditionalAll(";

const TAUTOLOGY: &str = "1=1";

/// One `$__conditionalAll(...)` call found in a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroInvocation<'a> {
    /// Byte range of the whole call, `$` through the closing `)`.
    pub span: Range<usize>,
    /// First argument, exactly as written.
    pub expression: &'a str,
    /// Second argument, exactly as written.
    pub variable_ref: &'a str,
}

impl MacroInvocation<'_> {
    pub fn variable_name(&self) -> &str {
        variable_name(self.variable_ref)
    }
}

/// Outcome of expanding every macro in a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub query: String,
    /// Number of macro calls that were replaced.
    pub expanded: usize,
    /// Offset of the malformed call that stopped expansion, if any.
    pub malformed_at: Option<usize>,
}

/// Expands `$__conditionalAll` macros against a variable snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacroExpander;

impl MacroExpander {
    pub fn new() -> Self {
        Self
    }

    /// Replaces every macro call in `query`.
    ///
    /// A malformed call (unbalanced parentheses, not exactly two arguments) stops
    /// expansion; the query is returned as rewritten up to that point, so a query
    /// whose only macro is malformed comes back unchanged.
    pub fn expand(&self, query: &str, variables: &[TemplateVariable]) -> String {
        self.expand_with_report(query, variables).query
    }

    pub fn expand_with_report(&self, query: &str, variables: &[TemplateVariable]) -> Expansion {
        let offsets = macro_offsets(query);
        let mut buffer = query.to_string();
        let mut expanded = 0;

        for &start in offsets.iter().rev() {
            let parsed = parse_invocation(&buffer, start).map(|invocation| {
                let replacement = resolve(&invocation, variables).to_string();
                (invocation.span, replacement)
            });
            let Some((span, replacement)) = parsed else {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    offset = start,
                    "Malformed $__conditionalAll call; expansion stopped"
                );
                return Expansion {
                    query: buffer,
                    expanded,
                    malformed_at: Some(start),
                };
            };
            buffer.replace_range(span, &replacement);
            expanded += 1;
        }

        Expansion {
            query: buffer,
            expanded,
            malformed_at: None,
        }
    }
}

/// Byte offsets of every macro token in `query`, left to right.
pub fn macro_offsets(query: &str) -> Vec<usize> {
    query
        .match_indices(CONDITIONAL_ALL)
        .map(|(offset, _)| offset)
        .collect()
}

/// Parses the macro call whose token starts at `start`.
///
/// Only parentheses are tracked. Arguments are split on commas at nesting depth
/// one, and quotes carry no meaning, so an apostrophe in an identifier or a
/// comment cannot hide the closing `)`.
pub fn parse_invocation(query: &str, start: usize) -> Option<MacroInvocation<'_>> {
    if !query.get(start..)?.starts_with(CONDITIONAL_ALL) {
        return None;
    }
    let open = start + CONDITIONAL_ALL.len() - 1;

    let mut depth = 0usize;
    let mut separators = Vec::new();
    let mut close = None;

    for (index, byte) in query.bytes().enumerate().skip(open) {
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(index);
                    break;
                }
            }
            b',' if depth == 1 => separators.push(index),
            _ => {}
        }
    }

    let close = close?;
    let [comma] = separators[..] else {
        return None;
    };

    Some(MacroInvocation {
        span: start..close + 1,
        expression: &query[open + 1..comma],
        variable_ref: &query[comma + 1..close],
    })
}

/// Strips variable reference syntax: `$name`, `${name}`, `${name:format}`, `[[name]]`.
pub fn variable_name(reference: &str) -> &str {
    let reference = reference.trim();
    let braced = reference
        .strip_prefix("${")
        .and_then(|inner| inner.strip_suffix('}'))
        .or_else(|| {
            reference
                .strip_prefix("[[")
                .and_then(|inner| inner.strip_suffix("]]"))
        });

    match braced {
        Some(inner) => inner.split_once(':').map_or(inner, |(name, _)| name).trim(),
        None => reference.strip_prefix('$').unwrap_or(reference),
    }
}

fn resolve<'a>(invocation: &MacroInvocation<'a>, variables: &[TemplateVariable]) -> &'a str {
    let name = invocation.variable_name();
    match find_variable(variables, name) {
        Some(variable) if variable.value().selects_everything() => TAUTOLOGY,
        Some(_) => invocation.expression,
        None => {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                variable = name,
                "Unknown variable in $__conditionalAll; keeping expression"
            );
            invocation.expression
        }
    }
}
