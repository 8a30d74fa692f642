//! Fuzz target for `$__conditionalAll` expansion.
//!
//! Exercises the argument scanner on arbitrary text with the macro prefix
//! spliced in, which random strings alone would almost never contain.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use querystencil_core::templater::CONDITIONAL_ALL;
use querystencil_core::{MacroExpander, TemplateVariable, ALL_VALUES};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    chunks: Vec<String>,
    all_selected: bool,
}

fuzz_target!(|input: FuzzInput| {
    let query = input.chunks.join(CONDITIONAL_ALL);
    let value = if input.all_selected { ALL_VALUES } else { "x" };
    let variables = vec![TemplateVariable::new("v", value)];

    let expanded = MacroExpander::new().expand(&query, &variables);
    // Every expansion replaces a call with a piece of itself or `1=1`.
    assert!(expanded.len() <= query.len());
});
