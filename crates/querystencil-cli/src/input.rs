//! Input handling for file reading and stdin support.

use anyhow::{Context, Result};
use std::io::{self, Read};
use std::path::PathBuf;

/// One query to interpolate, with the name it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery {
    pub name: String,
    pub content: String,
}

/// Read query input from files or stdin.
///
/// If no files are provided, reads from stdin. Each file holds one query.
pub fn read_input(files: &[PathBuf]) -> Result<Vec<SourceQuery>> {
    if files.is_empty() {
        read_from_stdin()
    } else {
        read_from_files(files)
    }
}

/// Read a query from stdin
fn read_from_stdin() -> Result<Vec<SourceQuery>> {
    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .context("Failed to read from stdin")?;

    Ok(vec![SourceQuery {
        name: "<stdin>".to_string(),
        content: trim_line_ending(content),
    }])
}

/// Read queries from multiple files
fn read_from_files(files: &[PathBuf]) -> Result<Vec<SourceQuery>> {
    files
        .iter()
        .map(|path| {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;

            Ok(SourceQuery {
                name: path.display().to_string(),
                content: trim_line_ending(content),
            })
        })
        .collect()
}

/// Editors and `echo` leave a final newline that would otherwise end up in
/// front of the appended settings clause.
fn trim_line_ending(mut content: String) -> String {
    let trimmed = content.trim_end_matches(|c: char| c == '\n' || c == '\r').len();
    content.truncate(trimmed);
    content
}
