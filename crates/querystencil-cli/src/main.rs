//! querystencil CLI - dashboard query templating

use querystencil_cli::cli;
use querystencil_cli::context;
use querystencil_cli::input;
use querystencil_cli::output;

use anyhow::{Context, Result};
use clap::Parser;
use is_terminal::IsTerminal;
use querystencil_core::interpolate;
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

use cli::{Args, OutputFormat};
use output::json::SourceResult;
use output::{format_issues, format_json, format_text};

/// At least one query could not be interpolated.
const EXIT_FAILURE: u8 = 1;
/// Configuration error (unreadable input, bad flag value, invalid context file).
const EXIT_CONFIG_ERROR: u8 = 66;

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("querystencil: error: {e:#}");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

fn run(args: Args) -> Result<bool> {
    let base = context::base_request(&args)?;
    let sources = input::read_input(&args.files)?;

    let results: Vec<_> = sources
        .iter()
        .map(|source| {
            let mut request = base.clone();
            request.query.clone_from(&source.content);
            interpolate(&request)
        })
        .collect();

    let entries: Vec<_> = sources
        .iter()
        .zip(&results)
        .map(|(source, result)| SourceResult {
            source_name: &source.name,
            result,
        })
        .collect();

    let output_str = match args.format {
        OutputFormat::Json => {
            format_json(&entries, args.compact).context("Failed to serialize JSON output")?
        }
        OutputFormat::Text => format_text(&entries),
    };

    write_output(&args.output, &output_str)?;

    // JSON output already carries the issues.
    if !args.quiet && args.format != OutputFormat::Json {
        print_issues_to_stderr(&entries);
    }

    Ok(results.iter().any(|result| result.has_errors))
}

fn write_output(path: &Option<std::path::PathBuf>, content: &str) -> Result<()> {
    if let Some(path) = path {
        fs::write(path, content)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    } else {
        io::stdout()
            .write_all(content.as_bytes())
            .context("Failed to write to stdout")?;
        // Ensure newline at end for terminal output
        if !content.is_empty() && !content.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}

fn print_issues_to_stderr(entries: &[SourceResult<'_>]) {
    let colored = io::stderr().is_terminal();
    for entry in entries {
        eprint!("{}", format_issues(entry.source_name, entry.result, colored));
    }
}
