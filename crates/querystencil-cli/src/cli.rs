//! CLI argument parsing using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// querystencil - dashboard query templating
#[derive(Parser, Debug)]
#[command(name = "querystencil")]
#[command(
    about = "Apply ad-hoc filters, $__conditionalAll macros and variables to SQL",
    long_about = None
)]
#[command(version)]
pub struct Args {
    /// SQL files to interpolate (reads from stdin if none provided)
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// SQL dialect used to find the target table in --target-table-query
    #[arg(short, long, value_enum)]
    pub dialect: Option<DialectArg>,

    /// Output format
    #[arg(short, long, default_value = "text", value_enum)]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// JSON file with variables, filters and data source settings
    #[arg(long, value_name = "FILE")]
    pub context: Option<PathBuf>,

    /// Template variable in NAME=VALUE format; commas make a multi-value selection (can be repeated)
    #[arg(long = "var", value_name = "NAME=VALUE")]
    pub vars: Vec<String>,

    /// Ad-hoc filter such as `orders.status=shipped` or `id>=10` (can be repeated)
    #[arg(long = "filter", value_name = "KEY<OP>VALUE")]
    pub filters: Vec<String>,

    /// Condition joining the filters given with --filter
    #[arg(long, default_value = "AND")]
    pub condition: String,

    /// Table the ad-hoc filters apply to
    #[arg(long, value_name = "TABLE")]
    pub target_table: Option<String>,

    /// Query to extract the ad-hoc filter target table from
    #[arg(long, value_name = "SQL")]
    pub target_table_query: Option<String>,

    /// Treat the input as the ad-hoc filter source query (filters are not applied)
    #[arg(long)]
    pub filter_source: bool,

    /// Whether the data source allows ad-hoc filters
    #[arg(long = "ad-hoc", value_enum)]
    pub ad_hoc: Option<AdHocArg>,

    /// Suppress warnings on stderr
    #[arg(short, long)]
    pub quiet: bool,

    /// Compact JSON output (no pretty-printing)
    #[arg(short, long)]
    pub compact: bool,
}

/// SQL dialect options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    Generic,
    Clickhouse,
}

impl From<DialectArg> for querystencil_core::Dialect {
    fn from(d: DialectArg) -> Self {
        match d {
            DialectArg::Generic => querystencil_core::Dialect::Generic,
            DialectArg::Clickhouse => querystencil_core::Dialect::Clickhouse,
        }
    }
}

/// Ad-hoc filter switch for the data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AdHocArg {
    Enabled,
    Disabled,
    Unset,
}

impl From<AdHocArg> for querystencil_core::AdHocFilterMode {
    fn from(mode: AdHocArg) -> Self {
        match mode {
            AdHocArg::Enabled => querystencil_core::AdHocFilterMode::Enabled,
            AdHocArg::Disabled => querystencil_core::AdHocFilterMode::Disabled,
            AdHocArg::Unset => querystencil_core::AdHocFilterMode::Unset,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The rewritten query text
    Text,
    /// Full JSON result including issues
    Json,
}
