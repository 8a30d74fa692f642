use crate::error::ParseError;
use crate::types::Dialect;
use regex::Regex;
use sqlparser::ast::Statement;
use sqlparser::parser::Parser;
use std::sync::OnceLock;

/// Parse SQL using the specified dialect
pub fn parse_sql_with_dialect(sql: &str, dialect: Dialect) -> Result<Vec<Statement>, ParseError> {
    let sqlparser_dialect = dialect.to_sqlparser_dialect();
    match Parser::parse_sql(sqlparser_dialect.as_ref(), sql) {
        Ok(statements) => Ok(statements),
        Err(primary_err) => {
            // Query-level settings such as `additional_table_filters={...}` use map
            // literals the parser does not accept. The table list does not depend on them.
            if let Some(without_settings) = strip_settings_clause(sql) {
                if let Ok(statements) =
                    Parser::parse_sql(sqlparser_dialect.as_ref(), without_settings)
                {
                    return Ok(statements);
                }
            }
            Err(ParseError::from(primary_err).with_dialect(dialect))
        }
    }
}

/// Parse SQL using the ClickHouse dialect
pub fn parse_sql(sql: &str) -> Result<Vec<Statement>, ParseError> {
    parse_sql_with_dialect(sql, Dialect::Clickhouse)
}

fn strip_settings_clause(sql: &str) -> Option<&str> {
    static SETTINGS_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = SETTINGS_REGEX
        .get_or_init(|| Regex::new(r"(?i)\bsettings\b").expect("Invalid regex pattern"));
    let last = re.find_iter(sql).last()?;
    Some(&sql[..last.start()])
}
