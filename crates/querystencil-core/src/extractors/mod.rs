//! Table extraction for ad-hoc filter targeting.
//!
//! The ad-hoc filter source query (usually `SELECT DISTINCT col FROM table`) names
//! the table the dashboard's filters belong to. [`TableExtractor`] turns such a
//! query into a table name; an empty string means "could not tell".

use crate::parser::parse_sql_with_dialect;
use crate::types::Dialect;
use regex::Regex;
use sqlparser::ast::{ObjectName, Query, SetExpr, Statement, TableFactor, TableWithJoins};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Finds the primary table referenced by a query.
///
/// Implementations must be deterministic for a given query and return an empty
/// string when no table can be determined.
pub trait TableExtractor {
    fn primary_table(&self, query: &str) -> String;
}

impl<F> TableExtractor for F
where
    F: Fn(&str) -> String,
{
    fn primary_table(&self, query: &str) -> String {
        self(query)
    }
}

/// Extracts the first table of a query using sqlparser.
///
/// Queries that still contain template syntax (`$var`, macros) rarely parse, so a
/// lexical `FROM <table>` scan is used when parsing fails or finds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlTableExtractor {
    dialect: Dialect,
}

impl SqlTableExtractor {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

impl TableExtractor for SqlTableExtractor {
    fn primary_table(&self, query: &str) -> String {
        match parse_sql_with_dialect(query, self.dialect) {
            Ok(statements) => {
                if let Some(table) = extract_tables(&statements).into_iter().next() {
                    return table;
                }
            }
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(error = %_err, "Falling back to lexical table scan");
            }
        }
        lexical_primary_table(query).unwrap_or_default()
    }
}

/// Lists the tables a set of statements reads from, in order of appearance.
///
/// Tables of the outer query come first, then tables inside CTE bodies. CTE
/// names themselves are not tables and are skipped. Quoting is removed.
pub fn extract_tables(statements: &[Statement]) -> Vec<String> {
    let mut collector = TableCollector::default();

    for statement in statements {
        match statement {
            Statement::Query(query) => collector.query(query),
            Statement::Insert(insert) => {
                if let Some(source) = &insert.source {
                    collector.query(source);
                }
            }
            _ => {}
        }
    }

    collector.tables
}

#[derive(Default)]
struct TableCollector {
    tables: Vec<String>,
    cte_names: HashSet<String>,
}

impl TableCollector {
    fn query(&mut self, query: &Query) {
        let mut cte_bodies = Vec::new();
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.cte_names.insert(cte.alias.name.value.to_lowercase());
                cte_bodies.push(&cte.query);
            }
        }

        self.set_expr(&query.body);

        for body in cte_bodies {
            self.query(body);
        }
    }

    fn set_expr(&mut self, body: &SetExpr) {
        match body {
            SetExpr::Select(select) => {
                for table_with_joins in &select.from {
                    self.table_with_joins(table_with_joins);
                }
            }
            SetExpr::Query(query) => self.query(query),
            SetExpr::SetOperation { left, right, .. } => {
                self.set_expr(left);
                self.set_expr(right);
            }
            _ => {}
        }
    }

    fn table_with_joins(&mut self, table_with_joins: &TableWithJoins) {
        self.table_factor(&table_with_joins.relation);
        for join in &table_with_joins.joins {
            self.table_factor(&join.relation);
        }
    }

    fn table_factor(&mut self, table_factor: &TableFactor) {
        match table_factor {
            TableFactor::Table { name, .. } => self.push(name),
            TableFactor::Derived { subquery, .. } => self.query(subquery),
            TableFactor::NestedJoin {
                table_with_joins, ..
            } => self.table_with_joins(table_with_joins),
            _ => {}
        }
    }

    fn push(&mut self, name: &ObjectName) {
        let table = unquote(&name.to_string());
        if self.cte_names.contains(&table.to_lowercase()) || self.tables.contains(&table) {
            return;
        }
        self.tables.push(table);
    }
}

fn unquote(name: &str) -> String {
    name.replace(|c: char| c == '"' || c == '`', "")
}

/// First `FROM <table>` reference in the raw text.
fn lexical_primary_table(query: &str) -> Option<String> {
    static FROM_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = FROM_REGEX.get_or_init(|| {
        Regex::new(r#"(?i)\bFROM\s+((?:[`"]?[A-Za-z_][A-Za-z0-9_]*[`"]?\.)*[`"]?[A-Za-z_][A-Za-z0-9_]*[`"]?)"#)
            .expect("Invalid regex pattern")
    });

    let caps = re.captures(query)?;
    Some(unquote(caps.get(1)?.as_str()))
}
