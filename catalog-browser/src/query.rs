//! Dynamic query construction
//!
//! Structural parts of a statement (schema, table and column names) are
//! string-built from [`SafeIdentifier`]s and the catalog's column list. Every
//! literal value (page size, offset, key) travels as a bound parameter.

use sqlx::types::{Decimal, Uuid};
use std::str::FromStr;

use crate::database::traits::BrowseError;
use crate::identifier::{validate, SafeIdentifier};
use crate::schema::{ColumnDescriptor, ColumnType};

/// Column a row lookup matches against
pub const KEY_COLUMN: &str = "id";

/// SQL flavor, which decides the placeholder syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `$1`, `$2`, ...
    Postgres,
    /// `?`
    Sqlite,
}

impl Dialect {
    /// Placeholder for the 1-based parameter `position`
    pub fn placeholder(self, position: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", position),
            Dialect::Sqlite => "?".to_string(),
        }
    }
}

/// A value bound to a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParam {
    Int(i64),
    Text(String),
}

/// SQL text plus the parameters to bind, in placeholder order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

fn qualified_table(scope: &SafeIdentifier, table: &SafeIdentifier) -> String {
    format!("{}.{}", scope.quoted(), table.quoted())
}

fn select_list(columns: &[ColumnDescriptor]) -> String {
    columns
        .iter()
        .map(|column| column.name.quoted())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the page query: every column, newest-first by the first column
///
/// Ordering by the first column descending is only a stable default; it says
/// nothing about business ordering.
pub fn build_list_query(
    dialect: Dialect,
    scope: &SafeIdentifier,
    table: &SafeIdentifier,
    columns: &[ColumnDescriptor],
    page_size: u32,
    offset: u64,
) -> Result<BuiltQuery, BrowseError> {
    let first = columns
        .first()
        .ok_or_else(|| BrowseError::NotFound(table.to_string()))?;

    let sql = format!(
        "SELECT {} FROM {} ORDER BY {} DESC LIMIT {} OFFSET {}",
        select_list(columns),
        qualified_table(scope, table),
        first.name.quoted(),
        dialect.placeholder(1),
        dialect.placeholder(2),
    );

    Ok(BuiltQuery {
        sql,
        params: vec![
            QueryParam::Int(i64::from(page_size)),
            QueryParam::Int(i64::try_from(offset).unwrap_or(i64::MAX)),
        ],
    })
}

/// Build the unfiltered row count query
pub fn build_count_query(scope: &SafeIdentifier, table: &SafeIdentifier) -> BuiltQuery {
    BuiltQuery {
        sql: format!("SELECT COUNT(*) FROM {}", qualified_table(scope, table)),
        params: Vec::new(),
    }
}

/// Whether `key_value` can be a value of the native key type
///
/// Only checked for types whose text form is cheap to verify here; anything
/// else is left to the server.
fn key_parses_as(native_type: &str, key_value: &str) -> bool {
    match native_type.to_ascii_lowercase().as_str() {
        "uuid" => Uuid::parse_str(key_value.trim()).is_ok(),
        "numeric" | "decimal" => Decimal::from_str(key_value.trim()).is_ok(),
        _ => true,
    }
}

/// Build a lookup of the row whose `key_column` equals `key_value`
///
/// Fails with [`BrowseError::NoPrimaryKey`] when the table has no such column.
/// An integer key column only admits keys that parse as `i64`, and uuid or
/// numeric columns only keys of that form; anything else is
/// [`BrowseError::NotFound`] since no row could match.
pub fn build_row_by_key_query(
    dialect: Dialect,
    scope: &SafeIdentifier,
    table: &SafeIdentifier,
    columns: &[ColumnDescriptor],
    key_column: &str,
    key_value: &str,
) -> Result<BuiltQuery, BrowseError> {
    let key = columns
        .iter()
        .find(|column| column.name.as_str() == key_column)
        .ok_or_else(|| BrowseError::NoPrimaryKey(table.to_string()))?;

    let (placeholder, param) = match key.column_type {
        ColumnType::Integer => {
            let value = key_value
                .trim()
                .parse::<i64>()
                .map_err(|_| BrowseError::NotFound(format!("{}/{}", table, key_value)))?;
            (dialect.placeholder(1), QueryParam::Int(value))
        }
        _ => {
            if !key_parses_as(&key.native_type, key_value) {
                return Err(BrowseError::NotFound(format!("{}/{}", table, key_value)));
            }
            let placeholder = match (dialect, validate(&key.native_type)) {
                // Let the server parse text into uuid, varchar, ... itself
                (Dialect::Postgres, Ok(native_type)) => {
                    format!("CAST({} AS {})", dialect.placeholder(1), native_type.quoted())
                }
                _ => dialect.placeholder(1),
            };
            (placeholder, QueryParam::Text(key_value.to_string()))
        }
    };

    let sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        select_list(columns),
        qualified_table(scope, table),
        key.name.quoted(),
        placeholder,
    );

    Ok(BuiltQuery {
        sql,
        params: vec![param],
    })
}
