//! Database provider trait
//!
//! This trait defines the interface that all database implementations must provide.

use async_trait::async_trait;
use thiserror::Error;

use crate::decode::DecodedRows;
use crate::identifier::{InvalidIdentifier, SafeIdentifier};
use crate::query::{BuiltQuery, Dialect};
use crate::schema::{ColumnDescriptor, TableDescriptor};

/// Catalog reader and query executor for one database engine
///
/// Providers only ever execute statements produced by [`crate::query`], so
/// every identifier they see has already been validated.
#[async_trait]
pub trait CatalogProvider: Send + Sync + 'static {
    /// Placeholder flavor for queries built against this provider
    fn dialect(&self) -> Dialect;

    /// List the tables of `scope` ordered by name, each with its row count
    async fn list_tables(&self, scope: &SafeIdentifier)
        -> Result<Vec<TableDescriptor>, BrowseError>;

    /// Columns of `table` in ordinal order
    ///
    /// Returns an empty sequence when the table does not exist; callers turn
    /// that into [`BrowseError::NotFound`].
    async fn describe_columns(
        &self,
        scope: &SafeIdentifier,
        table: &SafeIdentifier,
    ) -> Result<Vec<ColumnDescriptor>, BrowseError>;

    /// Run a `SELECT COUNT(*)` query
    async fn fetch_count(&self, query: &BuiltQuery) -> Result<u64, BrowseError>;

    /// Run a row query whose select list follows `columns`, decoding each row
    async fn fetch_rows(
        &self,
        query: &BuiltQuery,
        columns: &[ColumnDescriptor],
    ) -> Result<DecodedRows, BrowseError>;
}

/// Failure of a browse operation
#[derive(Debug, Clone, Error)]
pub enum BrowseError {
    /// A table, column or schema name was rejected
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifier),

    /// Table has no columns, or no row matched the key
    #[error("Not found: {0}")]
    NotFound(String),

    /// Row lookup on a table without an `id` column
    #[error("Table {0} has no id column")]
    NoPrimaryKey(String),

    /// Operation exceeded the configured timeout
    #[error("Query timeout exceeded")]
    Timeout,

    /// Transport or engine failure
    #[error("Database error: {0}")]
    Database(String),
}

/// SQLSTATE raised when text cannot be parsed as the target type
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

impl From<sqlx::Error> for BrowseError {
    fn from(error: sqlx::Error) -> Self {
        // Only a client-supplied key is ever cast from text, and a key that
        // is not a valid value of the column type matches no row
        if let sqlx::Error::Database(database_error) = &error {
            if database_error.code().as_deref() == Some(INVALID_TEXT_REPRESENTATION) {
                return BrowseError::NotFound(database_error.message().to_string());
            }
        }
        BrowseError::Database(error.to_string())
    }
}
