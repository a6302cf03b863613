//! SQLite database provider implementation

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::error::BoxDynError;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool, TypeInfo, ValueRef};

use crate::database::traits::{BrowseError, CatalogProvider};
use crate::decode::{decode_rows, DecodedRows, RawPayload, RawRow};
use crate::identifier::{validate, SafeIdentifier};
use crate::query::{build_count_query, BuiltQuery, Dialect, QueryParam};
use crate::schema::{ColumnDescriptor, ColumnType, TableDescriptor};

/// SQLite database provider
pub struct SqliteProvider {
    pool: SqlitePool,
}

impl SqliteProvider {
    /// Create a new SQLite provider
    ///
    /// # Arguments
    ///
    /// * `pool` - SQLite connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Map a declared column type to the decoder vocabulary
    ///
    /// SQLite accepts any type name, so this follows its affinity rules
    /// (substring matches) with boolean and date/time names split out.
    pub fn map_declared_type(declared_type: &str) -> ColumnType {
        let declared = declared_type.to_ascii_uppercase();
        let has = |needle: &str| declared.contains(needle);

        if declared.is_empty() {
            ColumnType::Unknown
        } else if has("BOOL") {
            ColumnType::Boolean
        } else if has("INT") {
            ColumnType::Integer
        } else if has("CHAR") || has("CLOB") || has("TEXT") {
            ColumnType::Text
        } else if has("REAL") || has("FLOA") || has("DOUB") {
            ColumnType::Float
        } else if has("DATE") || has("TIME") {
            ColumnType::Timestamp
        } else if has("BLOB") || has("JSON") {
            ColumnType::Raw
        } else {
            ColumnType::Unknown
        }
    }

    /// Attach the bound parameters of a built query
    fn prepare(query: &BuiltQuery) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        let mut prepared = sqlx::query(&query.sql);
        for param in &query.params {
            prepared = match param {
                QueryParam::Int(value) => prepared.bind(*value),
                QueryParam::Text(value) => prepared.bind(value.as_str()),
            };
        }
        prepared
    }
}

#[async_trait]
impl CatalogProvider for SqliteProvider {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn list_tables(
        &self,
        scope: &SafeIdentifier,
    ) -> Result<Vec<TableDescriptor>, BrowseError> {
        let query = format!(
            "SELECT name FROM {}.sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            scope.quoted()
        );

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        let mut tables = Vec::with_capacity(rows.len());
        for row in rows {
            let raw_name: String = row.try_get("name")?;

            let name = match validate(&raw_name) {
                Ok(name) => name,
                Err(error) => {
                    tracing::warn!(table = %raw_name, %error, "Skipping table with unsupported name");
                    continue;
                }
            };

            let row_count = match self.fetch_count(&build_count_query(scope, &name)).await {
                Ok(count) => Some(count),
                Err(error) => {
                    tracing::warn!(table = %name, %error, "Failed to count rows");
                    None
                }
            };

            tables.push(TableDescriptor {
                schema: scope.clone(),
                name,
                row_count,
                description: None,
            });
        }

        Ok(tables)
    }

    async fn describe_columns(
        &self,
        scope: &SafeIdentifier,
        table: &SafeIdentifier,
    ) -> Result<Vec<ColumnDescriptor>, BrowseError> {
        // Table-valued form of PRAGMA table_info, so both names can be bound
        let query = r#"
            SELECT cid, name, type, "notnull", dflt_value
            FROM pragma_table_info(?, ?)
            ORDER BY cid
        "#;

        let rows = sqlx::query(query)
            .bind(table.as_str())
            .bind(scope.as_str())
            .fetch_all(&self.pool)
            .await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let column_id: i64 = row.try_get("cid")?;
            let raw_name: String = row.try_get("name")?;
            let declared_type: String = row.try_get("type")?;
            let not_null: i64 = row.try_get("notnull")?;
            let default_value: Option<String> =
                row.try_get::<Option<String>, _>("dflt_value").ok().flatten();

            let name = match validate(&raw_name) {
                Ok(name) => name,
                Err(error) => {
                    tracing::warn!(%table, column = %raw_name, %error, "Skipping column with unsupported name");
                    continue;
                }
            };

            columns.push(ColumnDescriptor {
                ordinal: u32::try_from(column_id + 1).unwrap_or_default(),
                name,
                column_type: Self::map_declared_type(&declared_type),
                native_type: declared_type,
                nullable: not_null == 0,
                default_value,
            });
        }

        Ok(columns)
    }

    async fn fetch_count(&self, query: &BuiltQuery) -> Result<u64, BrowseError> {
        tracing::debug!(sql = %query.sql, "Counting rows");
        let row = Self::prepare(query).fetch_one(&self.pool).await?;
        let count: i64 = row.try_get(0)?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn fetch_rows(
        &self,
        query: &BuiltQuery,
        columns: &[ColumnDescriptor],
    ) -> Result<DecodedRows, BrowseError> {
        tracing::debug!(sql = %query.sql, params = ?query.params, "Fetching rows");
        let rows = Self::prepare(query).fetch_all(&self.pool).await?;
        Ok(decode_rows(columns, &rows))
    }
}

// SQLite is dynamically typed: type checks below run against the storage
// class of each value, not the declared column type.
impl RawRow for SqliteRow {
    fn is_null(&self, index: usize) -> Result<bool, BoxDynError> {
        Ok(self.try_get_raw(index)?.is_null())
    }

    fn boolean(&self, index: usize) -> Result<bool, BoxDynError> {
        Ok(self.try_get::<bool, _>(index)?)
    }

    fn integer(&self, index: usize) -> Result<i128, BoxDynError> {
        Ok(i128::from(self.try_get::<i64, _>(index)?))
    }

    fn float(&self, index: usize) -> Result<f64, BoxDynError> {
        match self.try_get::<f64, _>(index) {
            Ok(value) => Ok(value),
            // Whole numbers written to a REAL column may still come back as INTEGER
            Err(error) => self
                .try_get::<i64, _>(index)
                .map(|value| value as f64)
                .map_err(|_| error.into()),
        }
    }

    fn text(&self, index: usize) -> Result<String, BoxDynError> {
        Ok(self.try_get::<String, _>(index)?)
    }

    fn timestamp(&self, index: usize) -> Result<DateTime<Utc>, BoxDynError> {
        // Values without an offset are taken as UTC wall time
        if let Ok(value) = self.try_get::<DateTime<Utc>, _>(index) {
            return Ok(value);
        }
        if let Ok(value) = self.try_get::<NaiveDateTime, _>(index) {
            return Ok(value.and_utc());
        }
        let date = self.try_get::<NaiveDate, _>(index)?;
        Ok(date.and_time(NaiveTime::MIN).and_utc())
    }

    fn raw(&self, index: usize) -> Result<RawPayload, BoxDynError> {
        let storage = self.try_get_raw(index)?.type_info().name().to_string();
        if storage == "BLOB" {
            Ok(RawPayload::Bytes(self.try_get::<Vec<u8>, _>(index)?))
        } else {
            Ok(RawPayload::Text(self.try_get_unchecked::<String, _>(index)?))
        }
    }

    fn render(&self, index: usize) -> String {
        if let Ok(value) = self.try_get_unchecked::<String, _>(index) {
            return value;
        }
        if let Ok(value) = self.try_get_unchecked::<Vec<u8>, _>(index) {
            return format!("[BLOB: {} bytes]", value.len());
        }
        "<unrenderable>".to_string()
    }
}
