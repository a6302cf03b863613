//! PostgreSQL database provider implementation

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::types::{Decimal, JsonValue, Uuid};
use sqlx::{Column, PgPool, Postgres, Row, TypeInfo, ValueRef};

use crate::database::traits::{BrowseError, CatalogProvider};
use crate::decode::{decode_rows, DecodedRows, RawPayload, RawRow};
use crate::identifier::{validate, SafeIdentifier};
use crate::query::{build_count_query, BuiltQuery, Dialect, QueryParam};
use crate::schema::{ColumnDescriptor, ColumnType, TableDescriptor};

/// PostgreSQL database provider
pub struct PostgresProvider {
    pool: PgPool,
}

impl PostgresProvider {
    /// Create a new PostgreSQL provider
    ///
    /// # Arguments
    ///
    /// * `pool` - PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Map an `information_schema.columns.udt_name` to the decoder vocabulary
    pub fn map_native_type(udt_name: &str) -> ColumnType {
        match udt_name {
            "bool" => ColumnType::Boolean,
            "int2" | "int4" | "int8" => ColumnType::Integer,
            "float4" | "float8" => ColumnType::Float,
            "text" | "varchar" | "bpchar" | "name" => ColumnType::Text,
            "timestamp" | "timestamptz" | "date" => ColumnType::Timestamp,
            "json" | "jsonb" | "bytea" => ColumnType::Raw,
            _ => ColumnType::Unknown,
        }
    }

    /// Attach the bound parameters of a built query
    fn prepare(query: &BuiltQuery) -> Query<'_, Postgres, PgArguments> {
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
impl CatalogProvider for PostgresProvider {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn list_tables(
        &self,
        scope: &SafeIdentifier,
    ) -> Result<Vec<TableDescriptor>, BrowseError> {
        let query = r#"
            SELECT
                tablename::text AS table_name,
                obj_description(format('%I.%I', schemaname, tablename)::regclass, 'pg_class') AS description
            FROM pg_tables
            WHERE schemaname = $1
            ORDER BY tablename
        "#;

        let rows = sqlx::query(query)
            .bind(scope.as_str())
            .fetch_all(&self.pool)
            .await?;

        let mut tables = Vec::with_capacity(rows.len());
        for row in rows {
            let raw_name: String = row.try_get("table_name")?;
            let description: Option<String> = row.try_get("description")?;

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
                description,
            });
        }

        Ok(tables)
    }

    async fn describe_columns(
        &self,
        scope: &SafeIdentifier,
        table: &SafeIdentifier,
    ) -> Result<Vec<ColumnDescriptor>, BrowseError> {
        // information_schema uses domain types; cast to plain ones for decoding
        let query = r#"
            SELECT
                ordinal_position::int4 AS ordinal_position,
                column_name::text AS column_name,
                udt_name::text AS udt_name,
                is_nullable::text AS is_nullable,
                column_default::text AS column_default
            FROM information_schema.columns
            WHERE table_schema = $1
              AND table_name = $2
            ORDER BY ordinal_position
        "#;

        let rows = sqlx::query(query)
            .bind(scope.as_str())
            .bind(table.as_str())
            .fetch_all(&self.pool)
            .await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let ordinal: i32 = row.try_get("ordinal_position")?;
            let raw_name: String = row.try_get("column_name")?;
            let udt_name: String = row.try_get("udt_name")?;
            let is_nullable: String = row.try_get("is_nullable")?;
            let default_value: Option<String> = row.try_get("column_default")?;

            let name = match validate(&raw_name) {
                Ok(name) => name,
                Err(error) => {
                    tracing::warn!(%table, column = %raw_name, %error, "Skipping column with unsupported name");
                    continue;
                }
            };

            columns.push(ColumnDescriptor {
                ordinal: u32::try_from(ordinal).unwrap_or_default(),
                name,
                column_type: Self::map_native_type(&udt_name),
                native_type: udt_name,
                nullable: is_nullable == "YES",
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

impl RawRow for PgRow {
    fn is_null(&self, index: usize) -> Result<bool, BoxDynError> {
        Ok(self.try_get_raw(index)?.is_null())
    }

    fn boolean(&self, index: usize) -> Result<bool, BoxDynError> {
        Ok(self.try_get::<bool, _>(index)?)
    }

    fn integer(&self, index: usize) -> Result<i128, BoxDynError> {
        let value = match self.column(index).type_info().name() {
            "INT2" => i128::from(self.try_get::<i16, _>(index)?),
            "INT4" => i128::from(self.try_get::<i32, _>(index)?),
            _ => i128::from(self.try_get::<i64, _>(index)?),
        };
        Ok(value)
    }

    fn float(&self, index: usize) -> Result<f64, BoxDynError> {
        let value = match self.column(index).type_info().name() {
            "FLOAT4" => f64::from(self.try_get::<f32, _>(index)?),
            _ => self.try_get::<f64, _>(index)?,
        };
        Ok(value)
    }

    fn text(&self, index: usize) -> Result<String, BoxDynError> {
        Ok(self.try_get::<String, _>(index)?)
    }

    fn timestamp(&self, index: usize) -> Result<DateTime<Utc>, BoxDynError> {
        // Zone-less values are taken as UTC wall time
        let value = match self.column(index).type_info().name() {
            "TIMESTAMPTZ" => self.try_get::<DateTime<Utc>, _>(index)?,
            "TIMESTAMP" => self.try_get::<NaiveDateTime, _>(index)?.and_utc(),
            "DATE" => self
                .try_get::<NaiveDate, _>(index)?
                .and_time(NaiveTime::MIN)
                .and_utc(),
            other => return Err(format!("{} is not a timestamp type", other).into()),
        };
        Ok(value)
    }

    fn raw(&self, index: usize) -> Result<RawPayload, BoxDynError> {
        let payload = match self.column(index).type_info().name() {
            "JSON" | "JSONB" => RawPayload::Text(self.try_get::<JsonValue, _>(index)?.to_string()),
            "BYTEA" => RawPayload::Bytes(self.try_get::<Vec<u8>, _>(index)?),
            _ => RawPayload::Text(self.try_get::<String, _>(index)?),
        };
        Ok(payload)
    }

    fn render(&self, index: usize) -> String {
        if let Ok(value) = self.try_get::<String, _>(index) {
            return value;
        }
        if let Ok(value) = self.try_get::<Uuid, _>(index) {
            return value.to_string();
        }
        if let Ok(value) = self.try_get::<Decimal, _>(index) {
            return value.to_string();
        }
        if let Ok(value) = self.try_get::<JsonValue, _>(index) {
            return value.to_string();
        }
        if let Ok(value) = self.try_get::<NaiveTime, _>(index) {
            return value.to_string();
        }
        if let Ok(value) = self.try_get::<Vec<String>, _>(index) {
            return format!("{{{}}}", value.join(","));
        }
        if let Ok(value) = self.try_get::<Vec<i64>, _>(index) {
            let items: Vec<String> = value.iter().map(i64::to_string).collect();
            return format!("{{{}}}", items.join(","));
        }

        let type_name = self
            .columns()
            .get(index)
            .map(|column| column.type_info().name().to_string())
            .unwrap_or_default();
        format!("<{}>", type_name)
    }
}
