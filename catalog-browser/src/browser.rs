//! Browse orchestration
//!
//! [`CatalogBrowser`] ties the pieces together for each request: validate the
//! table name, read its columns, count, paginate, fetch and decode. It holds
//! no per-request state; the only thing shared between requests is the
//! provider's pool and, when enabled, the column cache.

use moka::future::Cache;
use std::future::Future;
use std::sync::Arc;

use crate::config::{BrowserConfig, COLUMN_CACHE_CAPACITY};
use crate::database::traits::{BrowseError, CatalogProvider};
use crate::identifier::{validate, SafeIdentifier};
use crate::pagination::paginate;
use crate::query::{build_count_query, build_list_query, build_row_by_key_query, KEY_COLUMN};
use crate::schema::{BrowsePage, ColumnDescriptor, RowDetail, TableColumns, TableDescriptor};

type ColumnCache = Cache<SafeIdentifier, Arc<Vec<ColumnDescriptor>>>;

/// Generic table browser over one database
pub struct CatalogBrowser<DB: CatalogProvider> {
    database: DB,
    config: BrowserConfig,
    column_cache: Option<ColumnCache>,
}

impl<DB: CatalogProvider> CatalogBrowser<DB> {
    /// Create a browser over `database` with the given policy
    pub fn new(database: DB, config: BrowserConfig) -> Self {
        let column_cache = config.column_cache_ttl.map(|ttl| {
            Cache::builder()
                .max_capacity(COLUMN_CACHE_CAPACITY)
                .time_to_live(ttl)
                .build()
        });

        Self {
            database,
            config,
            column_cache,
        }
    }

    /// List the browsable tables of the configured scope
    pub async fn list_tables(&self) -> Result<Vec<TableDescriptor>, BrowseError> {
        self.with_timeout(self.database.list_tables(&self.config.scope))
            .await
    }

    /// Column layout of `table`
    pub async fn describe_table(&self, table: &str) -> Result<TableColumns, BrowseError> {
        self.with_timeout(self.describe_table_inner(table)).await
    }

    /// One page of `table`, newest-first by its first column
    pub async fn browse(
        &self,
        table: &str,
        requested_page: Option<i64>,
    ) -> Result<BrowsePage, BrowseError> {
        self.with_timeout(self.browse_inner(table, requested_page))
            .await
    }

    /// The row of `table` whose `id` equals `key`
    pub async fn view_row(&self, table: &str, key: &str) -> Result<RowDetail, BrowseError> {
        self.with_timeout(self.view_row_inner(table, key)).await
    }

    /// Forget the cached columns of `table` after a schema change
    pub async fn invalidate_columns(&self, table: &str) -> Result<(), BrowseError> {
        let table = validate(table)?;
        if let Some(cache) = &self.column_cache {
            cache.invalidate(&table).await;
        }
        Ok(())
    }

    async fn describe_table_inner(&self, table: &str) -> Result<TableColumns, BrowseError> {
        let table = validate(table)?;
        let columns = self.columns(&table).await?;
        Ok(TableColumns {
            table,
            columns: columns.as_ref().clone(),
        })
    }

    async fn browse_inner(
        &self,
        table: &str,
        requested_page: Option<i64>,
    ) -> Result<BrowsePage, BrowseError> {
        let table = validate(table)?;
        let columns = self.columns(&table).await?;
        let scope = &self.config.scope;

        // Counted right before the page query so totals match the page
        let total_rows = self
            .database
            .fetch_count(&build_count_query(scope, &table))
            .await?;
        let pagination = paginate(
            total_rows,
            requested_page.unwrap_or(1),
            self.config.page_size,
        );

        let query = build_list_query(
            self.database.dialect(),
            scope,
            &table,
            &columns,
            pagination.page_size,
            pagination.offset,
        )?;
        let decoded = self.database.fetch_rows(&query, &columns).await?;

        if !decoded.dropped.is_empty() {
            tracing::warn!(
                %table,
                page = pagination.page,
                dropped = decoded.dropped.len(),
                "Page returned with undecodable rows left out"
            );
        }

        Ok(BrowsePage {
            table,
            columns: columns.as_ref().clone(),
            rows: decoded.rows,
            dropped_rows: decoded.dropped,
            pagination,
        })
    }

    async fn view_row_inner(&self, table: &str, key: &str) -> Result<RowDetail, BrowseError> {
        let table = validate(table)?;
        let columns = self.columns(&table).await?;

        let query = build_row_by_key_query(
            self.database.dialect(),
            &self.config.scope,
            &table,
            &columns,
            KEY_COLUMN,
            key,
        )?;
        let decoded = self.database.fetch_rows(&query, &columns).await?;

        if decoded.rows.is_empty() && decoded.dropped.is_empty() {
            return Err(BrowseError::NotFound(format!("{}/{}", table, key)));
        }

        Ok(RowDetail {
            table,
            columns: columns.as_ref().clone(),
            row: decoded.rows.into_iter().next(),
            dropped_rows: decoded.dropped,
        })
    }

    /// Columns of a validated table; an empty result is `NotFound`
    ///
    /// With caching enabled, concurrent callers for the same table share one
    /// catalog read and the entry is published only once complete. Failures
    /// and missing tables are never cached.
    async fn columns(
        &self,
        table: &SafeIdentifier,
    ) -> Result<Arc<Vec<ColumnDescriptor>>, BrowseError> {
        let load = self.load_columns(table);

        match &self.column_cache {
            Some(cache) => cache
                .try_get_with(table.clone(), load)
                .await
                .map_err(|error| error.as_ref().clone()),
            None => load.await,
        }
    }

    async fn load_columns(
        &self,
        table: &SafeIdentifier,
    ) -> Result<Arc<Vec<ColumnDescriptor>>, BrowseError> {
        let columns = self
            .database
            .describe_columns(&self.config.scope, table)
            .await?;
        if columns.is_empty() {
            return Err(BrowseError::NotFound(table.to_string()));
        }
        Ok(Arc::new(columns))
    }

    async fn with_timeout<T>(
        &self,
        operation: impl Future<Output = Result<T, BrowseError>>,
    ) -> Result<T, BrowseError> {
        tokio::time::timeout(self.config.query_timeout, operation)
            .await
            .map_err(|_| BrowseError::Timeout)?
    }
}
