//! CatalogBrowserLayer - Axum integration
//!
//! This module provides the entry point for mounting the catalog browser into
//! an Axum application.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::{
    browse_rows_handler, describe_table_handler, list_tables_handler, view_row_handler,
};
use crate::browser::CatalogBrowser;
use crate::config::BrowserConfig;
use crate::database::traits::CatalogProvider;

#[cfg(feature = "sqlite")]
use crate::database::sqlite::SqliteProvider;

#[cfg(feature = "postgres")]
use crate::database::postgres::PostgresProvider;

/// Router factory for a [`CatalogBrowser`]
///
/// # Example
///
/// ```rust,no_run
/// use axum::Router;
/// use catalog_browser::{BrowserConfig, CatalogBrowserLayer};
/// use sqlx::SqlitePool;
///
/// # async fn example() {
/// let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
/// let config = BrowserConfig::for_scope("main").unwrap();
/// let layer = CatalogBrowserLayer::sqlite("/catalog", pool, config);
/// let app: Router = Router::new().merge(layer.into_router());
/// # }
/// ```
pub struct CatalogBrowserLayer<DB: CatalogProvider> {
    base_path: String,
    browser: Arc<CatalogBrowser<DB>>,
}

impl<DB: CatalogProvider> CatalogBrowserLayer<DB> {
    /// Mount an already constructed browser at `base_path`
    ///
    /// # Arguments
    ///
    /// * `base_path` - URL prefix for the API (e.g., "/catalog")
    /// * `browser` - The browser handle, owned by the caller's composition root
    pub fn new(base_path: impl Into<String>, browser: Arc<CatalogBrowser<DB>>) -> Self {
        Self {
            base_path: base_path.into(),
            browser,
        }
    }

    /// Convert into an Axum Router that can be merged
    ///
    /// The returned router serves:
    /// - `GET {base_path}/api/tables`
    /// - `GET {base_path}/api/tables/{name}`
    /// - `GET {base_path}/api/tables/{name}/rows?page=N`
    /// - `GET {base_path}/api/tables/{name}/rows/{id}`
    pub fn into_router(self) -> Router {
        // Axum 0.8 uses {param} syntax instead of :param
        let api_router = Router::new()
            .route("/tables", get(list_tables_handler::<DB>))
            .route("/tables/{name}", get(describe_table_handler::<DB>))
            .route("/tables/{name}/rows", get(browse_rows_handler::<DB>))
            .route("/tables/{name}/rows/{id}", get(view_row_handler::<DB>))
            .with_state(self.browser);

        Router::new()
            .nest(&format!("{}/api", self.base_path), api_router)
            .layer(CorsLayer::permissive())
    }
}

#[cfg(feature = "sqlite")]
impl CatalogBrowserLayer<SqliteProvider> {
    /// Browser over a SQLite pool
    ///
    /// # Arguments
    ///
    /// * `base_path` - The URL path where the API will be mounted
    /// * `pool` - The SQLite connection pool
    /// * `config` - Browse policy; the scope is usually `main`
    pub fn sqlite(
        base_path: impl Into<String>,
        pool: sqlx::SqlitePool,
        config: BrowserConfig,
    ) -> Self {
        let browser = CatalogBrowser::new(SqliteProvider::new(pool), config);
        Self::new(base_path, Arc::new(browser))
    }
}

#[cfg(feature = "postgres")]
impl CatalogBrowserLayer<PostgresProvider> {
    /// Browser over a PostgreSQL pool
    ///
    /// # Arguments
    ///
    /// * `base_path` - The URL path where the API will be mounted
    /// * `pool` - The PostgreSQL connection pool
    /// * `config` - Browse policy; the scope is usually `public`
    pub fn postgres(
        base_path: impl Into<String>,
        pool: sqlx::PgPool,
        config: BrowserConfig,
    ) -> Self {
        let browser = CatalogBrowser::new(PostgresProvider::new(pool), config);
        Self::new(base_path, Arc::new(browser))
    }
}
