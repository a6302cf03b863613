//! # catalog-browser
//!
//! Generic table introspection and paginated browsing for relational
//! databases whose schema is only known at runtime.
//!
//! ## Features
//!
//! - Catalog discovery: browsable tables with row counts, ordered columns
//! - Allow-list validation of every table, column and schema name
//! - Dynamic SELECTs with identifiers quoted and all values bound
//! - Schema-driven decoding into a closed set of value kinds
//! - Page arithmetic with undecodable rows reported, not hidden
//! - Support for PostgreSQL and SQLite
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use axum::{Router, routing::get};
//! use catalog_browser::{BrowserConfig, CatalogBrowserLayer};
//! use sqlx::PgPool;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = PgPool::connect("postgres://localhost/admin")
//!         .await
//!         .unwrap();
//!
//!     let app = Router::new()
//!         .route("/", get(|| async { "Hello, World!" }))
//!         .merge(
//!             CatalogBrowserLayer::postgres("/catalog", pool, BrowserConfig::default())
//!                 .into_router(),
//!         );
//!
//!     // Serve the application...
//! }
//! ```

// Public modules
pub mod api;
pub mod browser;
pub mod config;
pub mod database;
pub mod decode;
pub mod identifier;
pub mod layer;
pub mod pagination;
pub mod query;
pub mod schema;

// Public exports
pub use browser::CatalogBrowser;
pub use config::BrowserConfig;
pub use decode::{DecodeError, DecodedValue, DroppedRow, RawPayload};
pub use identifier::{validate, InvalidIdentifier, SafeIdentifier};
pub use layer::CatalogBrowserLayer;
pub use pagination::{paginate, Pagination};
pub use schema::{
    BrowsePage, ColumnDescriptor, ColumnType, RowDetail, RowView, TableColumns, TableDescriptor,
};

// Re-export database providers
pub use database::traits::{BrowseError, CatalogProvider};

#[cfg(feature = "sqlite")]
pub use database::sqlite::SqliteProvider;

#[cfg(feature = "postgres")]
pub use database::postgres::PostgresProvider;
