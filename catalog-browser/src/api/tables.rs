//! Table listing and column layout endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use crate::api::error_response;
use crate::browser::CatalogBrowser;
use crate::database::traits::CatalogProvider;
use crate::schema::TablesResponse;

/// Handler for GET /api/tables
///
/// Returns the tables of the configured scope, ordered by name, with row
/// counts and descriptions.
///
/// Response:
/// ```json
/// {
///   "tables": [
///     { "schema": "public", "name": "orders", "rowCount": 2000, "description": null }
///   ]
/// }
/// ```
pub async fn list_tables_handler<DB: CatalogProvider>(
    State(browser): State<Arc<CatalogBrowser<DB>>>,
) -> Response {
    match browser.list_tables().await {
        Ok(tables) => (StatusCode::OK, Json(TablesResponse { tables })).into_response(),
        Err(error) => {
            tracing::error!(%error, "Failed to list tables");
            error_response(&error)
        }
    }
}

/// Handler for GET /api/tables/{name}
///
/// Returns the columns of one table in ordinal order, or 404 if the table
/// has no visible columns.
pub async fn describe_table_handler<DB: CatalogProvider>(
    State(browser): State<Arc<CatalogBrowser<DB>>>,
    Path(table_name): Path<String>,
) -> Response {
    match browser.describe_table(&table_name).await {
        Ok(columns) => (StatusCode::OK, Json(columns)).into_response(),
        Err(error) => {
            tracing::error!(table = %table_name, %error, "Failed to describe table");
            error_response(&error)
        }
    }
}
