//! Row browsing endpoints with pagination

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use crate::api::error_response;
use crate::browser::CatalogBrowser;
use crate::database::traits::CatalogProvider;
use crate::schema::BrowseQuery;

/// Handler for GET /api/tables/{name}/rows
///
/// Fetches one page of rows, ordered by the table's first column descending.
///
/// Query parameters:
/// - page: 1-based page number (default: 1; values below 1 mean 1)
///
/// The page size is fixed by the browser configuration. Rows that could not
/// be decoded are listed under `droppedRows` instead of failing the request.
///
/// # Arguments
///
/// * `browser` - Catalog browser from state
/// * `table_name` - Name of the table to browse
/// * `query` - Page selection
pub async fn browse_rows_handler<DB: CatalogProvider>(
    State(browser): State<Arc<CatalogBrowser<DB>>>,
    Path(table_name): Path<String>,
    Query(query): Query<BrowseQuery>,
) -> Response {
    match browser.browse(&table_name, query.requested_page()).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(error) => {
            tracing::error!(table = %table_name, %error, "Failed to browse table");
            error_response(&error)
        }
    }
}

/// Handler for GET /api/tables/{name}/rows/{id}
///
/// Looks a single row up by its `id` column. Tables without an `id` column
/// answer 400, unknown tables and keys answer 404.
pub async fn view_row_handler<DB: CatalogProvider>(
    State(browser): State<Arc<CatalogBrowser<DB>>>,
    Path((table_name, key)): Path<(String, String)>,
) -> Response {
    match browser.view_row(&table_name, &key).await {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(error) => {
            tracing::error!(table = %table_name, %key, %error, "Failed to fetch row");
            error_response(&error)
        }
    }
}
