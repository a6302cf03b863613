//! REST API endpoints
//!
//! This module contains all API endpoint handlers for the catalog browser.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::database::traits::BrowseError;

pub mod rows;
pub mod tables;

// Re-export handlers for convenience
pub use rows::{browse_rows_handler, view_row_handler};
pub use tables::{describe_table_handler, list_tables_handler};

/// Status code a browse failure is reported with
pub fn status_for(error: &BrowseError) -> StatusCode {
    match error {
        BrowseError::InvalidIdentifier(_) | BrowseError::NoPrimaryKey(_) => StatusCode::BAD_REQUEST,
        BrowseError::NotFound(_) => StatusCode::NOT_FOUND,
        BrowseError::Timeout => StatusCode::REQUEST_TIMEOUT,
        BrowseError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// JSON error body `{"error": "..."}` with the matching status code
pub(crate) fn error_response(error: &BrowseError) -> Response {
    (
        status_for(error),
        Json(serde_json::json!({
            "error": error.to_string()
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::validate;

    #[test]
    fn test_status_for() {
        let invalid = BrowseError::from(validate("a;b").unwrap_err());
        assert_eq!(status_for(&invalid), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&BrowseError::NoPrimaryKey("logs".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&BrowseError::NotFound("zz_missing".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_for(&BrowseError::Timeout), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            status_for(&BrowseError::Database("connection refused".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
