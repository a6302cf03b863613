mod common;

use std::num::NonZeroU32;

use catalog_browser::{
    BrowseError, BrowserConfig, CatalogBrowser, ColumnType, DecodedValue, SqliteProvider,
};
use chrono::{TimeZone, Utc};

async fn browser() -> CatalogBrowser<SqliteProvider> {
    let pool = common::seeded_pool().await;
    let config = BrowserConfig::for_scope("main")
        .unwrap()
        .with_page_size(NonZeroU32::new(20).unwrap());
    CatalogBrowser::new(SqliteProvider::new(pool), config)
}

#[tokio::test]
async fn test_list_tables_ordered_with_counts() {
    let browser = browser().await;

    let tables = browser.list_tables().await.unwrap();

    let names: Vec<&str> = tables.iter().map(|table| table.name.as_str()).collect();
    assert_eq!(names, ["logs", "orders", "readings"]);
    assert_eq!(tables[1].row_count, Some(95));
    assert_eq!(tables[1].schema.as_str(), "main");
    assert!(tables.iter().all(|table| table.description.is_none()));
}

#[tokio::test]
async fn test_describe_orders() {
    let browser = browser().await;

    let layout = browser.describe_table("orders").await.unwrap();

    let summary: Vec<(u32, &str, ColumnType)> = layout
        .columns
        .iter()
        .map(|column| (column.ordinal, column.name.as_str(), column.column_type))
        .collect();
    assert_eq!(
        summary,
        [
            (1, "id", ColumnType::Integer),
            (2, "total", ColumnType::Float),
            (3, "note", ColumnType::Text),
            (4, "is_paid", ColumnType::Boolean),
            (5, "created_at", ColumnType::Timestamp),
        ]
    );

    let is_paid = &layout.columns[3];
    assert!(!is_paid.nullable);
    assert_eq!(is_paid.default_value.as_deref(), Some("0"));
    assert_eq!(is_paid.native_type, "BOOLEAN");
}

#[tokio::test]
async fn test_browse_first_and_last_page() {
    let browser = browser().await;

    let first = browser.browse("orders", Some(1)).await.unwrap();
    assert_eq!(first.pagination.total_rows, 95);
    assert_eq!(first.pagination.total_pages, 5);
    assert_eq!(first.rows.len(), 20);
    assert_eq!(first.rows[0].get("id"), Some(&DecodedValue::Int(95)));
    assert!(first.dropped_rows.is_empty());

    let last = browser.browse("orders", Some(5)).await.unwrap();
    assert_eq!(last.pagination.offset, 80);
    assert_eq!(last.rows.len(), 15);

    let oldest = last.rows.last().unwrap();
    assert_eq!(oldest.get("id"), Some(&DecodedValue::Int(1)));
    assert_eq!(oldest.get("total"), Some(&DecodedValue::Float(42.5)));
    assert_eq!(oldest.get("note"), Some(&DecodedValue::Null));
    assert_eq!(oldest.get("is_paid"), Some(&DecodedValue::Bool(false)));
    assert_eq!(
        oldest.get("created_at"),
        Some(&DecodedValue::Timestamp(
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
        ))
    );
}

#[tokio::test]
async fn test_browse_page_zero_and_past_the_end() {
    let browser = browser().await;

    let normalized = browser.browse("orders", Some(0)).await.unwrap();
    assert_eq!(normalized.pagination.page, 1);
    assert_eq!(normalized.pagination.offset, 0);

    let beyond = browser.browse("orders", Some(9)).await.unwrap();
    assert!(beyond.rows.is_empty());
    assert_eq!(beyond.pagination.total_pages, 5);
}

#[tokio::test]
async fn test_browse_missing_table_is_not_found() {
    let browser = browser().await;

    let error = browser.browse("zz_missing", None).await.unwrap_err();
    assert!(matches!(error, BrowseError::NotFound(_)));
}

#[tokio::test]
async fn test_browse_rejects_hostile_table_name() {
    let browser = browser().await;

    let error = browser
        .browse("orders\" ; DROP TABLE logs; --", None)
        .await
        .unwrap_err();
    assert!(matches!(error, BrowseError::InvalidIdentifier(_)));

    // Nothing was executed against logs
    let logs = browser.browse("logs", None).await.unwrap();
    assert_eq!(logs.pagination.total_rows, 2);
}

#[tokio::test]
async fn test_undecodable_rows_are_dropped_and_reported() {
    let browser = browser().await;

    let page = browser.browse("readings", None).await.unwrap();

    assert_eq!(page.pagination.total_rows, 3);
    assert_eq!(page.rows.len(), 2);
    assert_eq!(page.dropped_rows.len(), 1);
    assert_eq!(page.dropped_rows[0].position, 1);
    assert_eq!(page.dropped_rows[0].column, "value");
}

#[tokio::test]
async fn test_view_row() {
    let browser = browser().await;

    let detail = browser.view_row("orders", "1").await.unwrap();
    let row = detail.row.unwrap();
    assert_eq!(row.get("id"), Some(&DecodedValue::Int(1)));
    assert_eq!(row.get("total"), Some(&DecodedValue::Float(42.5)));
    assert_eq!(row.get("note"), Some(&DecodedValue::Null));
}

#[tokio::test]
async fn test_view_row_failures() {
    let browser = browser().await;

    let missing = browser.view_row("orders", "999").await.unwrap_err();
    assert!(matches!(missing, BrowseError::NotFound(_)));

    let malformed = browser.view_row("orders", "1 OR 1=1").await.unwrap_err();
    assert!(matches!(malformed, BrowseError::NotFound(_)));

    let keyless = browser.view_row("logs", "1").await.unwrap_err();
    assert!(matches!(keyless, BrowseError::NoPrimaryKey(_)));
}

#[tokio::test]
async fn test_view_row_that_fails_to_decode() {
    let browser = browser().await;

    let detail = browser.view_row("readings", "2").await.unwrap();
    assert!(detail.row.is_none());
    assert_eq!(detail.dropped_rows.len(), 1);
}
