//! Runs against a live server: `DATABASE_URL=postgres://... cargo test -- --ignored`

use std::num::NonZeroU32;

use catalog_browser::{
    BrowseError, BrowserConfig, CatalogBrowser, ColumnType, DecodedValue, PostgresProvider,
    RawPayload,
};
use chrono::{TimeZone, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};

const SESSION_ID: &str = "3f1c1ab0-0d4e-4b8e-9d59-4a4e3d3c2a10";

/// Fresh schema named after the test, or `None` when no server is configured
async fn setup(schema: &str) -> Option<(PgPool, CatalogBrowser<PostgresProvider>)> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping");
        return None;
    };
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .unwrap();

    let statements = [
        format!("DROP SCHEMA IF EXISTS {schema} CASCADE"),
        format!("CREATE SCHEMA {schema}"),
        format!(
            "CREATE TABLE {schema}.sessions (
                id uuid PRIMARY KEY,
                label varchar(40) NOT NULL,
                attempts int4,
                ratio float4,
                active bool,
                opened_at timestamptz,
                closed_on date,
                payload jsonb,
                amount numeric(10, 2)
            )"
        ),
        format!("COMMENT ON TABLE {schema}.sessions IS 'login sessions'"),
        format!(
            "INSERT INTO {schema}.sessions VALUES (
                '{SESSION_ID}', 'admin', 3, 0.5, true,
                '2024-03-01T12:00:00Z', '2024-03-02', '{{\"ip\": \"10.0.0.1\"}}', 12.50
            )"
        ),
        format!("CREATE TABLE {schema}.events (id int8 PRIMARY KEY, name text)"),
        format!(
            "INSERT INTO {schema}.events SELECT n, 'event ' || n FROM generate_series(1, 30) AS n"
        ),
    ];
    for statement in &statements {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }

    let config = BrowserConfig::for_scope(schema)
        .unwrap()
        .with_page_size(NonZeroU32::new(20).unwrap());
    let browser = CatalogBrowser::new(PostgresProvider::new(pool.clone()), config);
    Some((pool, browser))
}

async fn teardown(pool: &PgPool, schema: &str) {
    sqlx::query(&format!("DROP SCHEMA {schema} CASCADE"))
        .execute(pool)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore]
async fn test_catalog_reads() {
    let schema = "catalog_test_catalog_reads";
    let Some((pool, browser)) = setup(schema).await else {
        return;
    };

    let tables = browser.list_tables().await.unwrap();
    let names: Vec<&str> = tables.iter().map(|table| table.name.as_str()).collect();
    assert_eq!(names, ["events", "sessions"]);
    assert_eq!(tables[0].row_count, Some(30));
    assert_eq!(tables[1].description.as_deref(), Some("login sessions"));

    let layout = browser.describe_table("sessions").await.unwrap();
    let types: Vec<(&str, ColumnType)> = layout
        .columns
        .iter()
        .map(|column| (column.native_type.as_str(), column.column_type))
        .collect();
    assert_eq!(
        types,
        [
            ("uuid", ColumnType::Unknown),
            ("varchar", ColumnType::Text),
            ("int4", ColumnType::Integer),
            ("float4", ColumnType::Float),
            ("bool", ColumnType::Boolean),
            ("timestamptz", ColumnType::Timestamp),
            ("date", ColumnType::Timestamp),
            ("jsonb", ColumnType::Raw),
            ("numeric", ColumnType::Unknown),
        ]
    );
    assert!(!layout.columns[1].nullable);

    teardown(&pool, schema).await;
}

#[tokio::test]
#[ignore]
async fn test_browse_pages() {
    let schema = "catalog_test_browse_pages";
    let Some((pool, browser)) = setup(schema).await else {
        return;
    };

    let page = browser.browse("events", Some(2)).await.unwrap();
    assert_eq!(page.pagination.total_pages, 2);
    assert_eq!(page.pagination.offset, 20);
    assert_eq!(page.rows.len(), 10);
    assert_eq!(page.rows[0].get("id"), Some(&DecodedValue::Int(10)));

    teardown(&pool, schema).await;
}

#[tokio::test]
#[ignore]
async fn test_view_row_by_uuid() {
    let schema = "catalog_test_view_row_by_uuid";
    let Some((pool, browser)) = setup(schema).await else {
        return;
    };

    let row = browser
        .view_row("sessions", SESSION_ID)
        .await
        .unwrap()
        .row
        .unwrap();

    let text = |value: &str| DecodedValue::Raw(RawPayload::Text(value.to_string()));
    assert_eq!(row.get("id"), Some(&text(SESSION_ID)));
    assert_eq!(row.get("label"), Some(&DecodedValue::Text("admin".into())));
    assert_eq!(row.get("attempts"), Some(&DecodedValue::Int(3)));
    assert_eq!(row.get("ratio"), Some(&DecodedValue::Float(0.5)));
    assert_eq!(row.get("active"), Some(&DecodedValue::Bool(true)));
    assert_eq!(
        row.get("opened_at"),
        Some(&DecodedValue::Timestamp(
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
        ))
    );
    assert_eq!(
        row.get("closed_on"),
        Some(&DecodedValue::Timestamp(
            Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap()
        ))
    );
    assert_eq!(row.get("payload"), Some(&text(r#"{"ip":"10.0.0.1"}"#)));
    assert_eq!(row.get("amount"), Some(&text("12.50")));

    teardown(&pool, schema).await;
}

#[tokio::test]
#[ignore]
async fn test_view_row_with_unusable_keys() {
    let schema = "catalog_test_unusable_keys";
    let Some((pool, browser)) = setup(schema).await else {
        return;
    };

    let malformed = browser.view_row("sessions", "not-a-uuid").await.unwrap_err();
    assert!(matches!(malformed, BrowseError::NotFound(_)));

    let unknown = browser
        .view_row("sessions", "00000000-0000-0000-0000-000000000000")
        .await
        .unwrap_err();
    assert!(matches!(unknown, BrowseError::NotFound(_)));

    teardown(&pool, schema).await;
}
