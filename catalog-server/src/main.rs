use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Router};
use catalog_browser::{
    BrowserConfig, CatalogBrowser, CatalogBrowserLayer, CatalogProvider, PostgresProvider,
    SqliteProvider,
};
use clap::Parser;

mod config;
mod database;

use config::ServerConfig;
use database::DatabasePool;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ServerConfig::parse();
    let browser_config = config.browser_config()?;

    let pool = DatabasePool::connect(&config).await?;
    tracing::info!(engine = pool.engine(), scope = %browser_config.scope, "Connected to database");

    if let (DatabasePool::Sqlite(sqlite), true) = (&pool, config.seed_demo) {
        database::seed_demo(sqlite).await?;
    }

    let base_path = config.base_path.as_str();
    let catalog = match &pool {
        DatabasePool::Postgres(postgres) => {
            browser_router(base_path, PostgresProvider::new(postgres.clone()), browser_config)
        }
        DatabasePool::Sqlite(sqlite) => {
            browser_router(base_path, SqliteProvider::new(sqlite.clone()), browser_config)
        }
    };

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/api/health", get(health_handler))
        .with_state(pool)
        .merge(catalog);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;

    tracing::info!(address = %config.bind, base_path = %config.base_path, "Serving catalog browser");

    axum::serve(listener, app).await?;
    Ok(())
}

/// The one place a browser instance is built; handlers only see the shared handle
fn browser_router<DB: CatalogProvider>(
    base_path: &str,
    database: DB,
    config: BrowserConfig,
) -> Router {
    let browser = Arc::new(CatalogBrowser::new(database, config));
    CatalogBrowserLayer::new(base_path, browser).into_router()
}

async fn root_handler() -> &'static str {
    "catalog-server is running"
}

async fn health_handler(
    State(pool): State<DatabasePool>,
) -> Result<(StatusCode, &'static str), StatusCode> {
    pool.ping().await.map_err(|error| {
        tracing::warn!(%error, "Health check failed");
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    Ok((StatusCode::OK, "Server is healthy"))
}
