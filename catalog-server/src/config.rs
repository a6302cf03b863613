use std::num::NonZeroU32;
use std::time::Duration;

use catalog_browser::{BrowserConfig, InvalidIdentifier};
use clap::Parser;

/// Command line and environment configuration for the admin server.
#[derive(Parser, Debug, Clone)]
#[command(name = "catalog-server", about = "Browse the tables of a PostgreSQL or SQLite database")]
pub struct ServerConfig {
    /// Connection string. `postgres://` selects PostgreSQL, anything else SQLite.
    #[arg(
        long,
        default_value = "sqlite:catalog.db?mode=rwc",
        env = "CATALOG_DATABASE_URL"
    )]
    pub database_url: String,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000", env = "CATALOG_BIND")]
    pub bind: String,

    /// URL prefix the browser API is mounted under
    #[arg(long, default_value = "/catalog", env = "CATALOG_BASE_PATH")]
    pub base_path: String,

    /// Schema to browse. Defaults to `public` on PostgreSQL and `main` on SQLite.
    #[arg(long, env = "CATALOG_SCOPE")]
    pub scope: Option<String>,

    /// Rows per page
    #[arg(long, default_value = "50", env = "CATALOG_PAGE_SIZE")]
    pub page_size: NonZeroU32,

    /// Deadline for each catalog operation, in seconds
    #[arg(long, default_value_t = 30, env = "CATALOG_QUERY_TIMEOUT_SECONDS")]
    pub query_timeout_seconds: u64,

    /// Column layout cache lifetime in seconds; 0 rereads the catalog every time
    #[arg(long, default_value_t = 0, env = "CATALOG_COLUMN_CACHE_TTL_SECONDS")]
    pub column_cache_ttl_seconds: u64,

    /// Connection pool size
    #[arg(long, default_value_t = 5, env = "CATALOG_MAX_CONNECTIONS")]
    pub max_connections: u32,

    /// Create and fill demo tables when running on SQLite
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set, env = "CATALOG_SEED_DEMO")]
    pub seed_demo: bool,
}

impl ServerConfig {
    pub fn is_postgres(&self) -> bool {
        self.database_url.starts_with("postgres://")
            || self.database_url.starts_with("postgresql://")
    }

    /// Browse policy handed to the library
    pub fn browser_config(&self) -> Result<BrowserConfig, InvalidIdentifier> {
        let default_scope = if self.is_postgres() { "public" } else { "main" };
        let scope = self.scope.as_deref().unwrap_or(default_scope);

        let column_cache_ttl = match self.column_cache_ttl_seconds {
            0 => None,
            seconds => Some(Duration::from_secs(seconds)),
        };

        Ok(BrowserConfig::for_scope(scope)?
            .with_page_size(self.page_size)
            .with_query_timeout(Duration::from_secs(self.query_timeout_seconds))
            .with_column_cache_ttl(column_cache_ttl))
    }
}
