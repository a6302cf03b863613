//! Browser policy configuration

use std::num::NonZeroU32;
use std::time::Duration;

use crate::identifier::{validate, InvalidIdentifier, SafeIdentifier};

/// Rows per page when nothing else is configured
pub const DEFAULT_PAGE_SIZE: NonZeroU32 = match NonZeroU32::new(50) {
    Some(size) => size,
    None => unreachable!(),
};

/// Upper bound on every catalog or data operation
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Entries kept by the column cache when it is enabled
pub const COLUMN_CACHE_CAPACITY: u64 = 1_000;

/// Policy values for a [`CatalogBrowser`](crate::browser::CatalogBrowser)
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Schema whose tables are browsable
    pub scope: SafeIdentifier,

    /// Rows per page; fixed by policy, never taken from the request
    pub page_size: NonZeroU32,

    /// Timeout applied to each browser operation as a whole
    pub query_timeout: Duration,

    /// Time-to-live for cached column lists; `None` disables caching
    pub column_cache_ttl: Option<Duration>,
}

impl BrowserConfig {
    /// Default policy for the given schema name
    pub fn for_scope(scope: &str) -> Result<Self, InvalidIdentifier> {
        Ok(Self {
            scope: validate(scope)?,
            ..Self::default()
        })
    }

    pub fn with_page_size(mut self, page_size: NonZeroU32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    pub fn with_column_cache_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.column_cache_ttl = ttl;
        self
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            scope: SafeIdentifier::from_static("public"),
            page_size: DEFAULT_PAGE_SIZE,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            column_cache_ttl: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BrowserConfig::default();
        assert_eq!(config.scope.as_str(), "public");
        assert_eq!(config.page_size.get(), 50);
        assert_eq!(config.query_timeout, Duration::from_secs(30));
        assert!(config.column_cache_ttl.is_none());
    }

    #[test]
    fn test_for_scope_validates() {
        assert_eq!(BrowserConfig::for_scope("main").unwrap().scope.as_str(), "main");
        assert!(BrowserConfig::for_scope("main; --").is_err());
    }
}
