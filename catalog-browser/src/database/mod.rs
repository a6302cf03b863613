//! Database abstraction layer
//!
//! This module provides a database-agnostic interface for catalog discovery
//! and row retrieval.

pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

// Re-export the main trait
pub use traits::{BrowseError, CatalogProvider};

