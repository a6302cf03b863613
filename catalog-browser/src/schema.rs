//! Schema types for dynamic database introspection
//!
//! These types represent catalog information discovered at runtime and the
//! structured results handed back to callers.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::decode::{DecodedValue, DroppedRow};
use crate::identifier::SafeIdentifier;
use crate::pagination::Pagination;

/// A browsable table in the configured scope
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDescriptor {
    /// Schema the table lives in
    pub schema: SafeIdentifier,

    /// Table name
    pub name: SafeIdentifier,

    /// Row count at listing time, `None` if counting failed
    pub row_count: Option<u64>,

    /// Table comment, if the engine keeps one
    pub description: Option<String>,
}

/// Semantic type vocabulary that drives value decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnType {
    Boolean,
    Integer,
    Float,
    Text,
    Timestamp,
    Raw,
    Unknown,
}

/// Information about a single column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    /// 1-based ordinal position as reported by the catalog
    pub ordinal: u32,

    /// Column name
    pub name: SafeIdentifier,

    /// Type name exactly as the engine reports it (e.g. "int4", "VARCHAR(255)")
    pub native_type: String,

    /// Mapped semantic type
    pub column_type: ColumnType,

    /// Whether the column allows NULL values
    pub nullable: bool,

    /// Default value expression (if any)
    pub default_value: Option<String>,
}

/// One decoded row, in column order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowView {
    values: Vec<(SafeIdentifier, DecodedValue)>,
}

impl RowView {
    /// Create an empty row with room for `capacity` columns
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    /// Append a column value; callers push in column order
    pub fn push(&mut self, column: SafeIdentifier, value: DecodedValue) {
        self.values.push((column, value));
    }

    /// Look up a value by column name
    pub fn get(&self, column: &str) -> Option<&DecodedValue> {
        self.values
            .iter()
            .find(|(name, _)| name.as_str() == column)
            .map(|(_, value)| value)
    }

    /// Iterate over `(column, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&SafeIdentifier, &DecodedValue)> {
        self.values.iter().map(|(name, value)| (name, value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// Serialized as a JSON object whose key order follows the column order
impl Serialize for RowView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name.as_str(), value)?;
        }
        map.end()
    }
}

/// Response from listing tables
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TablesResponse {
    /// Tables ordered by name
    pub tables: Vec<TableDescriptor>,
}

/// Column layout of a single table
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumns {
    /// Table name
    pub table: SafeIdentifier,

    /// Columns in ordinal order
    pub columns: Vec<ColumnDescriptor>,
}

/// One page of a browsed table
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowsePage {
    /// Table name
    pub table: SafeIdentifier,

    /// Columns in ordinal order; also the key order of every row
    pub columns: Vec<ColumnDescriptor>,

    /// Successfully decoded rows
    pub rows: Vec<RowView>,

    /// Rows that could not be decoded and were left out of `rows`
    pub dropped_rows: Vec<DroppedRow>,

    /// Page position and totals
    #[serde(flatten)]
    pub pagination: Pagination,
}

/// A single row looked up by key
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowDetail {
    /// Table name
    pub table: SafeIdentifier,

    /// Columns in ordinal order
    pub columns: Vec<ColumnDescriptor>,

    /// The row, `None` when it existed but failed to decode
    pub row: Option<RowView>,

    /// Decode failure for the row, if any
    pub dropped_rows: Vec<DroppedRow>,
}

/// Query parameters for browsing rows
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct BrowseQuery {
    /// 1-based page number; missing, zero, negative and non-numeric values mean page 1
    pub page: Option<String>,
}

impl BrowseQuery {
    /// The requested page, if it parses as an integer
    pub fn requested_page(&self) -> Option<i64> {
        self.page.as_deref().and_then(|page| page.trim().parse().ok())
    }
}
