//! Generic value decoding
//!
//! Column values arrive type-erased from whichever engine ran the query. The
//! decoder turns each one into a [`DecodedValue`] whose kind is chosen solely
//! by the column's declared [`ColumnType`], never by inspecting the value.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::error::BoxDynError;
use thiserror::Error;

use crate::schema::{ColumnDescriptor, ColumnType, RowView};

/// Engine-agnostic representation of one column value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum DecodedValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Raw(RawPayload),
}

/// Uninterpreted payload of a json, binary or unmapped column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RawPayload {
    Text(String),
    Bytes(Vec<u8>),
}

/// Why a column value could not be mapped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Value of column {column} does not fit in a 64-bit integer: {value}")]
    Overflow { column: String, value: String },

    #[error("Failed to decode column {column}: {reason}")]
    Failure { column: String, reason: String },
}

impl DecodeError {
    /// Name of the column that failed
    pub fn column(&self) -> &str {
        match self {
            DecodeError::Overflow { column, .. } | DecodeError::Failure { column, .. } => column,
        }
    }
}

/// Positional access to the raw values of one result row
///
/// Implemented for the engine row types by the database providers. Each
/// accessor reads the value at `index` in the requested representation and
/// fails if the engine cannot produce it.
pub trait RawRow {
    fn is_null(&self, index: usize) -> Result<bool, BoxDynError>;
    fn boolean(&self, index: usize) -> Result<bool, BoxDynError>;

    /// Widest integer the engine can hand out; narrowed by the decoder
    fn integer(&self, index: usize) -> Result<i128, BoxDynError>;
    fn float(&self, index: usize) -> Result<f64, BoxDynError>;
    fn text(&self, index: usize) -> Result<String, BoxDynError>;
    fn timestamp(&self, index: usize) -> Result<DateTime<Utc>, BoxDynError>;
    fn raw(&self, index: usize) -> Result<RawPayload, BoxDynError>;

    /// Best-effort textual rendering; must not fail
    fn render(&self, index: usize) -> String;
}

/// A row that was left out of a result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedRow {
    /// 0-based position of the row in the fetched result set
    pub position: usize,

    /// Column whose value failed
    pub column: String,

    /// Decoder error message
    pub reason: String,
}

/// Decoded rows plus a report of the ones that failed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedRows {
    pub rows: Vec<RowView>,
    pub dropped: Vec<DroppedRow>,
}

/// Decode the value at `index` of `row` as described by `column`
pub fn decode_value<R: RawRow + ?Sized>(
    column: &ColumnDescriptor,
    row: &R,
    index: usize,
) -> Result<DecodedValue, DecodeError> {
    let failure = |error: BoxDynError| DecodeError::Failure {
        column: column.name.to_string(),
        reason: error.to_string(),
    };

    if row.is_null(index).map_err(failure)? {
        return Ok(DecodedValue::Null);
    }

    match column.column_type {
        // Fails closed: an unreadable boolean is shown as NULL
        ColumnType::Boolean => Ok(row
            .boolean(index)
            .map(DecodedValue::Bool)
            .unwrap_or(DecodedValue::Null)),
        ColumnType::Integer => {
            let value = row.integer(index).map_err(failure)?;
            i64::try_from(value)
                .map(DecodedValue::Int)
                .map_err(|_| DecodeError::Overflow {
                    column: column.name.to_string(),
                    value: value.to_string(),
                })
        }
        ColumnType::Float => row.float(index).map(DecodedValue::Float).map_err(failure),
        ColumnType::Text => row.text(index).map(DecodedValue::Text).map_err(failure),
        ColumnType::Timestamp => row
            .timestamp(index)
            .map(DecodedValue::Timestamp)
            .map_err(failure),
        ColumnType::Raw => row.raw(index).map(DecodedValue::Raw).map_err(failure),
        ColumnType::Unknown => Ok(DecodedValue::Raw(RawPayload::Text(row.render(index)))),
    }
}

/// Decode a whole row; the first failing column fails the row
///
/// `row` must hold the columns positionally in the same order as `columns`.
pub fn decode_row<R: RawRow + ?Sized>(
    columns: &[ColumnDescriptor],
    row: &R,
) -> Result<RowView, DecodeError> {
    let mut view = RowView::with_capacity(columns.len());
    for (index, column) in columns.iter().enumerate() {
        view.push(column.name.clone(), decode_value(column, row, index)?);
    }
    Ok(view)
}

/// Decode a result set, separating failed rows into the dropped report
pub fn decode_rows<R: RawRow>(columns: &[ColumnDescriptor], rows: &[R]) -> DecodedRows {
    let mut decoded = DecodedRows {
        rows: Vec::with_capacity(rows.len()),
        dropped: Vec::new(),
    };

    for (position, row) in rows.iter().enumerate() {
        match decode_row(columns, row) {
            Ok(view) => decoded.rows.push(view),
            Err(error) => {
                tracing::warn!(position, error = %error, "Dropping undecodable row");
                decoded.dropped.push(DroppedRow {
                    position,
                    column: error.column().to_string(),
                    reason: error.to_string(),
                });
            }
        }
    }

    decoded
}
