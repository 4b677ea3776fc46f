//! Structured error types for formgrid.
//!
//! Stale data never produces an error (the grid builder degrades instead);
//! these variants cover rejected writes and persistence failures.

use crate::types::{CellId, PresentationMode};

/// All errors that can occur while editing a section layout.
#[derive(Debug, thiserror::Error)]
pub enum FormGridError {
    /// Opaque failure reported by the persistence layer.
    #[error("Store error: {0}")]
    Store(String),

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Structural editing attempted outside admin mode.
    #[error("Section is not editable in {mode} mode")]
    ReadOnly { mode: PresentationMode },

    /// Row operation targets a row that does not exist.
    #[error("Row {row} is out of range (section has {row_count} rows)")]
    RowOutOfRange { row: u32, row_count: u32 },

    /// Column count outside `1..=MAX_COLUMNS`.
    #[error("Invalid column count {columns} for row {row}")]
    InvalidColumnCount { row: u32, columns: u32 },

    /// Column count narrower than a cell already placed in the row.
    #[error("Row {row} needs at least {required} columns, got {columns}")]
    ColumnsTooNarrow { row: u32, columns: u32, required: u32 },

    /// No cell with this id exists in the section.
    #[error("Cell {0} not found")]
    CellNotFound(CellId),

    /// Placement falls outside the grid bounds.
    #[error("Placement row {row}, column {column}, span {span} is out of bounds")]
    OutOfBounds { row: u32, column: u32, span: u32 },

    /// Placement overlaps another cell in the same row.
    #[error("Placement at row {row}, column {column} overlaps {cell}")]
    Conflict { cell: CellId, row: u32, column: u32 },

    /// A cell record is missing required position fields.
    #[error("Malformed cell {id}: {reason}")]
    MalformedCell { id: u64, reason: String },

    /// A multi-step operation failed partway; earlier steps are durable.
    #[error("Interrupted after {applied} of {total} steps: {source}")]
    Interrupted {
        applied: usize,
        total: usize,
        #[source]
        source: Box<FormGridError>,
    },

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FormGridError>;

impl From<String> for FormGridError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for FormGridError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<FormGridError> for wasm_bindgen::JsValue {
    fn from(e: FormGridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
