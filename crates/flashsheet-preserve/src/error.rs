use flashsheet_core::{CellCoord, SheetError};
use flashsheet_io::DocumentError;
use thiserror::Error;

/// Errors that abort a whole preservation run
#[derive(Error, Debug)]
pub enum PreserveError {
    #[error("write region starting at {anchor} ({rows} rows x {cols} columns) leaves the worksheet")]
    RegionOutOfBounds { anchor: CellCoord, rows: u64, cols: u64 },

    #[error("invalid start cell: {0}")]
    InvalidStartCell(String),

    #[error("invalid column for field {field:?}: {column:?}")]
    InvalidColumn { field: String, column: String },

    #[error("invalid mapping entry {0:?}, expected FIELD=COLUMN")]
    InvalidMappingEntry(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    #[error("payload json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Why reapplying one cell's captured formatting failed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RestoreError {
    #[error("recorded {field} color {value:?} is not a valid ARGB value")]
    InvalidColor { field: &'static str, value: String },

    #[error(transparent)]
    Sheet(#[from] SheetError),
}
