use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::range::CellCoord;

/// Represents possible cell errors (Excel-compatible)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellError {
    /// #DIV/0! - Division by zero
    DivisionByZero,
    /// #VALUE! - Invalid value type
    InvalidValue,
    /// #REF! - Invalid cell reference
    InvalidReference,
    /// #NAME? - Unrecognized function or name
    InvalidName,
    /// #NULL! - Null intersection
    NullError,
    /// #NUM! - Invalid numeric value
    NumError,
    /// #N/A - Value not available
    NotAvailable,
}

impl CellError {
    /// Parse the error literal stored in a spreadsheet file
    pub fn from_literal(literal: &str) -> Option<Self> {
        match literal.trim() {
            "#DIV/0!" => Some(CellError::DivisionByZero),
            "#VALUE!" => Some(CellError::InvalidValue),
            "#REF!" => Some(CellError::InvalidReference),
            "#NAME?" => Some(CellError::InvalidName),
            "#NULL!" => Some(CellError::NullError),
            "#NUM!" => Some(CellError::NumError),
            "#N/A" => Some(CellError::NotAvailable),
            _ => None,
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellError::DivisionByZero => write!(f, "#DIV/0!"),
            CellError::InvalidValue => write!(f, "#VALUE!"),
            CellError::InvalidReference => write!(f, "#REF!"),
            CellError::InvalidName => write!(f, "#NAME?"),
            CellError::NullError => write!(f, "#NULL!"),
            CellError::NumError => write!(f, "#NUM!"),
            CellError::NotAvailable => write!(f, "#N/A"),
        }
    }
}

/// Errors raised by worksheet and workbook mutations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SheetError {
    #[error("cell {coord} is outside the worksheet bounds")]
    OutOfBounds { coord: CellCoord },

    #[error("style table is full ({limit} distinct styles)")]
    StyleTableFull { limit: usize },

    #[error("sheet name already exists: {0}")]
    DuplicateSheetName(String),

    #[error("invalid sheet name: {0:?}")]
    InvalidSheetName(String),

    #[error("sheet not found: {0}")]
    SheetNotFound(String),
}
