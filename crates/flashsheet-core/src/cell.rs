use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::CellError;
use crate::style_table::StyleId;

/// Represents the raw value stored in a cell
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    DateTime(NaiveDateTime),
    Error(CellError),
}

impl CellValue {
    /// Check if the value is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::DateTime(dt) => Some(datetime_to_excel_serial(*dt)),
            CellValue::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Try to get the value as a string
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::Error(e) => e.to_string(),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

/// The content of a cell - either a raw value or a formula
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CellContent {
    Value { value: CellValue },
    Formula {
        /// Formula text as stored in the document (e.g., "=SUM(A1:A10)")
        expression: String,
        /// Last value the producing application computed, if any
        #[serde(rename = "cachedValue")]
        cached_value: CellValue,
    },
}

impl Default for CellContent {
    fn default() -> Self {
        CellContent::Value {
            value: CellValue::Empty,
        }
    }
}

impl From<CellValue> for CellContent {
    fn from(value: CellValue) -> Self {
        CellContent::Value { value }
    }
}

impl CellContent {
    /// Create a new formula content; a leading `=` is added when missing
    pub fn formula(expression: impl Into<String>) -> Self {
        let expression = expression.into();
        let expression = if expression.starts_with('=') {
            expression
        } else {
            format!("={expression}")
        };
        CellContent::Formula {
            expression,
            cached_value: CellValue::Empty,
        }
    }

    /// Get the computed value (for both value and formula)
    pub fn computed_value(&self) -> &CellValue {
        match self {
            CellContent::Value { value } => value,
            CellContent::Formula { cached_value, .. } => cached_value,
        }
    }

    /// Check if this is a formula
    pub fn is_formula(&self) -> bool {
        matches!(self, CellContent::Formula { .. })
    }

    /// Get the formula expression if this is a formula
    pub fn formula_expression(&self) -> Option<&str> {
        match self {
            CellContent::Formula { expression, .. } => Some(expression),
            _ => None,
        }
    }

    /// Check if this content is empty (empty value, not a formula)
    pub fn is_empty(&self) -> bool {
        matches!(
            self,
            CellContent::Value {
                value: CellValue::Empty
            }
        )
    }
}

/// Complete cell record: content plus a reference into the sheet's style table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub content: CellContent,
    #[serde(default, skip_serializing_if = "StyleId::is_default")]
    pub style: StyleId,
}

impl Cell {
    /// Create a new cell with default style
    pub fn new(content: CellContent) -> Self {
        Cell {
            content,
            style: StyleId::DEFAULT,
        }
    }

    /// Create a cell with a number value
    pub fn number(value: f64) -> Self {
        Cell::new(CellValue::Number(value).into())
    }

    /// Create a cell with a text value
    pub fn text(value: impl Into<String>) -> Self {
        Cell::new(CellValue::Text(value.into()).into())
    }

    /// Create a cell with a formula
    pub fn formula(expression: impl Into<String>) -> Self {
        Cell::new(CellContent::formula(expression))
    }

    /// Get the computed value of the cell
    pub fn computed_value(&self) -> &CellValue {
        self.content.computed_value()
    }

    /// Check if the cell carries neither content nor a custom style
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.style.is_default()
    }
}

fn excel_epoch() -> NaiveDateTime {
    // 1900 date system; day 60 (the phantom 1900-02-29) is not representable
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Convert an Excel serial date (1900 date system) to a timestamp
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let millis = (serial * 86_400_000.0).round() as i64;
    excel_epoch().checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}

/// Convert a timestamp to an Excel serial date (1900 date system)
pub fn datetime_to_excel_serial(dt: NaiveDateTime) -> f64 {
    let delta = dt - excel_epoch();
    delta.num_milliseconds() as f64 / 86_400_000.0
}
