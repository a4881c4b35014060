use chrono::{NaiveDate, NaiveDateTime};
use flashsheet_core::CellValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PreserveError;

/// One payload row: field name to value, in field order
pub type PayloadRow = IndexMap<String, CellValue>;

/// Ordered rows of named fields. Row `i` lands on `anchor row + i`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabularPayload {
    rows: Vec<PayloadRow>,
}

impl TabularPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<PayloadRow>) -> Self {
        Self { rows }
    }

    /// Append a row built from `(field, value)` pairs
    pub fn push_row<K, V, I>(&mut self, fields: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CellValue>,
    {
        self.rows.push(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
    }

    pub fn rows(&self) -> &[PayloadRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Parse a JSON array of flat objects.
    ///
    /// `null` becomes an explicit empty value, which clears the destination
    /// cell. With `parse_dates`, strings holding an ISO-8601 date or
    /// date-time become date values.
    pub fn from_json_str(json: &str, parse_dates: bool) -> Result<Self, PreserveError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(&value, parse_dates)
    }

    pub fn from_json_value(value: &Value, parse_dates: bool) -> Result<Self, PreserveError> {
        let Value::Array(items) = value else {
            return Err(PreserveError::InvalidPayload(
                "expected an array of row objects".to_string(),
            ));
        };

        let mut rows = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let Value::Object(object) = item else {
                return Err(PreserveError::InvalidPayload(format!(
                    "row {index} is not an object"
                )));
            };
            let mut row = PayloadRow::with_capacity(object.len());
            for (field, raw) in object {
                let value = json_scalar(raw, parse_dates).ok_or_else(|| {
                    PreserveError::InvalidPayload(format!(
                        "row {index}, field {field:?}: nested values are not supported"
                    ))
                })?;
                row.insert(field.clone(), value);
            }
            rows.push(row);
        }

        Ok(Self { rows })
    }
}

impl FromIterator<PayloadRow> for TabularPayload {
    fn from_iter<T: IntoIterator<Item = PayloadRow>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

fn json_scalar(raw: &Value, parse_dates: bool) -> Option<CellValue> {
    Some(match raw {
        Value::Null => CellValue::Empty,
        Value::Bool(b) => CellValue::Boolean(*b),
        Value::Number(n) => CellValue::Number(n.as_f64()?),
        Value::String(s) => match parse_dates.then(|| parse_iso_date(s)).flatten() {
            Some(dt) => CellValue::DateTime(dt),
            None => CellValue::Text(s.clone()),
        },
        Value::Array(_) | Value::Object(_) => return None,
    })
}

fn parse_iso_date(s: &str) -> Option<NaiveDateTime> {
    const DATE_TIME_FORMATS: [&str; 3] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];

    let s = s.trim();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
