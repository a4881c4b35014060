use flashsheet_core::{col_from_label, col_to_label};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::PreserveError;

/// Destination column (0-indexed) per payload field.
///
/// Two fields targeting the same column is not rejected; the later field in
/// a row wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    columns: IndexMap<String, u32>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `field` to a 0-indexed column
    pub fn insert(&mut self, field: impl Into<String>, col: u32) {
        self.columns.insert(field.into(), col);
    }

    /// Map `field` to a column given by its letters ("A", "AB", ...)
    pub fn insert_letters(
        &mut self,
        field: impl Into<String>,
        letters: &str,
    ) -> Result<(), PreserveError> {
        let field = field.into();
        let col = col_from_label(letters.trim()).ok_or_else(|| PreserveError::InvalidColumn {
            field: field.clone(),
            column: letters.to_string(),
        })?;
        self.columns.insert(field, col);
        Ok(())
    }

    /// Build from `(field, column letters)` pairs
    pub fn from_letters<'a, I>(pairs: I) -> Result<Self, PreserveError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut mapping = Self::new();
        for (field, letters) in pairs {
            mapping.insert_letters(field, letters)?;
        }
        Ok(mapping)
    }

    /// Parse `FIELD=COLUMN` entries such as `Ventas=B`
    pub fn parse_entries<S: AsRef<str>>(entries: &[S]) -> Result<Self, PreserveError> {
        let mut mapping = Self::new();
        for entry in entries {
            let entry = entry.as_ref();
            let (field, letters) = entry
                .rsplit_once('=')
                .filter(|(field, _)| !field.trim().is_empty())
                .ok_or_else(|| PreserveError::InvalidMappingEntry(entry.to_string()))?;
            mapping.insert_letters(field.trim(), letters)?;
        }
        Ok(mapping)
    }

    pub fn get(&self, field: &str) -> Option<u32> {
        self.columns.get(field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.columns.iter().map(|(field, col)| (field.as_str(), *col))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn min_column(&self) -> Option<u32> {
        self.columns.values().copied().min()
    }

    pub fn max_column(&self) -> Option<u32> {
        self.columns.values().copied().max()
    }

    /// Human-readable form, e.g. `Región→A, Ventas→B`
    pub fn describe(&self) -> String {
        self.columns
            .iter()
            .map(|(field, col)| format!("{field}→{}", col_to_label(*col)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
