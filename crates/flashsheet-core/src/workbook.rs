use serde::{Deserialize, Serialize};

use crate::error::SheetError;
use crate::sheet::Sheet;

/// Metadata about the workbook
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkbookMetadata {
    /// Author name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Application that created/modified the workbook
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
}

/// A workbook containing one or more sheets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workbook {
    /// List of sheets in the workbook
    pub sheets: Vec<Sheet>,
    /// Index of the currently active sheet
    #[serde(default)]
    pub active_sheet_index: usize,
    /// Workbook metadata
    #[serde(default)]
    pub metadata: WorkbookMetadata,
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbook {
    /// Create a new workbook with a default sheet
    pub fn new() -> Self {
        Self {
            sheets: vec![Sheet::new("Sheet1")],
            active_sheet_index: 0,
            metadata: WorkbookMetadata::default(),
        }
    }

    /// Create a workbook with no sheets (used by readers that add them one by one)
    pub fn empty() -> Self {
        Self {
            sheets: Vec::new(),
            active_sheet_index: 0,
            metadata: WorkbookMetadata::default(),
        }
    }

    /// Get a reference to the active sheet
    pub fn active_sheet(&self) -> Option<&Sheet> {
        self.sheets.get(self.active_sheet_index)
    }

    /// Get a mutable reference to the active sheet
    pub fn active_sheet_mut(&mut self) -> Option<&mut Sheet> {
        self.sheets.get_mut(self.active_sheet_index)
    }

    /// Get a sheet by index
    pub fn get_sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    /// Get a mutable sheet by index
    pub fn get_sheet_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.get_mut(index)
    }

    /// Get a sheet by name (case-insensitive, like spreadsheet applications)
    pub fn get_sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheet_index(name).and_then(|idx| self.sheets.get(idx))
    }

    /// Get a mutable sheet by name
    pub fn get_sheet_by_name_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheet_index(name).and_then(|idx| self.sheets.get_mut(idx))
    }

    /// Get the index of a sheet by name
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Append a sheet, rejecting blank or duplicate names
    pub fn add_sheet(&mut self, sheet: Sheet) -> Result<usize, SheetError> {
        if sheet.name.trim().is_empty() {
            return Err(SheetError::InvalidSheetName(sheet.name));
        }
        if self.sheet_index(&sheet.name).is_some() {
            return Err(SheetError::DuplicateSheetName(sheet.name));
        }
        self.sheets.push(sheet);
        Ok(self.sheets.len() - 1)
    }

    /// Set the active sheet by index
    pub fn set_active_sheet(&mut self, index: usize) -> bool {
        if index < self.sheets.len() {
            self.active_sheet_index = index;
            true
        } else {
            false
        }
    }

    /// Get the number of sheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workbook_creation() {
        let wb = Workbook::new();
        assert_eq!(wb.sheet_count(), 1);
        assert_eq!(wb.active_sheet().map(|s| s.name.as_str()), Some("Sheet1"));
        assert!(Workbook::empty().active_sheet().is_none());
    }

    #[test]
    fn test_add_sheet() {
        let mut wb = Workbook::new();
        assert_eq!(wb.add_sheet(Sheet::new("Data")), Ok(1));
        assert_eq!(
            wb.add_sheet(Sheet::new("data")),
            Err(SheetError::DuplicateSheetName("data".to_string()))
        );
        assert_eq!(
            wb.add_sheet(Sheet::new("  ")),
            Err(SheetError::InvalidSheetName("  ".to_string()))
        );
        assert_eq!(wb.sheet_index("DATA"), Some(1));
    }

    #[test]
    fn test_active_sheet() {
        let mut wb = Workbook::new();
        wb.add_sheet(Sheet::new("Report")).unwrap();
        assert!(wb.set_active_sheet(1));
        assert!(!wb.set_active_sheet(5));
        assert_eq!(wb.active_sheet().map(|s| s.name.as_str()), Some("Report"));
    }
}
