//! Loading and saving Flash Sheet workbooks.
//!
//! The on-disk format is picked from the file extension: `.xlsx` documents go
//! through the OOXML reader/writer, `.json` files hold the serde form of the
//! in-memory model.

pub mod error;
pub mod json;
pub mod xlsx;

use std::path::Path;

use flashsheet_core::Workbook;

pub use error::DocumentError;

/// Document formats understood by [`load_workbook`] and [`save_workbook`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Xlsx,
    Json,
}

impl DocumentFormat {
    /// Detect the format from a path's extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("xlsx") => Ok(DocumentFormat::Xlsx),
            Some("json") => Ok(DocumentFormat::Json),
            _ => Err(DocumentError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Open a workbook document
pub fn load_workbook(path: &Path) -> Result<Workbook, DocumentError> {
    let format = DocumentFormat::from_path(path)?;
    tracing::debug!(path = %path.display(), ?format, "loading workbook");
    match format {
        DocumentFormat::Xlsx => xlsx::read_xlsx(path),
        DocumentFormat::Json => json::read_json(path),
    }
}

/// Persist a workbook document, replacing any existing file
pub fn save_workbook(workbook: &Workbook, path: &Path) -> Result<(), DocumentError> {
    let format = DocumentFormat::from_path(path)?;
    tracing::debug!(path = %path.display(), ?format, sheets = workbook.sheet_count(), "saving workbook");
    match format {
        DocumentFormat::Xlsx => xlsx::write_xlsx(workbook, path),
        DocumentFormat::Json => json::write_json(workbook, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("out/report.XLSX")).unwrap(),
            DocumentFormat::Xlsx
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("book.json")).unwrap(),
            DocumentFormat::Json
        );
        assert!(matches!(
            DocumentFormat::from_path(Path::new("legacy.xls")),
            Err(DocumentError::UnsupportedFormat(_))
        ));
        assert!(DocumentFormat::from_path(Path::new("noext")).is_err());
    }
}
