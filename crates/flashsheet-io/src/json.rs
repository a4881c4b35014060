use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use flashsheet_core::Workbook;

use crate::error::DocumentError;

/// Load a workbook from its JSON form
pub fn read_json(path: &Path) -> Result<Workbook, DocumentError> {
    let reader = BufReader::new(File::open(path)?);
    let workbook: Workbook = serde_json::from_reader(reader)?;
    if workbook.sheets.is_empty() {
        return Err(DocumentError::NoSheets);
    }
    Ok(workbook)
}

/// Save a workbook as pretty-printed JSON
pub fn write_json(workbook: &Workbook, path: &Path) -> Result<(), DocumentError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, workbook)?;
    writer.flush()?;
    Ok(())
}
