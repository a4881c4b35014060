use std::path::Path;

use flashsheet_core::CellCoord;
use flashsheet_io::{load_workbook, save_workbook, DocumentError};
use serde::Serialize;

use crate::error::PreserveError;
use crate::mapping::ColumnMapping;
use crate::payload::TabularPayload;
use crate::preserver::insert_data_simple_preservation;
use crate::report::RestoreReport;

/// What a document-level run reports back. Failures never escape as errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreservationOutcome {
    pub success: bool,
    /// Per-cell restore results; empty when the run failed
    pub report: RestoreReport,
    /// Why the run failed
    pub diagnostic: Option<String>,
}

/// Open `template`, write `payload` at `start_cell` of the active sheet while
/// preserving formatting, and save the result to `output`.
pub fn create_excel_with_simple_format_preservation(
    template: &Path,
    output: &Path,
    payload: &TabularPayload,
    mapping: &ColumnMapping,
    start_cell: &str,
) -> PreservationOutcome {
    create_excel_with_format_preservation_in_sheet(
        template, output, payload, mapping, start_cell, None,
    )
}

/// Same as [`create_excel_with_simple_format_preservation`] with an explicit
/// target sheet (matched case-insensitively). `None` selects the active sheet.
pub fn create_excel_with_format_preservation_in_sheet(
    template: &Path,
    output: &Path,
    payload: &TabularPayload,
    mapping: &ColumnMapping,
    start_cell: &str,
    sheet: Option<&str>,
) -> PreservationOutcome {
    match preserve_document(template, output, payload, mapping, start_cell, sheet) {
        Ok(report) => {
            tracing::info!(output = %output.display(), %report, "workbook written");
            PreservationOutcome {
                success: true,
                report,
                diagnostic: None,
            }
        }
        Err(err) => {
            tracing::error!(
                template = %template.display(),
                output = %output.display(),
                error = %err,
                "format-preserving write failed"
            );
            PreservationOutcome {
                success: false,
                report: RestoreReport::default(),
                diagnostic: Some(err.to_string()),
            }
        }
    }
}

fn preserve_document(
    template: &Path,
    output: &Path,
    payload: &TabularPayload,
    mapping: &ColumnMapping,
    start_cell: &str,
    sheet: Option<&str>,
) -> Result<RestoreReport, PreserveError> {
    let anchor = CellCoord::from_a1(start_cell)
        .ok_or_else(|| PreserveError::InvalidStartCell(start_cell.to_string()))?;

    let mut workbook = load_workbook(template)?;
    let target = match sheet {
        Some(name) => workbook
            .get_sheet_by_name_mut(name)
            .ok_or_else(|| PreserveError::SheetNotFound(name.to_string()))?,
        None => workbook.active_sheet_mut().ok_or(DocumentError::NoSheets)?,
    };
    tracing::debug!(sheet = %target.name, mapping = %mapping.describe(), "template loaded");

    let report = insert_data_simple_preservation(target, payload, mapping, anchor)?;
    save_workbook(&workbook, output)?;
    Ok(report)
}
