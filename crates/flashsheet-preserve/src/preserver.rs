use std::collections::HashMap;
use std::fmt;

use flashsheet_core::{CellContent, CellCoord, CellRange, Sheet};

use crate::backup::{backup_area_formatting, AreaSize};
use crate::error::PreserveError;
use crate::mapping::ColumnMapping;
use crate::payload::TabularPayload;
use crate::report::RestoreReport;
use crate::restore::restore_region;
use crate::store::CellStore;

/// Phases of one write operation, always run in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Capture,
    Overwrite,
    Restore,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Capture => "CAPTURE",
            Phase::Overwrite => "OVERWRITE",
            Phase::Restore => "RESTORE",
            Phase::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// Top-left cell and extent of the cells an insert may touch.
///
/// Rows run from the anchor row over one row per payload row. Columns span
/// from the leftmost of the anchor column and the mapped columns to the
/// rightmost mapped column. `None` when nothing would be written.
pub fn write_region(
    payload: &TabularPayload,
    mapping: &ColumnMapping,
    anchor: CellCoord,
) -> Option<(CellCoord, AreaSize)> {
    let (min_col, max_col) = (mapping.min_column()?, mapping.max_column()?);
    if payload.is_empty() {
        return None;
    }
    let first_col = anchor.col.min(min_col);
    let rows = u32::try_from(payload.len()).unwrap_or(u32::MAX);
    Some((
        CellCoord::new(anchor.row, first_col),
        AreaSize::new(rows, max_col - first_col + 1),
    ))
}

fn check_bounds(start: CellCoord, size: AreaSize) -> Result<(), PreserveError> {
    let range = start
        .offset(size.rows.saturating_sub(1), size.cols.saturating_sub(1))
        .map(|end| CellRange::new(start, end));
    match range {
        Some(range) if Sheet::contains_range(&range) => Ok(()),
        _ => Err(PreserveError::RegionOutOfBounds {
            anchor: start,
            rows: size.rows as u64,
            cols: size.cols as u64,
        }),
    }
}

/// Write `payload` at `anchor` and put back the formatting the region had.
///
/// Runs CAPTURE, OVERWRITE, RESTORE in sequence against the same store. A
/// region that does not fit the worksheet is rejected before anything is
/// written. A value that cannot be written and a restoration failure are
/// both per cell: they end up in the report and the run continues.
pub fn insert_data_simple_preservation<S>(
    store: &mut S,
    payload: &TabularPayload,
    mapping: &ColumnMapping,
    anchor: CellCoord,
) -> Result<RestoreReport, PreserveError>
where
    S: CellStore + ?Sized,
{
    let span = tracing::info_span!("insert_data", anchor = %anchor, rows = payload.len());
    let _guard = span.enter();

    if !anchor.is_valid(Sheet::MAX_ROWS, Sheet::MAX_COLS) {
        return Err(PreserveError::RegionOutOfBounds {
            anchor,
            rows: payload.len() as u64,
            cols: mapping.len() as u64,
        });
    }
    let Some((start, size)) = write_region(payload, mapping, anchor) else {
        tracing::debug!("nothing to write");
        return Ok(RestoreReport::default());
    };
    check_bounds(start, size)?;

    tracing::debug!(phase = %Phase::Capture, rows = size.rows, cols = size.cols);
    let backup = backup_area_formatting(&*store, start, size);

    tracing::debug!(phase = %Phase::Overwrite, captured = backup.len());
    let mut written: HashMap<CellCoord, CellContent> = HashMap::new();
    let mut write_failures = Vec::new();
    for (offset, row) in payload.rows().iter().enumerate() {
        // In range: check_bounds covered anchor.row + payload.len() - 1
        let row_index = anchor.row + offset as u32;
        for (field, value) in row {
            let Some(col) = mapping.get(field) else {
                continue;
            };
            let coord = CellCoord::new(row_index, col);
            let content = CellContent::from(value.clone());
            match store.set_content(coord, content.clone()) {
                Ok(()) => {
                    written.insert(coord, content);
                }
                Err(err) => {
                    tracing::warn!(cell = %coord, error = %err, "value not written");
                    write_failures.push((coord, err.to_string()));
                }
            }
        }
    }

    tracing::debug!(phase = %Phase::Restore, written = written.len());
    let mut report = restore_region(store, &backup, &written);
    for (coord, reason) in write_failures {
        report.record_write_failure(coord, reason);
    }

    tracing::debug!(
        phase = %Phase::Done,
        restored = report.restored_count(),
        failed = report.failed_count(),
        not_written = report.write_failed_count()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::PayloadRow;
    use flashsheet_core::CellValue;

    fn at(a1: &str) -> CellCoord {
        CellCoord::from_a1(a1).unwrap()
    }

    fn payload(rows: usize) -> TabularPayload {
        (0..rows)
            .map(|i| PayloadRow::from_iter([("v".to_string(), CellValue::Number(i as f64))]))
            .collect()
    }

    #[test]
    fn test_write_region_spans_anchor_and_mapped_columns() {
        let mapping = ColumnMapping::from_letters([("a", "B"), ("b", "D")]).unwrap();

        let (start, size) = write_region(&payload(3), &mapping, at("A5")).unwrap();
        assert_eq!(start, at("A5"));
        assert_eq!(size, AreaSize::new(3, 4));

        let (start, size) = write_region(&payload(2), &mapping, at("C5")).unwrap();
        assert_eq!(start, at("B5"));
        assert_eq!(size, AreaSize::new(2, 3));
    }

    #[test]
    fn test_write_region_none_when_nothing_to_write() {
        let mapping = ColumnMapping::from_letters([("a", "B")]).unwrap();
        assert!(write_region(&TabularPayload::new(), &mapping, at("A1")).is_none());
        assert!(write_region(&payload(2), &ColumnMapping::new(), at("A1")).is_none());
    }

    #[test]
    fn test_phase_names() {
        let names: Vec<String> = [Phase::Capture, Phase::Overwrite, Phase::Restore, Phase::Done]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(names, ["CAPTURE", "OVERWRITE", "RESTORE", "DONE"]);
    }
}
