use std::collections::BTreeMap;

use flashsheet_core::{CellCoord, CellRange, Sheet, StyleDescriptor};
use serde::{Deserialize, Serialize};

use crate::snapshot::CellStyleSnapshot;
use crate::store::CellStore;

/// Extent of a region measured from its anchor cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaSize {
    pub rows: u32,
    pub cols: u32,
}

impl AreaSize {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// The region anchored at `anchor`, clipped to the worksheet bounds
    pub fn range_from(&self, anchor: CellCoord) -> Option<CellRange> {
        if self.is_empty() || !anchor.is_valid(Sheet::MAX_ROWS, Sheet::MAX_COLS) {
            return None;
        }
        let end = CellCoord::new(
            anchor.row.saturating_add(self.rows - 1).min(Sheet::MAX_ROWS - 1),
            anchor.col.saturating_add(self.cols - 1).min(Sheet::MAX_COLS - 1),
        );
        Some(CellRange::new(anchor, end))
    }
}

#[derive(Debug, Clone, PartialEq)]
struct CapturedCell {
    snapshot: CellStyleSnapshot,
    /// Style the cell carried at capture time
    style: StyleDescriptor,
}

/// Snapshots of the cells of a region that held content, keyed by coordinate
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionBackup {
    cells: BTreeMap<CellCoord, CapturedCell>,
}

impl RegionBackup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        coord: CellCoord,
        snapshot: CellStyleSnapshot,
        style: StyleDescriptor,
    ) {
        self.cells.insert(coord, CapturedCell { snapshot, style });
    }

    pub fn get(&self, coord: CellCoord) -> Option<&CellStyleSnapshot> {
        self.cells.get(&coord).map(|cell| &cell.snapshot)
    }

    pub fn get_mut(&mut self, coord: CellCoord) -> Option<&mut CellStyleSnapshot> {
        self.cells.get_mut(&coord).map(|cell| &mut cell.snapshot)
    }

    /// The full style the cell had when it was captured
    pub fn captured_style(&self, coord: CellCoord) -> Option<&StyleDescriptor> {
        self.cells.get(&coord).map(|cell| &cell.style)
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        self.cells.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Snapshots in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &CellStyleSnapshot)> + '_ {
        self.cells.iter().map(|(coord, cell)| (*coord, &cell.snapshot))
    }

    pub fn coords(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.keys().copied()
    }
}

/// Capture the formatting of every non-empty cell in the region.
///
/// Read-only. Empty cells get no entry, so they are never restored later.
pub fn backup_area_formatting<S>(store: &S, anchor: CellCoord, size: AreaSize) -> RegionBackup
where
    S: CellStore + ?Sized,
{
    let mut backup = RegionBackup::new();
    let Some(range) = size.range_from(anchor) else {
        return backup;
    };

    for coord in store.occupied_in(range) {
        let style = store.style(coord);
        let snapshot = CellStyleSnapshot::capture(coord, store.content(coord), style);
        backup.insert(coord, snapshot, style.clone());
    }

    tracing::debug!(region = %range, captured = backup.len(), "captured region formatting");
    backup
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashsheet_core::{CellContent, CellValue, SheetError};

    fn at(a1: &str) -> CellCoord {
        CellCoord::from_a1(a1).unwrap()
    }

    #[test]
    fn test_range_from_clips_to_sheet() {
        let size = AreaSize::new(3, 2);
        assert_eq!(size.range_from(at("B2")), CellRange::from_a1("B2:C4"));

        let edge = CellCoord::new(Sheet::MAX_ROWS - 1, 0);
        let clipped = size.range_from(edge).unwrap();
        assert_eq!(clipped.end.row, Sheet::MAX_ROWS - 1);

        assert_eq!(AreaSize::new(0, 5).range_from(at("A1")), None);
        assert_eq!(size.range_from(CellCoord::new(Sheet::MAX_ROWS, 0)), None);
    }

    #[test]
    fn test_backup_skips_empty_and_styled_only_cells() {
        let mut sheet = Sheet::new("Datos");
        let bold = StyleDescriptor::new().with_bold(true);
        sheet.set_value(at("A1"), "uno".into()).unwrap();
        sheet.set_style(at("A1"), &bold).unwrap();
        // Styled but empty: not captured
        sheet.set_style(at("B1"), &bold).unwrap();
        sheet.set_value(at("B2"), CellValue::Number(2.0)).unwrap();
        // Outside the region
        sheet.set_value(at("D1"), "fuera".into()).unwrap();

        let backup = backup_area_formatting(&sheet, at("A1"), AreaSize::new(2, 3));

        assert_eq!(backup.coords().collect::<Vec<_>>(), vec![at("A1"), at("B2")]);
        let a1 = backup.get(at("A1")).unwrap();
        assert!(a1.font.bold);
        assert_eq!(a1.value, CellContent::from(CellValue::Text("uno".into())));
        assert_eq!(backup.captured_style(at("A1")), Some(&bold));
        assert!(!backup.contains(at("B1")));
    }

    #[test]
    fn test_default_scan_matches_sparse_scan() {
        struct Plain<'a>(&'a Sheet);

        impl CellStore for Plain<'_> {
            fn content(&self, coord: CellCoord) -> CellContent {
                self.0.content(coord)
            }
            fn style(&self, coord: CellCoord) -> &StyleDescriptor {
                self.0.style(coord)
            }
            fn set_content(
                &mut self,
                _: CellCoord,
                _: CellContent,
            ) -> Result<(), SheetError> {
                unreachable!()
            }
            fn set_style(
                &mut self,
                _: CellCoord,
                _: &StyleDescriptor,
            ) -> Result<(), SheetError> {
                unreachable!()
            }
        }

        let mut sheet = Sheet::new("Datos");
        sheet.set_value(at("B3"), "x".into()).unwrap();
        sheet.set_value(at("C4"), CellValue::Boolean(false)).unwrap();
        let range = CellRange::from_a1("A1:D5").unwrap();

        assert_eq!(Plain(&sheet).occupied_in(range), sheet.occupied_in(range));
    }
}
