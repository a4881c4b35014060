use flashsheet_core::{CellContent, CellCoord, CellRange, Sheet, SheetError, StyleDescriptor};

/// The worksheet surface the region writer works through
pub trait CellStore {
    /// Content of a cell; empty for cells that were never written
    fn content(&self, coord: CellCoord) -> CellContent;

    /// Effective style of a cell
    fn style(&self, coord: CellCoord) -> &StyleDescriptor;

    fn set_content(&mut self, coord: CellCoord, content: CellContent) -> Result<(), SheetError>;

    fn set_style(&mut self, coord: CellCoord, style: &StyleDescriptor) -> Result<(), SheetError>;

    /// Coordinates inside `range` that hold content, in row-major order
    fn occupied_in(&self, range: CellRange) -> Vec<CellCoord> {
        range
            .iter()
            .filter(|coord| !self.content(*coord).is_empty())
            .collect()
    }
}

impl CellStore for Sheet {
    fn content(&self, coord: CellCoord) -> CellContent {
        Sheet::content(self, coord)
    }

    fn style(&self, coord: CellCoord) -> &StyleDescriptor {
        Sheet::style(self, coord)
    }

    fn set_content(&mut self, coord: CellCoord, content: CellContent) -> Result<(), SheetError> {
        Sheet::set_content(self, coord, content)
    }

    fn set_style(&mut self, coord: CellCoord, style: &StyleDescriptor) -> Result<(), SheetError> {
        Sheet::set_style(self, coord, style).map(|_| ())
    }

    // Walks the sparse map instead of every coordinate of the range
    fn occupied_in(&self, range: CellRange) -> Vec<CellCoord> {
        self.cells_in_range(range)
            .into_iter()
            .filter(|(_, cell)| !cell.content.is_empty())
            .map(|(coord, _)| coord)
            .collect()
    }
}
