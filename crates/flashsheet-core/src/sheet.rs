use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::cell::{Cell, CellContent, CellValue};
use crate::error::SheetError;
use crate::range::{CellCoord, CellRange};
use crate::style::StyleDescriptor;
use crate::style_table::{StyleId, StyleTable};

/// Default row height in points
pub const DEFAULT_ROW_HEIGHT: f64 = 15.0;
/// Default column width in characters of the default font
pub const DEFAULT_COL_WIDTH: f64 = 8.43;

/// A single worksheet with sparse storage for cells
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sheet {
    /// Sheet name (displayed in tab)
    pub name: String,
    /// Sparse storage - only cells with content or a non-default style are kept
    #[serde(default, with = "cells_serde")]
    cells: BTreeMap<CellCoord, Cell>,
    /// Distinct styles referenced by the cells
    #[serde(default)]
    styles: StyleTable,
    /// Custom column widths (column index -> width in characters)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub col_widths: HashMap<u32, f64>,
    /// Custom row heights (row index -> height in points)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub row_heights: HashMap<u32, f64>,
    /// Width for columns without custom width
    #[serde(default = "default_col_width")]
    pub default_col_width: f64,
    /// Height for rows without custom height
    #[serde(default = "default_row_height")]
    pub default_row_height: f64,
}

fn default_row_height() -> f64 {
    DEFAULT_ROW_HEIGHT
}

fn default_col_width() -> f64 {
    DEFAULT_COL_WIDTH
}

mod cells_serde {
    use super::*;
    use serde::ser::SerializeMap;
    use serde::{de, Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(cells: &BTreeMap<CellCoord, Cell>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // A1 keys keep the JSON form readable
        let mut map = serializer.serialize_map(Some(cells.len()))?;
        for (coord, cell) in cells {
            map.serialize_entry(&coord.to_a1(), cell)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<CellCoord, Cell>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CellsVisitor;

        impl<'de> de::Visitor<'de> for CellsVisitor {
            type Value = BTreeMap<CellCoord, Cell>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map with A1 cell reference keys")
            }

            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: de::MapAccess<'de>,
            {
                let mut cells = BTreeMap::new();

                while let Some(key) = map.next_key::<String>()? {
                    let cell: Cell = map.next_value()?;
                    let coord = CellCoord::from_a1(&key).ok_or_else(|| {
                        de::Error::custom(format!("invalid cell reference: {key}"))
                    })?;
                    cells.insert(coord, cell);
                }

                Ok(cells)
            }
        }

        deserializer.deserialize_map(CellsVisitor)
    }
}

impl Sheet {
    /// Maximum number of rows (Excel compatibility)
    pub const MAX_ROWS: u32 = 1_048_576;
    /// Maximum number of columns (Column XFD)
    pub const MAX_COLS: u32 = 16_384;

    /// Create a new empty sheet with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_styles(name, StyleTable::new())
    }

    /// Create a new empty sheet that starts from an existing style table
    pub fn with_styles(name: impl Into<String>, styles: StyleTable) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            styles,
            col_widths: HashMap::new(),
            row_heights: HashMap::new(),
            default_col_width: DEFAULT_COL_WIDTH,
            default_row_height: DEFAULT_ROW_HEIGHT,
        }
    }

    fn check_bounds(coord: CellCoord) -> Result<(), SheetError> {
        if coord.is_valid(Self::MAX_ROWS, Self::MAX_COLS) {
            Ok(())
        } else {
            Err(SheetError::OutOfBounds { coord })
        }
    }

    /// Whether `range` lies entirely inside the sheet
    pub fn contains_range(range: &CellRange) -> bool {
        range.end.is_valid(Self::MAX_ROWS, Self::MAX_COLS)
    }

    /// Get a reference to a cell at the given coordinate
    pub fn get_cell(&self, coord: CellCoord) -> Option<&Cell> {
        self.cells.get(&coord)
    }

    /// Get the content of a cell (empty for non-existent cells)
    pub fn content(&self, coord: CellCoord) -> CellContent {
        self.get_cell(coord)
            .map(|c| c.content.clone())
            .unwrap_or_default()
    }

    /// Get the computed value of a cell (returns Empty for non-existent cells)
    pub fn value(&self, coord: CellCoord) -> &CellValue {
        self.get_cell(coord)
            .map(|c| c.computed_value())
            .unwrap_or(&CellValue::Empty)
    }

    /// Style id of a cell (default for non-existent cells)
    pub fn style_id(&self, coord: CellCoord) -> StyleId {
        self.get_cell(coord).map(|c| c.style).unwrap_or_default()
    }

    /// Resolved style of a cell
    pub fn style(&self, coord: CellCoord) -> &StyleDescriptor {
        self.styles
            .get(self.style_id(coord))
            .unwrap_or_else(|| self.styles.default_style())
    }

    /// The sheet's style table
    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    /// Replace a cell record wholesale
    pub fn set_cell(&mut self, coord: CellCoord, cell: Cell) -> Result<(), SheetError> {
        Self::check_bounds(coord)?;
        if cell.is_empty() {
            self.cells.remove(&coord);
        } else {
            self.cells.insert(coord, cell);
        }
        Ok(())
    }

    /// Set the content of a cell, keeping its style
    pub fn set_content(&mut self, coord: CellCoord, content: CellContent) -> Result<(), SheetError> {
        Self::check_bounds(coord)?;
        let cell = self.cells.entry(coord).or_default();
        cell.content = content;
        self.prune(coord);
        Ok(())
    }

    /// Set the value of a cell, keeping its style. `Empty` clears the content.
    pub fn set_value(&mut self, coord: CellCoord, value: CellValue) -> Result<(), SheetError> {
        self.set_content(coord, CellContent::Value { value })
    }

    /// Set the style of a cell, interning it in the style table
    pub fn set_style(
        &mut self,
        coord: CellCoord,
        style: &StyleDescriptor,
    ) -> Result<StyleId, SheetError> {
        Self::check_bounds(coord)?;
        let id = self.styles.intern(style)?;
        let cell = self.cells.entry(coord).or_default();
        cell.style = id;
        self.prune(coord);
        Ok(id)
    }

    /// Reset a cell to the default style, keeping its content
    pub fn clear_style(&mut self, coord: CellCoord) {
        if let Some(cell) = self.cells.get_mut(&coord) {
            cell.style = StyleId::DEFAULT;
        }
        self.prune(coord);
    }

    /// Remove a cell (content and style)
    pub fn remove_cell(&mut self, coord: CellCoord) {
        self.cells.remove(&coord);
    }

    // Drop records that no longer carry anything
    fn prune(&mut self, coord: CellCoord) {
        if self.cells.get(&coord).is_some_and(Cell::is_empty) {
            self.cells.remove(&coord);
        }
    }

    /// Get the column width for a specific column
    pub fn get_col_width(&self, col: u32) -> f64 {
        *self.col_widths.get(&col).unwrap_or(&self.default_col_width)
    }

    /// Set the column width for a specific column
    pub fn set_col_width(&mut self, col: u32, width: f64) {
        if (width - self.default_col_width).abs() < 0.01 {
            self.col_widths.remove(&col);
        } else {
            self.col_widths.insert(col, width);
        }
    }

    /// Get the row height for a specific row
    pub fn get_row_height(&self, row: u32) -> f64 {
        *self
            .row_heights
            .get(&row)
            .unwrap_or(&self.default_row_height)
    }

    /// Set the row height for a specific row
    pub fn set_row_height(&mut self, row: u32, height: f64) {
        if (height - self.default_row_height).abs() < 0.01 {
            self.row_heights.remove(&row);
        } else {
            self.row_heights.insert(row, height);
        }
    }

    /// Get the number of stored cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check if the sheet is empty
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Stored cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, &Cell)> + '_ {
        self.cells.iter().map(|(coord, cell)| (*coord, cell))
    }

    /// Stored cells inside a range, in row-major order
    pub fn cells_in_range(&self, range: CellRange) -> Vec<(CellCoord, &Cell)> {
        self.cells
            .range(range.start..=range.end)
            .filter(|(coord, _)| range.contains(**coord))
            .map(|(coord, cell)| (*coord, cell))
            .collect()
    }

    /// Get the bounding box of stored cells
    pub fn used_range(&self) -> Option<CellRange> {
        let first = self.cells.keys().next()?;
        let last = self.cells.keys().next_back()?;

        let (min_col, max_col) = self
            .cells
            .keys()
            .fold((u32::MAX, 0), |(lo, hi), c| (lo.min(c.col), hi.max(c.col)));

        Some(CellRange::new(
            CellCoord::new(first.row, min_col),
            CellCoord::new(last.row, max_col),
        ))
    }
}
