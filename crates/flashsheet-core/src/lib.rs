pub mod cell;
pub mod error;
pub mod range;
pub mod sheet;
pub mod style;
pub mod style_table;
pub mod workbook;

pub use cell::{
    datetime_to_excel_serial, excel_serial_to_datetime, Cell, CellContent, CellValue,
};
pub use error::{CellError, SheetError};
pub use range::{col_from_label, col_to_label, CellCoord, CellRange};
pub use sheet::Sheet;
pub use style::{
    Alignment, BorderEdge, BorderSide, BorderStyle, Borders, Color, ColorRef, FillPattern,
    FillStyle, FontSize, FontStyle, HorizontalAlign, NumberFormat, StyleDescriptor,
    VerticalAlign,
};
pub use style_table::{StyleId, StyleTable};
pub use workbook::{Workbook, WorkbookMetadata};
