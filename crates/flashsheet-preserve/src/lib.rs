//! Format-preserving region writer.
//!
//! Writing values into a worksheet region goes through three phases: the
//! formatting of every non-empty cell in the region is captured, the payload
//! is written, and the captured formatting is reapplied cell by cell. A cell
//! whose formatting cannot be reapplied keeps its value and is reported.

pub mod backup;
pub mod document;
pub mod error;
pub mod mapping;
pub mod payload;
pub mod preserver;
pub mod report;
pub mod restore;
pub mod snapshot;
pub mod store;

pub use backup::{backup_area_formatting, AreaSize, RegionBackup};
pub use document::{
    create_excel_with_format_preservation_in_sheet, create_excel_with_simple_format_preservation,
    PreservationOutcome,
};
pub use error::{PreserveError, RestoreError};
pub use mapping::ColumnMapping;
pub use payload::{PayloadRow, TabularPayload};
pub use preserver::{insert_data_simple_preservation, write_region, Phase};
pub use report::{CellRestoreOutcome, RestoreReport};
pub use restore::{apply_snapshot, restore_cell, restore_region};
pub use snapshot::{
    AlignmentSnapshot, BorderSnapshot, BordersSnapshot, CellStyleSnapshot, FillSnapshot,
    FontSnapshot,
};
pub use store::CellStore;
