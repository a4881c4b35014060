use flashsheet_core::SheetError;
use quick_xml::events::attributes::AttrError;
use thiserror::Error;

/// Errors raised while loading or saving a document
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("xml attribute error: {0}")]
    XmlAttr(#[from] AttrError),

    #[error("xlsx write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error("missing required part: {0}")]
    MissingPart(String),

    #[error("invalid cell reference: {0}")]
    InvalidCellRef(String),

    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("workbook has no sheets")]
    NoSheets,
}
