//! Office Open XML (`.xlsx`) persistence.
//!
//! Reading walks the package with `zip` + `quick-xml` and never evaluates
//! formulas; writing goes through `rust_xlsxwriter`.

mod reader;
mod styles;
mod writer;

pub use reader::{read_xlsx, read_xlsx_from_reader};
pub use writer::write_xlsx;

use quick_xml::events::BytesStart;

use crate::error::DocumentError;

// Excel measures column widths in pixels of the default font's widest digit
const MAX_DIGIT_WIDTH: f64 = 7.0;
// Cell padding included in stored widths
const WIDTH_PADDING: f64 = 5.0;

/// Convert a stored `<col width>` (which includes padding) to character units
pub(crate) fn stored_width_to_chars(stored: f64) -> f64 {
    let pixels = (stored * MAX_DIGIT_WIDTH).round();
    let chars = if pixels <= MAX_DIGIT_WIDTH + WIDTH_PADDING {
        pixels / (MAX_DIGIT_WIDTH + WIDTH_PADDING)
    } else {
        (pixels - WIDTH_PADDING) / MAX_DIGIT_WIDTH
    };
    (chars * 100.0).round() / 100.0
}

/// Value of the attribute whose local name is `key`
pub(crate) fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, DocumentError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// OOXML boolean attribute (`1`/`true`; a missing attribute is `default`)
pub(crate) fn attr_bool(e: &BytesStart<'_>, key: &[u8], default: bool) -> Result<bool, DocumentError> {
    Ok(match attr_value(e, key)?.as_deref() {
        Some("1") | Some("true") => true,
        Some("0") | Some("false") => false,
        _ => default,
    })
}

/// Resolve a relationship target against the directory of its source part
pub(crate) fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut parts: Vec<&str> = base_dir.split('/').filter(|p| !p.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_width_to_chars() {
        // Widths as written for 20 and 12 characters
        assert_eq!(stored_width_to_chars(20.7109375), 20.0);
        assert_eq!(stored_width_to_chars(12.7109375), 12.0);
        // Excel's default column
        assert_eq!(stored_width_to_chars(9.140625), 8.43);
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target("xl", "worksheets/sheet1.xml"),
            "xl/worksheets/sheet1.xml"
        );
        assert_eq!(
            resolve_target("xl", "/xl/worksheets/sheet2.xml"),
            "xl/worksheets/sheet2.xml"
        );
        assert_eq!(
            resolve_target("xl/worksheets", "../sharedStrings.xml"),
            "xl/sharedStrings.xml"
        );
    }
}
