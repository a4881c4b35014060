use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use flashsheet_core::{
    excel_serial_to_datetime, CellContent, CellCoord, CellError, CellValue, Sheet,
    StyleDescriptor, StyleTable, Workbook,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use super::styles::parse_styles;
use super::{attr_bool, attr_value, resolve_target, stored_width_to_chars};
use crate::error::DocumentError;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const DEFAULT_SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
const DEFAULT_STYLES_PART: &str = "xl/styles.xml";

/// Load an `.xlsx` file into the in-memory model. Formulas are kept as text.
pub fn read_xlsx(path: &Path) -> Result<Workbook, DocumentError> {
    let file = File::open(path)?;
    read_xlsx_from_reader(BufReader::new(file))
}

/// Load an `.xlsx` package from any seekable reader
pub fn read_xlsx_from_reader<R: Read + Seek>(reader: R) -> Result<Workbook, DocumentError> {
    let mut archive = ZipArchive::new(reader)?;

    let workbook_xml = read_part_required(&mut archive, WORKBOOK_PART)?;
    let rels_xml = read_part_optional(&mut archive, WORKBOOK_RELS_PART)?.unwrap_or_default();
    let relationships = parse_relationships(&rels_xml)?;
    let entries = parse_workbook(&workbook_xml)?;

    let shared_strings_part = relationships
        .iter()
        .find(|rel| rel.kind.ends_with("/sharedStrings"))
        .map(|rel| resolve_target("xl", &rel.target))
        .unwrap_or_else(|| DEFAULT_SHARED_STRINGS_PART.to_string());
    let shared_strings = match read_part_optional(&mut archive, &shared_strings_part)? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };

    let styles_part = relationships
        .iter()
        .find(|rel| rel.kind.ends_with("/styles"))
        .map(|rel| resolve_target("xl", &rel.target))
        .unwrap_or_else(|| DEFAULT_STYLES_PART.to_string());
    let styles = match read_part_optional(&mut archive, &styles_part)? {
        Some(xml) => parse_styles(&xml)?,
        None => Vec::new(),
    };

    let mut workbook = Workbook::empty();
    for entry in &entries.sheets {
        let target = relationships
            .iter()
            .find(|rel| rel.id == entry.relationship_id)
            .map(|rel| resolve_target("xl", &rel.target))
            .ok_or_else(|| DocumentError::MissingPart(format!("worksheet {}", entry.name)))?;

        let sheet_xml = read_part_required(&mut archive, &target)?;
        let sheet = parse_worksheet(&entry.name, &sheet_xml, &shared_strings, &styles)?;
        tracing::debug!(
            sheet = %entry.name,
            part = %target,
            cells = sheet.cell_count(),
            "loaded worksheet"
        );
        workbook.add_sheet(sheet)?;
    }

    if workbook.sheet_count() == 0 {
        return Err(DocumentError::NoSheets);
    }
    workbook.set_active_sheet(entries.active_tab.min(workbook.sheet_count() - 1));

    Ok(workbook)
}

fn read_part_required<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Vec<u8>, DocumentError> {
    read_part_optional(archive, name)?.ok_or_else(|| DocumentError::MissingPart(name.to_string()))
}

fn read_part_optional<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>, DocumentError> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut buf = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut buf)?;
            Ok(Some(buf))
        }
        Err(zip::result::ZipError::FileNotFound) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

#[derive(Debug)]
struct Relationship {
    id: String,
    kind: String,
    target: String,
}

fn parse_relationships(xml: &[u8]) -> Result<Vec<Relationship>, DocumentError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut out = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let id = attr_value(&e, b"Id")?;
                let kind = attr_value(&e, b"Type")?;
                let target = attr_value(&e, b"Target")?;
                if let (Some(id), Some(kind), Some(target)) = (id, kind, target) {
                    out.push(Relationship { id, kind, target });
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}

#[derive(Debug)]
struct SheetEntry {
    name: String,
    relationship_id: String,
}

#[derive(Debug, Default)]
struct WorkbookEntries {
    sheets: Vec<SheetEntry>,
    active_tab: usize,
}

fn parse_workbook(xml: &[u8]) -> Result<WorkbookEntries, DocumentError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut entries = WorkbookEntries::default();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"sheet" => {
                    let name = attr_value(&e, b"name")?;
                    // `r:id`; the local name is just `id`
                    let rel_id = attr_value(&e, b"id")?;
                    if let (Some(name), Some(relationship_id)) = (name, rel_id) {
                        entries.sheets.push(SheetEntry {
                            name,
                            relationship_id,
                        });
                    }
                }
                b"workbookView" => {
                    entries.active_tab = attr_value(&e, b"activeTab")?
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(0);
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(entries)
}

fn parse_shared_strings(xml: &[u8]) -> Result<Vec<String>, DocumentError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_t = false;
    // Phonetic runs (`<rPh>`) repeat text for furigana and are not part of the value
    let mut in_phonetic = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"t" => in_t = true,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => out.push(String::new()),
            Event::Text(t) if in_t && !in_phonetic => current.push_str(&t.unescape()?),
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => out.push(std::mem::take(&mut current)),
                b"t" => in_t = false,
                b"rPh" => in_phonetic = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}

/// State of the `<c>` element being read
#[derive(Debug, Default)]
struct PendingCell {
    coord: Option<CellCoord>,
    kind: Option<String>,
    style: usize,
    value_text: Option<String>,
    formula: Option<String>,
    inline_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TextTarget {
    None,
    Value,
    Formula,
    Inline,
}

fn parse_worksheet(
    name: &str,
    xml: &[u8],
    shared_strings: &[String],
    styles: &[StyleDescriptor],
) -> Result<Sheet, DocumentError> {
    let default_style = styles.first().cloned().unwrap_or_default();
    let mut sheet = Sheet::with_styles(name, StyleTable::with_default(default_style));

    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    let mut current_row: u32 = 0;
    let mut next_col: u32 = 0;
    let mut cell = PendingCell::default();
    let mut target = TextTarget::None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => {
                    current_row = read_row(&mut sheet, &e, current_row)?;
                    next_col = 0;
                }
                b"c" => {
                    cell = start_cell(&e, current_row, next_col)?;
                }
                b"v" => target = TextTarget::Value,
                b"f" => {
                    target = TextTarget::Formula;
                    cell.formula.get_or_insert_with(String::new);
                }
                b"t" if cell.kind.as_deref() == Some("inlineStr") => {
                    target = TextTarget::Inline;
                    cell.inline_text.get_or_insert_with(String::new);
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"sheetFormatPr" => read_sheet_format(&mut sheet, &e)?,
                b"col" => read_col(&mut sheet, &e)?,
                b"row" => {
                    current_row = read_row(&mut sheet, &e, current_row)? + 1;
                    next_col = 0;
                }
                b"c" => {
                    let pending = start_cell(&e, current_row, next_col)?;
                    next_col = finish_cell(&mut sheet, pending, shared_strings, styles)?;
                }
                _ => {}
            },
            Event::Text(t) => {
                let text = t.unescape()?;
                match target {
                    TextTarget::Value => cell.value_text.get_or_insert_with(String::new).push_str(&text),
                    TextTarget::Formula => cell.formula.get_or_insert_with(String::new).push_str(&text),
                    TextTarget::Inline => cell.inline_text.get_or_insert_with(String::new).push_str(&text),
                    TextTarget::None => {}
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" | b"f" | b"t" => target = TextTarget::None,
                b"row" => current_row += 1,
                b"c" => {
                    let pending = std::mem::take(&mut cell);
                    next_col = finish_cell(&mut sheet, pending, shared_strings, styles)?;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sheet)
}

fn read_sheet_format(sheet: &mut Sheet, e: &BytesStart<'_>) -> Result<(), DocumentError> {
    if let Some(height) = attr_value(e, b"defaultRowHeight")?.and_then(|v| v.parse().ok()) {
        sheet.default_row_height = height;
    }
    if let Some(width) = attr_value(e, b"defaultColWidth")?.and_then(|v| v.parse::<f64>().ok()) {
        sheet.default_col_width = stored_width_to_chars(width);
    }
    Ok(())
}

fn read_col(sheet: &mut Sheet, e: &BytesStart<'_>) -> Result<(), DocumentError> {
    let min: Option<u32> = attr_value(e, b"min")?.and_then(|v| v.parse().ok());
    let max: Option<u32> = attr_value(e, b"max")?.and_then(|v| v.parse().ok());
    let width: Option<f64> = attr_value(e, b"width")?.and_then(|v| v.parse().ok());

    let (Some(min), Some(width)) = (min, width) else {
        return Ok(());
    };
    let max = max.unwrap_or(min).min(Sheet::MAX_COLS);
    if min == 0 || min > max {
        return Ok(());
    }

    let chars = stored_width_to_chars(width);
    if min == 1 && max == Sheet::MAX_COLS {
        // Whole-sheet span: this is the effective default width
        sheet.default_col_width = chars;
        return Ok(());
    }
    for col in min..=max {
        sheet.set_col_width(col - 1, chars);
    }
    Ok(())
}

/// Returns the 0-indexed row number of the row element
fn read_row(sheet: &mut Sheet, e: &BytesStart<'_>, fallback: u32) -> Result<u32, DocumentError> {
    let row = attr_value(e, b"r")?
        .and_then(|r| r.parse::<u32>().ok())
        .and_then(|r| r.checked_sub(1))
        .unwrap_or(fallback);

    if attr_bool(e, b"customHeight", false)? {
        if let Some(height) = attr_value(e, b"ht")?.and_then(|v| v.parse().ok()) {
            sheet.set_row_height(row, height);
        }
    }
    Ok(row)
}

fn start_cell(e: &BytesStart<'_>, row: u32, next_col: u32) -> Result<PendingCell, DocumentError> {
    let coord = match attr_value(e, b"r")? {
        Some(reference) => CellCoord::from_a1(&reference)
            .ok_or(DocumentError::InvalidCellRef(reference))?,
        None => CellCoord::new(row, next_col),
    };

    Ok(PendingCell {
        coord: Some(coord),
        kind: attr_value(e, b"t")?,
        style: attr_value(e, b"s")?.and_then(|s| s.parse().ok()).unwrap_or(0),
        ..PendingCell::default()
    })
}

/// Store a finished cell; returns the column that follows it
fn finish_cell(
    sheet: &mut Sheet,
    cell: PendingCell,
    shared_strings: &[String],
    styles: &[StyleDescriptor],
) -> Result<u32, DocumentError> {
    let Some(coord) = cell.coord else {
        return Ok(0);
    };

    let style = styles.get(cell.style);
    let is_date_format = style.is_some_and(|s| s.number_format.is_date_time());
    let value = interpret_value(&cell, shared_strings, is_date_format);

    let formula = cell.formula.filter(|f| !f.trim().is_empty());
    // A formula that is just an error literal is how error values are stored
    let literal_error = formula
        .as_deref()
        .and_then(|f| CellError::from_literal(f.trim().trim_start_matches('=')));
    let content = match (formula, literal_error) {
        (_, Some(err)) => CellContent::Value {
            value: CellValue::Error(err),
        },
        (Some(expression), None) => CellContent::Formula {
            expression: format!("={}", expression.trim_start_matches('=')),
            cached_value: value,
        },
        (None, None) => CellContent::Value { value },
    };

    if let Some(style) = style {
        sheet.set_style(coord, style)?;
    }
    sheet.set_content(coord, content)?;

    Ok(coord.col + 1)
}

fn interpret_value(cell: &PendingCell, shared_strings: &[String], is_date_format: bool) -> CellValue {
    let raw = cell.value_text.as_deref();
    match cell.kind.as_deref() {
        Some("s") => raw
            .and_then(|idx| idx.trim().parse::<usize>().ok())
            .and_then(|idx| shared_strings.get(idx))
            .map(|s| CellValue::Text(s.clone()))
            .unwrap_or(CellValue::Empty),
        Some("inlineStr") => cell
            .inline_text
            .clone()
            .map(CellValue::Text)
            .unwrap_or(CellValue::Empty),
        Some("str") => raw
            .map(|s| CellValue::Text(s.to_string()))
            .unwrap_or(CellValue::Empty),
        Some("b") => match raw.map(str::trim) {
            Some("1") | Some("true") => CellValue::Boolean(true),
            Some(_) => CellValue::Boolean(false),
            None => CellValue::Empty,
        },
        Some("e") => raw
            .and_then(CellError::from_literal)
            .map(CellValue::Error)
            .unwrap_or(CellValue::Error(CellError::InvalidValue)),
        Some("d") => raw
            .and_then(parse_iso_datetime)
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Empty),
        _ => match raw.and_then(|v| v.trim().parse::<f64>().ok()) {
            Some(n) if is_date_format => excel_serial_to_datetime(n)
                .map(CellValue::DateTime)
                .unwrap_or(CellValue::Number(n)),
            Some(n) => CellValue::Number(n),
            None => CellValue::Empty,
        },
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_end_matches('Z');
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn build_package(sheet_xml: &str, shared_strings: Option<&str>) -> Vec<u8> {
        let workbook_xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
 xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <bookViews><workbookView activeTab="0"/></bookViews>
  <sheets><sheet name="Datos" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

        let workbook_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
</Relationships>"#;

        let cursor = Cursor::new(Vec::new());
        let mut zip = zip::ZipWriter::new(cursor);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        zip.start_file("xl/workbook.xml", options).unwrap();
        zip.write_all(workbook_xml.as_bytes()).unwrap();
        zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
        zip.write_all(workbook_rels.as_bytes()).unwrap();
        zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
        zip.write_all(sheet_xml.as_bytes()).unwrap();
        if let Some(sst) = shared_strings {
            zip.start_file("xl/sharedStrings.xml", options).unwrap();
            zip.write_all(sst.as_bytes()).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_reads_values_formulas_and_dimensions() {
        let sheet_xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <cols><col min="1" max="2" width="20.7109375" customWidth="1"/></cols>
  <sheetData>
    <row r="1" ht="30" customHeight="1">
      <c r="A1" t="s"><v>0</v></c>
      <c r="B1" t="inlineStr"><is><t>inline &amp; text</t></is></c>
    </row>
    <row r="3">
      <c r="A3"><v>1234.5</v></c>
      <c r="B3" t="b"><v>1</v></c>
      <c r="C3"><f>SUM(A3:A4)</f><v>1234.5</v></c>
      <c r="D3" t="e"><v>#DIV/0!</v></c>
      <c r="E3" t="str"><f>"a"&amp;"b"</f><v>ab</v></c>
      <c r="F3" t="str"><f>#N/A</f><v>#N/A</v></c>
    </row>
  </sheetData>
</worksheet>"#;
        let sst = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="1" uniqueCount="1">
  <si><r><t>Re</t></r><r><t xml:space="preserve">gión</t></r><rPh><t>x</t></rPh></si>
</sst>"#;

        let bytes = build_package(sheet_xml, Some(sst));
        let workbook = read_xlsx_from_reader(Cursor::new(bytes)).unwrap();
        let sheet = workbook.active_sheet().unwrap();

        assert_eq!(sheet.name, "Datos");
        let at = |a1: &str| CellCoord::from_a1(a1).unwrap();
        assert_eq!(sheet.value(at("A1")), &CellValue::Text("Región".into()));
        assert_eq!(sheet.value(at("B1")), &CellValue::Text("inline & text".into()));
        assert_eq!(sheet.value(at("A3")), &CellValue::Number(1234.5));
        assert_eq!(sheet.value(at("B3")), &CellValue::Boolean(true));
        assert_eq!(
            sheet.content(at("C3")),
            CellContent::Formula {
                expression: "=SUM(A3:A4)".into(),
                cached_value: CellValue::Number(1234.5),
            }
        );
        assert_eq!(
            sheet.value(at("D3")),
            &CellValue::Error(CellError::DivisionByZero)
        );
        assert_eq!(sheet.content(at("E3")).formula_expression(), Some("=\"a\"&\"b\""));
        assert_eq!(
            sheet.content(at("F3")),
            CellContent::Value {
                value: CellValue::Error(CellError::NotAvailable),
            }
        );

        assert_eq!(sheet.get_col_width(0), 20.0);
        assert_eq!(sheet.get_col_width(1), 20.0);
        assert_eq!(sheet.get_row_height(0), 30.0);
    }

    #[test]
    fn test_cells_without_references() {
        let sheet_xml = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row><c><v>1</v></c><c><v>2</v></c></row>
    <row><c r="C2"><v>3</v></c><c><v>4</v></c></row>
  </sheetData>
</worksheet>"#;

        let bytes = build_package(sheet_xml, None);
        let workbook = read_xlsx_from_reader(Cursor::new(bytes)).unwrap();
        let sheet = workbook.active_sheet().unwrap();

        assert_eq!(sheet.value(CellCoord::new(0, 0)), &CellValue::Number(1.0));
        assert_eq!(sheet.value(CellCoord::new(0, 1)), &CellValue::Number(2.0));
        assert_eq!(sheet.value(CellCoord::new(1, 2)), &CellValue::Number(3.0));
        assert_eq!(sheet.value(CellCoord::new(1, 3)), &CellValue::Number(4.0));
    }

    #[test]
    fn test_invalid_cell_reference() {
        let sheet_xml = r#"<worksheet><sheetData><row r="1"><c r="1A"><v>1</v></c></row></sheetData></worksheet>"#;
        let bytes = build_package(sheet_xml, None);
        let err = read_xlsx_from_reader(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidCellRef(r) if r == "1A"));
    }

    #[test]
    fn test_missing_workbook_part() {
        let cursor = Cursor::new(Vec::new());
        let zip = zip::ZipWriter::new(cursor);
        let bytes = zip.finish().unwrap().into_inner();

        let err = read_xlsx_from_reader(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, DocumentError::MissingPart(p) if p == WORKBOOK_PART));
    }
}
