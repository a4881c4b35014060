use chrono::NaiveDate;
use flashsheet_core::{
    BorderEdge, BorderStyle, CellContent, CellCoord, CellError, CellValue, Color, ColorRef,
    FillPattern, HorizontalAlign, Sheet, StyleDescriptor, Workbook,
};
use flashsheet_io::{load_workbook, save_workbook, DocumentError};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn at(a1: &str) -> CellCoord {
    CellCoord::from_a1(a1).unwrap()
}

fn sample_workbook() -> Workbook {
    let mut sheet = Sheet::new("Ventas");

    let header = StyleDescriptor::new()
        .with_font_name("Arial")
        .with_font_size(14.0)
        .with_bold(true)
        .with_font_color(Color::WHITE)
        .with_solid_fill(Color::rgb(0x1F, 0x4E, 0x78))
        .with_border(BorderEdge::Bottom, BorderStyle::Thin, Some(Color::BLACK.into()))
        .with_horizontal_align(HorizontalAlign::Center);
    sheet.set_style(at("A1"), &header).unwrap();
    sheet.set_value(at("A1"), "Región".into()).unwrap();
    sheet.set_style(at("B1"), &header).unwrap();
    sheet.set_value(at("B1"), "Total".into()).unwrap();

    sheet.set_value(at("A2"), "Norte".into()).unwrap();
    sheet.set_value(at("B2"), CellValue::Number(1200.5)).unwrap();
    sheet.set_value(at("A3"), "Sur".into()).unwrap();
    sheet.set_value(at("B3"), CellValue::Number(800.0)).unwrap();

    let money = StyleDescriptor::new().with_number_format("#,##0.00");
    sheet.set_style(at("B4"), &money).unwrap();
    sheet
        .set_content(
            at("B4"),
            CellContent::Formula {
                expression: "=SUM(B2:B3)".into(),
                cached_value: CellValue::Number(2000.5),
            },
        )
        .unwrap();

    sheet.set_value(at("C2"), CellValue::Boolean(true)).unwrap();
    let day = NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    sheet.set_value(at("D2"), CellValue::DateTime(day)).unwrap();
    sheet
        .set_value(at("E2"), CellValue::Error(CellError::DivisionByZero))
        .unwrap();

    sheet.set_col_width(0, 20.0);
    sheet.set_row_height(0, 30.0);

    let mut workbook = Workbook::empty();
    workbook.add_sheet(sheet).unwrap();
    workbook.add_sheet(Sheet::new("Notas")).unwrap();
    workbook.set_active_sheet(1);
    workbook
}

#[test]
fn test_xlsx_round_trip_keeps_values_and_formatting() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ventas.xlsx");

    save_workbook(&sample_workbook(), &path).unwrap();
    let loaded = load_workbook(&path).unwrap();

    assert_eq!(loaded.sheet_count(), 2);
    assert_eq!(loaded.active_sheet_index, 1);

    let sheet = loaded.get_sheet_by_name("Ventas").unwrap();
    assert_eq!(sheet.value(at("A1")), &CellValue::Text("Región".into()));
    assert_eq!(sheet.value(at("B2")), &CellValue::Number(1200.5));
    assert_eq!(sheet.value(at("C2")), &CellValue::Boolean(true));
    assert_eq!(
        sheet.value(at("D2")),
        &CellValue::DateTime(
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        )
    );
    assert_eq!(
        sheet.content(at("E2")),
        CellContent::Value {
            value: CellValue::Error(CellError::DivisionByZero),
        }
    );
    assert_eq!(
        sheet.content(at("B4")),
        CellContent::Formula {
            expression: "=SUM(B2:B3)".into(),
            cached_value: CellValue::Number(2000.5),
        }
    );

    let header = sheet.style(at("A1"));
    assert_eq!(header.font.name.as_deref(), Some("Arial"));
    assert_eq!(header.font.size.map(|s| s.points()), Some(14.0));
    assert!(header.font.bold);
    assert_eq!(
        header.font.color.and_then(|c| c.normalized_hex()).as_deref(),
        Some("FFFFFFFF")
    );
    assert_eq!(header.fill.pattern, FillPattern::Solid);
    assert_eq!(
        header.fill.fg_color,
        Some(ColorRef::Rgb(Color::rgb(0x1F, 0x4E, 0x78)))
    );
    assert_eq!(header.borders.bottom.style, BorderStyle::Thin);
    assert_eq!(header.alignment.horizontal, Some(HorizontalAlign::Center));
    assert_eq!(sheet.style_id(at("A1")), sheet.style_id(at("B1")));

    assert_eq!(sheet.style(at("B4")).number_format.code(), "#,##0.00");
    assert!(sheet.style_id(at("A2")).is_default());

    assert_eq!(sheet.get_col_width(0), 20.0);
    assert_eq!(sheet.get_col_width(1), sheet.default_col_width);
    assert_eq!(sheet.get_row_height(0), 30.0);
}

#[test]
fn test_xlsx_keeps_non_standard_default_column_width() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("anchas.xlsx");
    let mut sheet = Sheet::new("Datos");
    sheet.default_col_width = 15.0;
    sheet.set_col_width(1, 20.0);
    sheet.set_value(at("D1"), "fin".into()).unwrap();
    let mut workbook = Workbook::empty();
    workbook.add_sheet(sheet).unwrap();

    save_workbook(&workbook, &path).unwrap();
    let loaded = load_workbook(&path).unwrap();

    let sheet = loaded.active_sheet().unwrap();
    assert_eq!(sheet.get_col_width(0), 15.0);
    assert_eq!(sheet.get_col_width(1), 20.0);
    assert_eq!(sheet.get_col_width(2), 15.0);
    assert_eq!(sheet.get_col_width(3), 15.0);
}

#[test]
fn test_json_round_trip_is_lossless() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ventas.json");
    let original = sample_workbook();

    save_workbook(&original, &path).unwrap();
    let loaded = load_workbook(&path).unwrap();

    assert_eq!(loaded.sheet_count(), original.sheet_count());
    assert_eq!(loaded.active_sheet_index, 1);
    let (before, after) = (&original.sheets[0], &loaded.sheets[0]);
    assert_eq!(
        before.cells().collect::<Vec<_>>(),
        after.cells().collect::<Vec<_>>()
    );
    assert_eq!(before.style(at("A1")), after.style(at("A1")));
    assert_eq!(after.get_col_width(0), 20.0);
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ventas.xls");
    let err = save_workbook(&sample_workbook(), &path).unwrap_err();
    assert!(matches!(err, DocumentError::UnsupportedFormat(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = load_workbook(&dir.path().join("nope.xlsx")).unwrap_err();
    assert!(matches!(err, DocumentError::Io(_)));
}
