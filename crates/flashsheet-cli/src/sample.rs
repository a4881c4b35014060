use std::path::Path;

use anyhow::Context;
use flashsheet_core::{
    BorderEdge, BorderStyle, CellCoord, CellValue, Color, HorizontalAlign, Sheet,
    StyleDescriptor, Workbook,
};
use flashsheet_io::save_workbook;

const TITLE_FILL: Color = Color::RED;
const HEADER_BLUE: Color = Color::rgb(0x1F, 0x4E, 0x78);
const GRID: Color = Color::rgb(0xBF, 0xBF, 0xBF);

/// Template with a title, a bordered header row and a formatted data row
pub fn build_sample_workbook() -> anyhow::Result<Workbook> {
    let mut sheet = Sheet::new("Reporte");

    let title = StyleDescriptor::new()
        .with_font_size(16.0)
        .with_bold(true)
        .with_font_color(Color::WHITE)
        .with_solid_fill(TITLE_FILL);
    put(&mut sheet, CellCoord::new(0, 0), "TITULE".into(), &title)?;

    let header = StyleDescriptor::new()
        .with_bold(true)
        .with_font_color(HEADER_BLUE)
        .with_border(BorderEdge::Left, BorderStyle::Medium, Some(HEADER_BLUE.into()))
        .with_border(BorderEdge::Bottom, BorderStyle::Thin, Some(HEADER_BLUE.into()))
        .with_horizontal_align(HorizontalAlign::Center);
    for (col, label) in ["Header 1", "Header 2", "Header 3"].into_iter().enumerate() {
        put(&mut sheet, CellCoord::new(2, col as u32), label.into(), &header)?;
    }

    // Placeholder row the first insert lands on
    let text = StyleDescriptor::new()
        .with_italic(true)
        .with_border(BorderEdge::Bottom, BorderStyle::Hair, Some(GRID.into()));
    let amount = text
        .clone()
        .with_number_format("#,##0.00")
        .with_horizontal_align(HorizontalAlign::Right);
    let share = text.clone().with_number_format("0.0%");
    put(&mut sheet, CellCoord::new(4, 0), "Región".into(), &text)?;
    put(&mut sheet, CellCoord::new(4, 1), CellValue::Number(0.0), &amount)?;
    put(&mut sheet, CellCoord::new(4, 2), CellValue::Number(0.0), &share)?;

    sheet.set_col_width(0, 20.0);
    sheet.set_col_width(1, 15.0);
    sheet.set_row_height(0, 24.0);

    let mut workbook = Workbook::empty();
    workbook.add_sheet(sheet)?;
    Ok(workbook)
}

pub fn write_sample(path: &Path) -> anyhow::Result<()> {
    let workbook = build_sample_workbook()?;
    save_workbook(&workbook, path)
        .with_context(|| format!("failed to write sample template {}", path.display()))?;
    tracing::info!(path = %path.display(), "sample template written");
    Ok(())
}

fn put(
    sheet: &mut Sheet,
    coord: CellCoord,
    value: CellValue,
    style: &StyleDescriptor,
) -> anyhow::Result<()> {
    sheet.set_style(coord, style)?;
    sheet.set_value(coord, value)?;
    Ok(())
}
