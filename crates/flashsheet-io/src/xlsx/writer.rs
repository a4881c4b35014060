use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use chrono::Timelike;
use flashsheet_core::{
    datetime_to_excel_serial, BorderStyle, CellContent, CellValue, ColorRef, FillPattern,
    HorizontalAlign, Sheet, StyleDescriptor, StyleId, VerticalAlign, Workbook,
    sheet::{DEFAULT_COL_WIDTH, DEFAULT_ROW_HEIGHT},
};
use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, FormatPattern, FormatUnderline, Formula,
    Workbook as XlsxWorkbook, Worksheet,
};

use crate::error::DocumentError;

const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATE_TIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Save the workbook as `.xlsx`
pub fn write_xlsx(workbook: &Workbook, path: &Path) -> Result<(), DocumentError> {
    if workbook.sheets.is_empty() {
        return Err(DocumentError::NoSheets);
    }

    let mut xlsx = XlsxWorkbook::new();
    for (index, sheet) in workbook.sheets.iter().enumerate() {
        let worksheet = xlsx.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        if index == workbook.active_sheet_index {
            worksheet.set_active(true);
        }
        write_sheet(worksheet, sheet)?;
        tracing::debug!(sheet = %sheet.name, cells = sheet.cell_count(), "wrote worksheet");
    }

    xlsx.save(path)?;
    Ok(())
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<(), DocumentError> {
    if (sheet.default_row_height - DEFAULT_ROW_HEIGHT).abs() > f64::EPSILON {
        worksheet.set_default_row_height(sheet.default_row_height);
    }

    for (col, width) in column_widths(sheet) {
        let Ok(col) = u16::try_from(col) else {
            continue;
        };
        worksheet.set_column_width(col, width)?;
    }

    let mut heights: Vec<_> = sheet.row_heights.iter().collect();
    heights.sort_by_key(|(row, _)| **row);
    for (&row, &height) in heights {
        worksheet.set_row_height(row, height)?;
    }

    let mut formats: HashMap<StyleId, Format> = HashMap::new();
    for (coord, cell) in sheet.cells() {
        let Ok(col) = u16::try_from(coord.col) else {
            continue;
        };
        let style = sheet.style(coord);
        let format = formats
            .entry(cell.style)
            .or_insert_with(|| build_format(style));

        match &cell.content {
            CellContent::Value { value } => {
                write_value(worksheet, coord.row, col, value, format, style)?;
            }
            CellContent::Formula {
                expression,
                cached_value,
            } => {
                let mut formula = Formula::new(expression.as_str());
                if !cached_value.is_empty() {
                    formula = formula.set_result(cached_value.as_text());
                }
                worksheet.write_formula_with_format(coord.row, col, formula, format)?;
            }
        }
    }

    Ok(())
}

/// Explicit column widths to write.
///
/// The format has no portable sheet-wide default width, so a non-standard
/// default is spelled out for every column up to the last one in use.
fn column_widths(sheet: &Sheet) -> BTreeMap<u32, f64> {
    let mut widths: BTreeMap<u32, f64> =
        sheet.col_widths.iter().map(|(&col, &width)| (col, width)).collect();
    if (sheet.default_col_width - DEFAULT_COL_WIDTH).abs() < 0.01 {
        return widths;
    }
    let last_used = sheet.used_range().map(|range| range.end.col);
    let last_custom = widths.keys().next_back().copied();
    let Some(last) = last_used.max(last_custom) else {
        return widths;
    };
    for col in 0..=last {
        widths.entry(col).or_insert(sheet.default_col_width);
    }
    widths
}

fn write_value(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    format: &Format,
    style: &StyleDescriptor,
) -> Result<(), DocumentError> {
    match value {
        CellValue::Empty => {
            worksheet.write_blank(row, col, format)?;
        }
        CellValue::Number(n) => {
            worksheet.write_number_with_format(row, col, *n, format)?;
        }
        CellValue::Text(s) => {
            worksheet.write_string_with_format(row, col, s, format)?;
        }
        CellValue::Boolean(b) => {
            worksheet.write_boolean_with_format(row, col, *b, format)?;
        }
        CellValue::DateTime(dt) => {
            let serial = datetime_to_excel_serial(*dt);
            if style.number_format.is_general() {
                // Without a date format the serial would render as a plain number
                let code = if dt.num_seconds_from_midnight() == 0 {
                    DATE_FORMAT
                } else {
                    DATE_TIME_FORMAT
                };
                let dated = format.clone().set_num_format(code);
                worksheet.write_number_with_format(row, col, serial, &dated)?;
            } else {
                worksheet.write_number_with_format(row, col, serial, format)?;
            }
        }
        CellValue::Error(err) => {
            // Stored as a formula yielding the literal so readers see an error, not text
            let literal = err.to_string();
            let formula = Formula::new(literal.as_str()).set_result(literal.as_str());
            worksheet.write_formula_with_format(row, col, formula, format)?;
        }
    }
    Ok(())
}

fn to_xlsx_color(color: &ColorRef) -> Option<Color> {
    match color {
        ColorRef::Theme(index) if *index <= 9 => Some(Color::Theme(*index, 0)),
        ColorRef::Theme(_) | ColorRef::Auto => None,
        other => other.resolve().map(|c| Color::RGB(c.to_rgb_u32())),
    }
}

fn to_xlsx_pattern(pattern: FillPattern) -> FormatPattern {
    match pattern {
        FillPattern::None => FormatPattern::None,
        FillPattern::Solid => FormatPattern::Solid,
        FillPattern::MediumGray => FormatPattern::MediumGray,
        FillPattern::DarkGray => FormatPattern::DarkGray,
        FillPattern::LightGray => FormatPattern::LightGray,
        FillPattern::DarkHorizontal => FormatPattern::DarkHorizontal,
        FillPattern::DarkVertical => FormatPattern::DarkVertical,
        FillPattern::DarkDown => FormatPattern::DarkDown,
        FillPattern::DarkUp => FormatPattern::DarkUp,
        FillPattern::DarkGrid => FormatPattern::DarkGrid,
        FillPattern::DarkTrellis => FormatPattern::DarkTrellis,
        FillPattern::LightHorizontal => FormatPattern::LightHorizontal,
        FillPattern::LightVertical => FormatPattern::LightVertical,
        FillPattern::LightDown => FormatPattern::LightDown,
        FillPattern::LightUp => FormatPattern::LightUp,
        FillPattern::LightGrid => FormatPattern::LightGrid,
        FillPattern::LightTrellis => FormatPattern::LightTrellis,
        FillPattern::Gray125 => FormatPattern::Gray125,
        FillPattern::Gray0625 => FormatPattern::Gray0625,
    }
}

fn to_xlsx_border(style: BorderStyle) -> FormatBorder {
    match style {
        BorderStyle::None => FormatBorder::None,
        BorderStyle::Thin => FormatBorder::Thin,
        BorderStyle::Medium => FormatBorder::Medium,
        BorderStyle::Dashed => FormatBorder::Dashed,
        BorderStyle::Dotted => FormatBorder::Dotted,
        BorderStyle::Thick => FormatBorder::Thick,
        BorderStyle::Double => FormatBorder::Double,
        BorderStyle::Hair => FormatBorder::Hair,
        BorderStyle::MediumDashed => FormatBorder::MediumDashed,
        BorderStyle::DashDot => FormatBorder::DashDot,
        BorderStyle::MediumDashDot => FormatBorder::MediumDashDot,
        BorderStyle::DashDotDot => FormatBorder::DashDotDot,
        BorderStyle::MediumDashDotDot => FormatBorder::MediumDashDotDot,
        BorderStyle::SlantDashDot => FormatBorder::SlantDashDot,
    }
}

fn to_xlsx_horizontal(align: HorizontalAlign) -> FormatAlign {
    match align {
        HorizontalAlign::General => FormatAlign::General,
        HorizontalAlign::Left => FormatAlign::Left,
        HorizontalAlign::Center => FormatAlign::Center,
        HorizontalAlign::Right => FormatAlign::Right,
        HorizontalAlign::Fill => FormatAlign::Fill,
        HorizontalAlign::Justify => FormatAlign::Justify,
        HorizontalAlign::CenterContinuous => FormatAlign::CenterAcross,
        HorizontalAlign::Distributed => FormatAlign::Distributed,
    }
}

fn to_xlsx_vertical(align: VerticalAlign) -> FormatAlign {
    match align {
        VerticalAlign::Top => FormatAlign::Top,
        VerticalAlign::Center => FormatAlign::VerticalCenter,
        VerticalAlign::Bottom => FormatAlign::Bottom,
        VerticalAlign::Justify => FormatAlign::VerticalJustify,
        VerticalAlign::Distributed => FormatAlign::VerticalDistributed,
    }
}

/// Translate a style descriptor into a `rust_xlsxwriter` format
fn build_format(style: &StyleDescriptor) -> Format {
    let mut format = Format::new();

    let font = &style.font;
    if let Some(name) = &font.name {
        format = format.set_font_name(name);
    }
    if let Some(size) = font.size {
        format = format.set_font_size(size.points());
    }
    if font.bold {
        format = format.set_bold();
    }
    if font.italic {
        format = format.set_italic();
    }
    if font.underline {
        format = format.set_underline(FormatUnderline::Single);
    }
    if font.strikethrough {
        format = format.set_font_strikethrough();
    }
    if let Some(color) = font.color.as_ref().and_then(to_xlsx_color) {
        format = format.set_font_color(color);
    }

    let fill = &style.fill;
    let fg = fill.fg_color.as_ref().and_then(to_xlsx_color);
    let bg = fill.bg_color.as_ref().and_then(to_xlsx_color);
    match fill.pattern {
        FillPattern::None => {}
        FillPattern::Solid => {
            // rust_xlsxwriter stores a solid fill's color as the background color
            if let Some(color) = fg.or(bg) {
                format = format.set_pattern(FormatPattern::Solid).set_background_color(color);
            }
        }
        pattern => {
            format = format.set_pattern(to_xlsx_pattern(pattern));
            if let Some(color) = fg {
                format = format.set_foreground_color(color);
            }
            if let Some(color) = bg {
                format = format.set_background_color(color);
            }
        }
    }

    let borders = &style.borders;
    if !borders.left.style.is_none() {
        format = format.set_border_left(to_xlsx_border(borders.left.style));
        if let Some(color) = borders.left.color.as_ref().and_then(to_xlsx_color) {
            format = format.set_border_left_color(color);
        }
    }
    if !borders.right.style.is_none() {
        format = format.set_border_right(to_xlsx_border(borders.right.style));
        if let Some(color) = borders.right.color.as_ref().and_then(to_xlsx_color) {
            format = format.set_border_right_color(color);
        }
    }
    if !borders.top.style.is_none() {
        format = format.set_border_top(to_xlsx_border(borders.top.style));
        if let Some(color) = borders.top.color.as_ref().and_then(to_xlsx_color) {
            format = format.set_border_top_color(color);
        }
    }
    if !borders.bottom.style.is_none() {
        format = format.set_border_bottom(to_xlsx_border(borders.bottom.style));
        if let Some(color) = borders.bottom.color.as_ref().and_then(to_xlsx_color) {
            format = format.set_border_bottom_color(color);
        }
    }

    let alignment = &style.alignment;
    if let Some(h) = alignment.horizontal {
        format = format.set_align(to_xlsx_horizontal(h));
    }
    if let Some(v) = alignment.vertical {
        format = format.set_align(to_xlsx_vertical(v));
    }
    if alignment.wrap_text == Some(true) {
        format = format.set_text_wrap();
    }

    if !style.number_format.is_general() {
        format = format.set_num_format(style.number_format.code());
    }

    format
}
