use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context};
use flashsheet_core::{
    BorderEdge, CellContent, CellRange, ColorRef, FillPattern, Sheet, StyleDescriptor,
};
use flashsheet_io::load_workbook;

/// Print every stored cell of `range` (default: the used range) with its style
pub fn run<W: Write>(
    path: &Path,
    range: Option<&str>,
    sheet: Option<&str>,
    out: &mut W,
) -> anyhow::Result<()> {
    let workbook =
        load_workbook(path).with_context(|| format!("failed to open {}", path.display()))?;
    let sheet = match sheet {
        Some(name) => workbook
            .get_sheet_by_name(name)
            .ok_or_else(|| anyhow!("sheet not found: {name}"))?,
        None => workbook
            .active_sheet()
            .ok_or_else(|| anyhow!("{} has no sheets", path.display()))?,
    };

    let range = match range {
        Some(a1) => CellRange::from_a1(a1).ok_or_else(|| anyhow!("invalid range: {a1}"))?,
        None => match sheet.used_range() {
            Some(used) => used,
            None => {
                writeln!(out, "{}: empty", sheet.name)?;
                return Ok(());
            }
        },
    };

    write_region(sheet, range, out)
}

fn write_region<W: Write>(sheet: &Sheet, range: CellRange, out: &mut W) -> anyhow::Result<()> {
    writeln!(out, "{} {}", sheet.name, range.to_a1())?;
    for (coord, cell) in sheet.cells_in_range(range) {
        let value = describe_content(&cell.content);
        let style = describe_style(sheet.style(coord));
        if style.is_empty() {
            writeln!(out, "{coord}\t{value}")?;
        } else {
            writeln!(out, "{coord}\t{value}\t[{style}]")?;
        }
    }
    Ok(())
}

fn describe_content(content: &CellContent) -> String {
    match content {
        CellContent::Value { value } => value.as_text(),
        CellContent::Formula {
            expression,
            cached_value,
        } if cached_value.is_empty() => expression.clone(),
        CellContent::Formula {
            expression,
            cached_value,
        } => format!("{expression} -> {}", cached_value.as_text()),
    }
}

/// Compact summary of the non-default attributes of a style
pub fn describe_style(style: &StyleDescriptor) -> String {
    let mut parts = Vec::new();

    let font = &style.font;
    if let Some(name) = &font.name {
        parts.push(format!("font {name}"));
    }
    if let Some(size) = font.size {
        parts.push(format!("{}pt", size.points()));
    }
    if font.bold {
        parts.push("bold".to_string());
    }
    if font.italic {
        parts.push("italic".to_string());
    }
    if font.underline {
        parts.push("underline".to_string());
    }
    if let Some(color) = &font.color {
        parts.push(format!("color {}", describe_color(color)));
    }

    if style.fill.pattern != FillPattern::None {
        let mut fill = format!("fill {}", style.fill.pattern.as_ooxml());
        if let Some(color) = &style.fill.fg_color {
            fill.push(' ');
            fill.push_str(&describe_color(color));
        }
        parts.push(fill);
    }

    for edge in BorderEdge::ALL {
        let side = style.borders.side(edge);
        if side.style.is_none() {
            continue;
        }
        let name = match edge {
            BorderEdge::Left => "left",
            BorderEdge::Right => "right",
            BorderEdge::Top => "top",
            BorderEdge::Bottom => "bottom",
        };
        let mut border = format!("{name} {}", side.style.as_ooxml());
        if let Some(color) = &side.color {
            border.push(' ');
            border.push_str(&describe_color(color));
        }
        parts.push(border);
    }

    if let Some(horizontal) = style.alignment.horizontal {
        parts.push(format!("align {}", horizontal.as_ooxml()));
    }
    if let Some(vertical) = style.alignment.vertical {
        parts.push(format!("valign {}", vertical.as_ooxml()));
    }
    if style.alignment.wrap_text == Some(true) {
        parts.push("wrap".to_string());
    }
    if !style.number_format.is_general() {
        parts.push(format!("format {:?}", style.number_format.code()));
    }

    parts.join(", ")
}

fn describe_color(color: &ColorRef) -> String {
    match color {
        ColorRef::Rgb(rgb) => format!("#{}", rgb.to_argb_hex()),
        ColorRef::Theme(index) => format!("theme {index}"),
        ColorRef::Indexed(index) => format!("indexed {index}"),
        ColorRef::Auto => "auto".to_string(),
    }
}
