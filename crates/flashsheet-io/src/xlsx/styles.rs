use std::collections::HashMap;

use flashsheet_core::{
    Alignment, BorderEdge, BorderStyle, Borders, Color, ColorRef, FillPattern, FillStyle,
    FontSize, FontStyle, HorizontalAlign, NumberFormat, StyleDescriptor, VerticalAlign,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{attr_bool, attr_value};
use crate::error::DocumentError;

/// Code of a built-in number format id, if the id is one Excel predefines
pub(crate) fn builtin_number_format(id: u32) -> Option<&'static str> {
    Some(match id {
        0 => "General",
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        9 => "0%",
        10 => "0.00%",
        11 => "0.00E+00",
        12 => "# ?/?",
        13 => "# ??/??",
        14 => "mm-dd-yy",
        15 => "d-mmm-yy",
        16 => "d-mmm",
        17 => "mmm-yy",
        18 => "h:mm AM/PM",
        19 => "h:mm:ss AM/PM",
        20 => "h:mm",
        21 => "h:mm:ss",
        22 => "m/d/yy h:mm",
        37 => "#,##0 ;(#,##0)",
        38 => "#,##0 ;[Red](#,##0)",
        39 => "#,##0.00;(#,##0.00)",
        40 => "#,##0.00;[Red](#,##0.00)",
        45 => "mm:ss",
        46 => "[h]:mm:ss",
        47 => "mmss.0",
        48 => "##0.0E+0",
        49 => "@",
        _ => return None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    None,
    NumFmts,
    Fonts,
    Fills,
    Borders,
    CellXfs,
    /// Containers whose children look like ours but must be ignored (dxfs, cellStyleXfs, ...)
    Skipped,
}

#[derive(Debug, Default)]
struct XfRecord {
    num_fmt_id: u32,
    font_id: usize,
    fill_id: usize,
    border_id: usize,
    alignment: Alignment,
}

/// Accumulates the style collections while walking `styles.xml`
#[derive(Debug)]
struct StylesParser {
    section: Section,
    num_fmts: HashMap<u32, String>,
    fonts: Vec<FontStyle>,
    fills: Vec<FillStyle>,
    borders: Vec<Borders>,
    xfs: Vec<XfRecord>,
    font: FontStyle,
    fill: FillStyle,
    border: Borders,
    edge: Option<BorderEdge>,
    xf: XfRecord,
}

impl StylesParser {
    fn new() -> Self {
        Self {
            section: Section::None,
            num_fmts: HashMap::new(),
            fonts: Vec::new(),
            fills: Vec::new(),
            borders: Vec::new(),
            xfs: Vec::new(),
            font: FontStyle::default(),
            fill: FillStyle::default(),
            border: Borders::default(),
            edge: None,
            xf: XfRecord::default(),
        }
    }

    fn section_of(name: &[u8]) -> Option<Section> {
        match name {
            b"numFmts" => Some(Section::NumFmts),
            b"fonts" => Some(Section::Fonts),
            b"fills" => Some(Section::Fills),
            b"borders" => Some(Section::Borders),
            b"cellXfs" => Some(Section::CellXfs),
            b"cellStyleXfs" | b"cellStyles" | b"dxfs" | b"tableStyles" | b"colors"
            | b"extLst" => Some(Section::Skipped),
            _ => None,
        }
    }

    fn open(&mut self, e: &BytesStart<'_>, is_empty: bool) -> Result<(), DocumentError> {
        let name = e.local_name();
        let name = name.as_ref();

        if let Some(section) = Self::section_of(name) {
            if !is_empty {
                self.section = section;
            }
            return Ok(());
        }

        match self.section {
            Section::NumFmts if name == b"numFmt" => {
                let id = attr_value(e, b"numFmtId")?.and_then(|v| v.parse().ok());
                let code = attr_value(e, b"formatCode")?;
                if let (Some(id), Some(code)) = (id, code) {
                    self.num_fmts.insert(id, code);
                }
            }
            Section::Fonts => self.open_font_child(e, name, is_empty)?,
            Section::Fills => match name {
                b"fill" => {
                    self.fill = FillStyle::default();
                    if is_empty {
                        self.fills.push(std::mem::take(&mut self.fill));
                    }
                }
                b"patternFill" => {
                    self.fill.pattern = attr_value(e, b"patternType")?
                        .and_then(|p| FillPattern::from_ooxml(&p))
                        .unwrap_or_default();
                }
                b"fgColor" => self.fill.fg_color = parse_color(e)?,
                b"bgColor" => self.fill.bg_color = parse_color(e)?,
                _ => {}
            },
            Section::Borders => self.open_border_child(e, name, is_empty)?,
            Section::CellXfs => match name {
                b"xf" => {
                    self.xf = parse_xf(e)?;
                    if is_empty {
                        self.xfs.push(std::mem::take(&mut self.xf));
                    }
                }
                b"alignment" => self.xf.alignment = parse_alignment(e)?,
                _ => {}
            },
            _ => {}
        }
        Ok(())
    }

    fn open_font_child(
        &mut self,
        e: &BytesStart<'_>,
        name: &[u8],
        is_empty: bool,
    ) -> Result<(), DocumentError> {
        let font = &mut self.font;
        match name {
            b"font" => {
                *font = FontStyle::default();
                if is_empty {
                    self.fonts.push(std::mem::take(font));
                }
            }
            b"b" => font.bold = attr_bool(e, b"val", true)?,
            b"i" => font.italic = attr_bool(e, b"val", true)?,
            b"strike" => font.strikethrough = attr_bool(e, b"val", true)?,
            b"u" => font.underline = !matches!(attr_value(e, b"val")?.as_deref(), Some("none")),
            b"sz" => {
                font.size = attr_value(e, b"val")?
                    .and_then(|v| v.parse::<f64>().ok())
                    .map(FontSize::from_points)
            }
            b"name" => font.name = attr_value(e, b"val")?,
            b"color" => font.color = parse_color(e)?,
            _ => {}
        }
        Ok(())
    }

    fn open_border_child(
        &mut self,
        e: &BytesStart<'_>,
        name: &[u8],
        is_empty: bool,
    ) -> Result<(), DocumentError> {
        match name {
            b"border" => {
                self.border = Borders::default();
                self.edge = None;
                if is_empty {
                    self.borders.push(std::mem::take(&mut self.border));
                }
            }
            b"left" | b"start" | b"right" | b"end" | b"top" | b"bottom" => {
                let side = match name {
                    b"left" | b"start" => BorderEdge::Left,
                    b"right" | b"end" => BorderEdge::Right,
                    b"top" => BorderEdge::Top,
                    _ => BorderEdge::Bottom,
                };
                self.border.side_mut(side).style = attr_value(e, b"style")?
                    .and_then(|s| BorderStyle::from_ooxml(&s))
                    .unwrap_or_default();
                self.edge = if is_empty { None } else { Some(side) };
            }
            // Diagonals are not part of the model
            b"diagonal" | b"vertical" | b"horizontal" => self.edge = None,
            b"color" => {
                if let Some(side) = self.edge {
                    self.border.side_mut(side).color = parse_color(e)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        if Self::section_of(name).is_some() {
            self.section = Section::None;
            return;
        }

        match (self.section, name) {
            (Section::Fonts, b"font") => self.fonts.push(std::mem::take(&mut self.font)),
            (Section::Fills, b"fill") => self.fills.push(std::mem::take(&mut self.fill)),
            (Section::Borders, b"border") => self.borders.push(std::mem::take(&mut self.border)),
            (Section::Borders, b"left" | b"start" | b"right" | b"end" | b"top" | b"bottom") => {
                self.edge = None
            }
            (Section::CellXfs, b"xf") => self.xfs.push(std::mem::take(&mut self.xf)),
            _ => {}
        }
    }

    fn finish(self) -> Vec<StyleDescriptor> {
        let StylesParser {
            num_fmts,
            fonts,
            fills,
            borders,
            xfs,
            ..
        } = self;

        xfs.into_iter()
            .map(|xf| StyleDescriptor {
                font: fonts.get(xf.font_id).cloned().unwrap_or_default(),
                fill: fills.get(xf.fill_id).cloned().unwrap_or_default(),
                borders: borders.get(xf.border_id).cloned().unwrap_or_default(),
                alignment: xf.alignment,
                number_format: num_fmts
                    .get(&xf.num_fmt_id)
                    .map(String::as_str)
                    .or_else(|| builtin_number_format(xf.num_fmt_id))
                    .map(NumberFormat::parse)
                    .unwrap_or_default(),
            })
            .collect()
    }
}

/// Parse `xl/styles.xml` into one descriptor per `cellXfs` entry
pub(crate) fn parse_styles(xml: &[u8]) -> Result<Vec<StyleDescriptor>, DocumentError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut parser = StylesParser::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => parser.open(&e, false)?,
            Event::Empty(e) => parser.open(&e, true)?,
            Event::End(e) => parser.close(e.local_name().as_ref()),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(parser.finish())
}

fn parse_xf(e: &BytesStart<'_>) -> Result<XfRecord, DocumentError> {
    let num = |v: Option<String>| v.and_then(|v| v.parse::<usize>().ok()).unwrap_or(0);
    Ok(XfRecord {
        num_fmt_id: num(attr_value(e, b"numFmtId")?) as u32,
        font_id: num(attr_value(e, b"fontId")?),
        fill_id: num(attr_value(e, b"fillId")?),
        border_id: num(attr_value(e, b"borderId")?),
        alignment: Alignment::default(),
    })
}

fn parse_alignment(e: &BytesStart<'_>) -> Result<Alignment, DocumentError> {
    Ok(Alignment {
        horizontal: attr_value(e, b"horizontal")?.and_then(|h| HorizontalAlign::from_ooxml(&h)),
        vertical: attr_value(e, b"vertical")?.and_then(|v| VerticalAlign::from_ooxml(&v)),
        wrap_text: match attr_value(e, b"wrapText")?.as_deref() {
            Some("1") | Some("true") => Some(true),
            Some("0") | Some("false") => Some(false),
            _ => None,
        },
    })
}

/// Parse a `<color>`-like element. Unreadable colors are treated as absent.
fn parse_color(e: &BytesStart<'_>) -> Result<Option<ColorRef>, DocumentError> {
    if let Some(rgb) = attr_value(e, b"rgb")? {
        return Ok(Color::from_argb_hex(&rgb).map(ColorRef::Rgb));
    }
    if let Some(theme) = attr_value(e, b"theme")? {
        return Ok(theme.parse().ok().map(ColorRef::Theme));
    }
    if let Some(indexed) = attr_value(e, b"indexed")? {
        return Ok(indexed.parse().ok().map(ColorRef::Indexed));
    }
    if attr_bool(e, b"auto", false)? {
        return Ok(Some(ColorRef::Auto));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy-mm-dd"/></numFmts>
  <fonts count="2">
    <font><sz val="11"/><color theme="1"/><name val="Calibri"/><family val="2"/></font>
    <font><b/><i val="0"/><sz val="14"/><color rgb="FFFFFFFF"/><name val="Arial"/></font>
  </fonts>
  <fills count="3">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
    <fill><patternFill patternType="solid"><fgColor rgb="FFFF0000"/><bgColor indexed="64"/></patternFill></fill>
  </fills>
  <borders count="2">
    <border><left/><right/><top/><bottom/><diagonal/></border>
    <border><left style="thin"><color rgb="FF000000"/></left><right/><top/><bottom style="double"/><diagonal style="thick"><color rgb="FF00FF00"/></diagonal></border>
  </borders>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="1" fillId="2" borderId="1"/></cellStyleXfs>
  <cellXfs count="3">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="4" fontId="1" fillId="2" borderId="1" xfId="0" applyFont="1">
      <alignment horizontal="center" vertical="top" wrapText="1"/>
    </xf>
    <xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0"/>
  </cellXfs>
  <dxfs count="1"><dxf><font><b/></font><fill><patternFill><bgColor rgb="FFFFC7CE"/></patternFill></fill></dxf></dxfs>
</styleSheet>"#;

    #[test]
    fn test_parse_styles() {
        let styles = parse_styles(STYLES_XML.as_bytes()).unwrap();
        assert_eq!(styles.len(), 3);

        let base = &styles[0];
        assert_eq!(base.font.name.as_deref(), Some("Calibri"));
        assert_eq!(base.font.color, Some(ColorRef::Theme(1)));
        assert!(base.number_format.is_general());

        let header = &styles[1];
        assert!(header.font.bold);
        assert!(!header.font.italic);
        assert_eq!(header.font.size, Some(FontSize::from_points(14.0)));
        assert_eq!(header.font.color, Some(ColorRef::Rgb(Color::WHITE)));
        assert_eq!(header.fill.pattern, FillPattern::Solid);
        assert_eq!(header.fill.fg_color, Some(ColorRef::Rgb(Color::RED)));
        assert_eq!(header.fill.bg_color, Some(ColorRef::Indexed(64)));
        assert_eq!(header.borders.left.style, BorderStyle::Thin);
        assert_eq!(header.borders.left.color, Some(ColorRef::Rgb(Color::BLACK)));
        assert_eq!(header.borders.bottom.style, BorderStyle::Double);
        assert_eq!(header.borders.bottom.color, None);
        assert_eq!(header.borders.right, Default::default());
        assert_eq!(header.alignment.horizontal, Some(HorizontalAlign::Center));
        assert_eq!(header.alignment.vertical, Some(VerticalAlign::Top));
        assert_eq!(header.alignment.wrap_text, Some(true));
        assert_eq!(header.number_format.code(), "#,##0.00");

        assert_eq!(styles[2].number_format.code(), "yyyy-mm-dd");
        assert!(styles[2].number_format.is_date_time());
    }

    #[test]
    fn test_builtin_formats() {
        assert_eq!(builtin_number_format(0), Some("General"));
        assert_eq!(builtin_number_format(14), Some("mm-dd-yy"));
        assert_eq!(builtin_number_format(164), None);
    }
}
