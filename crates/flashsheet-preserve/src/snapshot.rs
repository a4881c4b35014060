//! Point-in-time records of a cell's presentation state.
//!
//! Colors are recorded as normalized `AARRGGBB` strings. A color that cannot
//! be resolved without the document theme (theme or automatic colors)
//! degrades to `None` instead of failing the capture.

use flashsheet_core::{
    BorderEdge, BorderSide, BorderStyle, CellContent, CellCoord, ColorRef, FillPattern,
    HorizontalAlign, NumberFormat, StyleDescriptor, VerticalAlign,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontSnapshot {
    pub name: Option<String>,
    pub size: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FillSnapshot {
    /// Foreground ("start") color
    pub color: Option<String>,
    /// `None` when the cell has no fill
    pub pattern: Option<FillPattern>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorderSnapshot {
    /// `None` when the edge has no line
    pub style: Option<BorderStyle>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BordersSnapshot {
    pub left: BorderSnapshot,
    pub right: BorderSnapshot,
    pub top: BorderSnapshot,
    pub bottom: BorderSnapshot,
}

impl BordersSnapshot {
    pub fn side(&self, edge: BorderEdge) -> &BorderSnapshot {
        match edge {
            BorderEdge::Left => &self.left,
            BorderEdge::Right => &self.right,
            BorderEdge::Top => &self.top,
            BorderEdge::Bottom => &self.bottom,
        }
    }

    pub fn side_mut(&mut self, edge: BorderEdge) -> &mut BorderSnapshot {
        match edge {
            BorderEdge::Left => &mut self.left,
            BorderEdge::Right => &mut self.right,
            BorderEdge::Top => &mut self.top,
            BorderEdge::Bottom => &mut self.bottom,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentSnapshot {
    pub horizontal: Option<HorizontalAlign>,
    pub vertical: Option<VerticalAlign>,
    pub wrap_text: Option<bool>,
}

/// Value and formatting of one cell, captured before a region is overwritten
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellStyleSnapshot {
    pub value: CellContent,
    pub font: FontSnapshot,
    pub fill: FillSnapshot,
    pub borders: BordersSnapshot,
    pub alignment: AlignmentSnapshot,
    /// `General` means there is no format to restore
    pub number_format: NumberFormat,
}

impl CellStyleSnapshot {
    /// Record `content` and `style` of the cell at `coord`
    pub fn capture(coord: CellCoord, content: CellContent, style: &StyleDescriptor) -> Self {
        let font = FontSnapshot {
            name: style.font.name.clone(),
            size: style.font.size.map(|s| s.points()),
            bold: style.font.bold,
            italic: style.font.italic,
            color: capture_color(coord, "font", style.font.color.as_ref()),
        };

        let fill = FillSnapshot {
            color: capture_color(coord, "fill", style.fill.fg_color.as_ref()),
            pattern: (style.fill.pattern != FillPattern::None).then_some(style.fill.pattern),
        };

        let mut borders = BordersSnapshot::default();
        for edge in BorderEdge::ALL {
            *borders.side_mut(edge) = capture_border(coord, edge, style.borders.side(edge));
        }

        let alignment = AlignmentSnapshot {
            horizontal: style.alignment.horizontal,
            vertical: style.alignment.vertical,
            wrap_text: style.alignment.wrap_text,
        };

        Self {
            value: content,
            font,
            fill,
            borders,
            alignment,
            number_format: style.number_format.clone(),
        }
    }
}

fn capture_border(coord: CellCoord, edge: BorderEdge, side: &BorderSide) -> BorderSnapshot {
    if side.style.is_none() {
        return BorderSnapshot::default();
    }
    let field = match edge {
        BorderEdge::Left => "left border",
        BorderEdge::Right => "right border",
        BorderEdge::Top => "top border",
        BorderEdge::Bottom => "bottom border",
    };
    BorderSnapshot {
        style: Some(side.style),
        color: capture_color(coord, field, side.color.as_ref()),
    }
}

fn capture_color(coord: CellCoord, field: &str, color: Option<&ColorRef>) -> Option<String> {
    let color = color?;
    let hex = color.normalized_hex();
    if hex.is_none() {
        tracing::debug!(cell = %coord, field, ?color, "color has no fixed value, not recorded");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashsheet_core::{CellValue, Color, FillStyle};

    fn at(a1: &str) -> CellCoord {
        CellCoord::from_a1(a1).unwrap()
    }

    fn text(s: &str) -> CellContent {
        CellValue::from(s).into()
    }

    #[test]
    fn test_capture_records_every_attribute() {
        let style = StyleDescriptor::new()
            .with_font_name("Arial")
            .with_font_size(12.5)
            .with_bold(true)
            .with_font_color(Color::WHITE)
            .with_solid_fill(Color::RED)
            .with_border(BorderEdge::Left, BorderStyle::Medium, Some(Color::BLUE.into()))
            .with_horizontal_align(HorizontalAlign::Right)
            .with_wrap_text(true)
            .with_number_format("0.00%");

        let snap = CellStyleSnapshot::capture(at("C3"), CellValue::Number(0.25).into(), &style);

        assert_eq!(snap.font.name.as_deref(), Some("Arial"));
        assert_eq!(snap.font.size, Some(12.5));
        assert!(snap.font.bold);
        assert!(!snap.font.italic);
        assert_eq!(snap.font.color.as_deref(), Some("FFFFFFFF"));
        assert_eq!(snap.fill.color.as_deref(), Some("FFFF0000"));
        assert_eq!(snap.fill.pattern, Some(FillPattern::Solid));
        assert_eq!(snap.borders.left.style, Some(BorderStyle::Medium));
        assert_eq!(snap.borders.left.color.as_deref(), Some("FF0000FF"));
        assert_eq!(snap.borders.right, BorderSnapshot::default());
        assert_eq!(snap.alignment.horizontal, Some(HorizontalAlign::Right));
        assert_eq!(snap.alignment.vertical, None);
        assert_eq!(snap.alignment.wrap_text, Some(true));
        assert_eq!(snap.number_format.code(), "0.00%");
    }

    #[test]
    fn test_unresolvable_colors_degrade_to_none() {
        let mut style = StyleDescriptor::new()
            .with_font_color(ColorRef::Theme(1))
            .with_border(BorderEdge::Top, BorderStyle::Thin, Some(ColorRef::Auto));
        style.fill = FillStyle {
            pattern: FillPattern::Solid,
            fg_color: Some(ColorRef::Theme(4)),
            bg_color: None,
        };

        let snap = CellStyleSnapshot::capture(at("A1"), text("x"), &style);

        assert_eq!(snap.font.color, None);
        assert_eq!(snap.fill.color, None);
        assert_eq!(snap.fill.pattern, Some(FillPattern::Solid));
        assert_eq!(snap.borders.top.style, Some(BorderStyle::Thin));
        assert_eq!(snap.borders.top.color, None);
    }

    #[test]
    fn test_indexed_colors_are_normalized() {
        let style = StyleDescriptor::new().with_font_color(ColorRef::Indexed(10));
        let snap = CellStyleSnapshot::capture(at("A1"), text("x"), &style);
        assert_eq!(snap.font.color.as_deref(), Some("FFFF0000"));
    }

    #[test]
    fn test_default_style_records_nothing() {
        let snap = CellStyleSnapshot::capture(
            at("A1"),
            text("x"),
            &StyleDescriptor::default(),
        );
        assert_eq!(snap.fill, FillSnapshot::default());
        assert_eq!(snap.borders, BordersSnapshot::default());
        assert!(snap.number_format.is_general());
    }
}
