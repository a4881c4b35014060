use serde::{Deserialize, Serialize};
use std::fmt;

/// RGBA color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "default_alpha")]
    pub a: u8,
}

fn default_alpha() -> u8 {
    255
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Normalized spreadsheet form: uppercase `AARRGGBB`
    pub fn to_argb_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
    }

    /// Parse `RRGGBB` or `AARRGGBB`, with or without a leading `#`
    pub fn from_argb_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Color::argb(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Packed `0xRRGGBB` value, alpha dropped
    pub fn to_rgb_u32(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    // Common colors
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_argb_hex())
    }
}

/// Legacy indexed palette (entries 0..=63)
const INDEXED_PALETTE: [u32; 64] = [
    0x000000, 0xFFFFFF, 0xFF0000, 0x00FF00, 0x0000FF, 0xFFFF00, 0xFF00FF, 0x00FFFF,
    0x000000, 0xFFFFFF, 0xFF0000, 0x00FF00, 0x0000FF, 0xFFFF00, 0xFF00FF, 0x00FFFF,
    0x800000, 0x008000, 0x000080, 0x808000, 0x800080, 0x008080, 0xC0C0C0, 0x808080,
    0x9999FF, 0x993366, 0xFFFFCC, 0xCCFFFF, 0x660066, 0xFF8080, 0x0066CC, 0xCCCCFF,
    0x000080, 0xFF00FF, 0xFFFF00, 0x00FFFF, 0x800080, 0x800000, 0x008080, 0x0000FF,
    0x00CCFF, 0xCCFFFF, 0xCCFFCC, 0xFFFF99, 0x99CCFF, 0xFF99CC, 0xCC99FF, 0xFFCC99,
    0x3366FF, 0x33CCCC, 0x99CC00, 0xFFCC00, 0xFF9900, 0xFF6600, 0x666699, 0x969696,
    0x003366, 0x339966, 0x003300, 0x333300, 0x993300, 0x993366, 0x333399, 0x333333,
];

/// A color as it is referenced by a style record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ColorRef {
    Rgb(Color),
    /// Index into the document theme palette
    Theme(u8),
    /// Index into the legacy palette
    Indexed(u8),
    /// Application-chosen color
    Auto,
}

impl ColorRef {
    /// Resolve to a concrete color when that is possible without a theme
    pub fn resolve(&self) -> Option<Color> {
        match self {
            ColorRef::Rgb(color) => Some(*color),
            ColorRef::Indexed(idx) => INDEXED_PALETTE.get(*idx as usize).map(|&rgb| {
                Color::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
            }),
            ColorRef::Theme(_) | ColorRef::Auto => None,
        }
    }

    /// Normalized `AARRGGBB` string, or `None` when the color cannot be resolved
    pub fn normalized_hex(&self) -> Option<String> {
        self.resolve().map(|c| c.to_argb_hex())
    }
}

impl From<Color> for ColorRef {
    fn from(color: Color) -> Self {
        ColorRef::Rgb(color)
    }
}

/// Font size in hundredths of a point, so descriptors stay `Eq + Hash`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "f64", from = "f64")]
pub struct FontSize(u32);

impl FontSize {
    pub fn from_points(points: f64) -> Self {
        FontSize((points.max(0.0) * 100.0).round() as u32)
    }

    pub fn points(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl From<f64> for FontSize {
    fn from(points: f64) -> Self {
        FontSize::from_points(points)
    }
}

impl From<FontSize> for f64 {
    fn from(size: FontSize) -> Self {
        size.points()
    }
}

/// Font attributes of a style
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<FontSize>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorRef>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Fill pattern kinds understood by spreadsheet files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FillPattern {
    #[default]
    None,
    Solid,
    MediumGray,
    DarkGray,
    LightGray,
    DarkHorizontal,
    DarkVertical,
    DarkDown,
    DarkUp,
    DarkGrid,
    DarkTrellis,
    LightHorizontal,
    LightVertical,
    LightDown,
    LightUp,
    LightGrid,
    LightTrellis,
    Gray125,
    Gray0625,
}

impl FillPattern {
    const NAMES: [(FillPattern, &'static str); 19] = [
        (FillPattern::None, "none"),
        (FillPattern::Solid, "solid"),
        (FillPattern::MediumGray, "mediumGray"),
        (FillPattern::DarkGray, "darkGray"),
        (FillPattern::LightGray, "lightGray"),
        (FillPattern::DarkHorizontal, "darkHorizontal"),
        (FillPattern::DarkVertical, "darkVertical"),
        (FillPattern::DarkDown, "darkDown"),
        (FillPattern::DarkUp, "darkUp"),
        (FillPattern::DarkGrid, "darkGrid"),
        (FillPattern::DarkTrellis, "darkTrellis"),
        (FillPattern::LightHorizontal, "lightHorizontal"),
        (FillPattern::LightVertical, "lightVertical"),
        (FillPattern::LightDown, "lightDown"),
        (FillPattern::LightUp, "lightUp"),
        (FillPattern::LightGrid, "lightGrid"),
        (FillPattern::LightTrellis, "lightTrellis"),
        (FillPattern::Gray125, "gray125"),
        (FillPattern::Gray0625, "gray0625"),
    ];

    /// OOXML `patternType` attribute value
    pub fn as_ooxml(&self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(p, _)| p == self)
            .map(|(_, name)| *name)
            .unwrap_or("none")
    }

    pub fn from_ooxml(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(p, _)| *p)
    }
}

/// Background fill of a cell
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FillStyle {
    #[serde(default)]
    pub pattern: FillPattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg_color: Option<ColorRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<ColorRef>,
}

impl FillStyle {
    /// Single-color fill: the same color as pattern foreground and background
    pub fn solid(color: impl Into<ColorRef>) -> Self {
        let color = color.into();
        FillStyle {
            pattern: FillPattern::Solid,
            fg_color: Some(color),
            bg_color: Some(color),
        }
    }
}

/// Line style of one border edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BorderStyle {
    #[default]
    None,
    Thin,
    Medium,
    Dashed,
    Dotted,
    Thick,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

impl BorderStyle {
    const NAMES: [(BorderStyle, &'static str); 14] = [
        (BorderStyle::None, "none"),
        (BorderStyle::Thin, "thin"),
        (BorderStyle::Medium, "medium"),
        (BorderStyle::Dashed, "dashed"),
        (BorderStyle::Dotted, "dotted"),
        (BorderStyle::Thick, "thick"),
        (BorderStyle::Double, "double"),
        (BorderStyle::Hair, "hair"),
        (BorderStyle::MediumDashed, "mediumDashed"),
        (BorderStyle::DashDot, "dashDot"),
        (BorderStyle::MediumDashDot, "mediumDashDot"),
        (BorderStyle::DashDotDot, "dashDotDot"),
        (BorderStyle::MediumDashDotDot, "mediumDashDotDot"),
        (BorderStyle::SlantDashDot, "slantDashDot"),
    ];

    /// OOXML `style` attribute value
    pub fn as_ooxml(&self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(s, _)| s == self)
            .map(|(_, name)| *name)
            .unwrap_or("none")
    }

    pub fn from_ooxml(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(s, _)| *s)
    }

    pub fn is_none(&self) -> bool {
        *self == BorderStyle::None
    }
}

/// One border edge
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorderSide {
    #[serde(default)]
    pub style: BorderStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorRef>,
}

/// Edges of a cell, in the order spreadsheet files list them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderEdge {
    Left,
    Right,
    Top,
    Bottom,
}

impl BorderEdge {
    pub const ALL: [BorderEdge; 4] = [
        BorderEdge::Left,
        BorderEdge::Right,
        BorderEdge::Top,
        BorderEdge::Bottom,
    ];
}

/// The four border edges of a cell
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Borders {
    #[serde(default)]
    pub left: BorderSide,
    #[serde(default)]
    pub right: BorderSide,
    #[serde(default)]
    pub top: BorderSide,
    #[serde(default)]
    pub bottom: BorderSide,
}

impl Borders {
    pub fn side(&self, edge: BorderEdge) -> &BorderSide {
        match edge {
            BorderEdge::Left => &self.left,
            BorderEdge::Right => &self.right,
            BorderEdge::Top => &self.top,
            BorderEdge::Bottom => &self.bottom,
        }
    }

    pub fn side_mut(&mut self, edge: BorderEdge) -> &mut BorderSide {
        match edge {
            BorderEdge::Left => &mut self.left,
            BorderEdge::Right => &mut self.right,
            BorderEdge::Top => &mut self.top,
            BorderEdge::Bottom => &mut self.bottom,
        }
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HorizontalAlign {
    General,
    Left,
    Center,
    Right,
    Fill,
    Justify,
    CenterContinuous,
    Distributed,
}

impl HorizontalAlign {
    pub fn as_ooxml(&self) -> &'static str {
        match self {
            HorizontalAlign::General => "general",
            HorizontalAlign::Left => "left",
            HorizontalAlign::Center => "center",
            HorizontalAlign::Right => "right",
            HorizontalAlign::Fill => "fill",
            HorizontalAlign::Justify => "justify",
            HorizontalAlign::CenterContinuous => "centerContinuous",
            HorizontalAlign::Distributed => "distributed",
        }
    }

    pub fn from_ooxml(name: &str) -> Option<Self> {
        match name {
            "general" => Some(HorizontalAlign::General),
            "left" => Some(HorizontalAlign::Left),
            "center" => Some(HorizontalAlign::Center),
            "right" => Some(HorizontalAlign::Right),
            "fill" => Some(HorizontalAlign::Fill),
            "justify" => Some(HorizontalAlign::Justify),
            "centerContinuous" => Some(HorizontalAlign::CenterContinuous),
            "distributed" => Some(HorizontalAlign::Distributed),
            _ => None,
        }
    }
}

/// Vertical text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
    Justify,
    Distributed,
}

impl VerticalAlign {
    pub fn as_ooxml(&self) -> &'static str {
        match self {
            VerticalAlign::Top => "top",
            VerticalAlign::Center => "center",
            VerticalAlign::Bottom => "bottom",
            VerticalAlign::Justify => "justify",
            VerticalAlign::Distributed => "distributed",
        }
    }

    pub fn from_ooxml(name: &str) -> Option<Self> {
        match name {
            "top" => Some(VerticalAlign::Top),
            "center" => Some(VerticalAlign::Center),
            "bottom" => Some(VerticalAlign::Bottom),
            "justify" => Some(VerticalAlign::Justify),
            "distributed" => Some(VerticalAlign::Distributed),
            _ => None,
        }
    }
}

/// Alignment attributes; `None` means "not specified by the style"
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Alignment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<HorizontalAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<VerticalAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap_text: Option<bool>,
}

/// Number format of a cell. `General` is the explicit "no format" value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NumberFormat {
    #[default]
    General,
    Custom(String),
}

impl NumberFormat {
    pub fn parse(code: &str) -> Self {
        if code.is_empty() || code.eq_ignore_ascii_case("General") {
            NumberFormat::General
        } else {
            NumberFormat::Custom(code.to_string())
        }
    }

    pub fn is_general(&self) -> bool {
        matches!(self, NumberFormat::General)
    }

    pub fn code(&self) -> &str {
        match self {
            NumberFormat::General => "General",
            NumberFormat::Custom(code) => code,
        }
    }

    /// Whether the format renders its number as a date or time
    pub fn is_date_time(&self) -> bool {
        match self {
            NumberFormat::General => false,
            NumberFormat::Custom(code) => is_date_time_code(code),
        }
    }
}

impl From<String> for NumberFormat {
    fn from(code: String) -> Self {
        NumberFormat::parse(&code)
    }
}

impl From<NumberFormat> for String {
    fn from(format: NumberFormat) -> Self {
        format.code().to_string()
    }
}

/// Look for date/time tokens outside quoted literals, escapes and `[...]` sections
fn is_date_time_code(code: &str) -> bool {
    // Only the first section decides how positive numbers render
    let section = code.split(';').next().unwrap_or("");
    let mut in_quotes = false;
    let mut in_brackets = false;
    let mut escaped = false;

    for c in section.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            '[' if !in_quotes => in_brackets = true,
            ']' if !in_quotes => in_brackets = false,
            _ if in_quotes || in_brackets => {}
            'y' | 'Y' | 'd' | 'D' | 'h' | 'H' | 's' | 'S' | 'm' | 'M' => return true,
            _ => {}
        }
    }
    false
}

/// Complete presentation state of a cell, independent of its value
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleDescriptor {
    #[serde(default)]
    pub font: FontStyle,
    #[serde(default)]
    pub fill: FillStyle,
    #[serde(default)]
    pub borders: Borders,
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(default, skip_serializing_if = "NumberFormat::is_general")]
    pub number_format: NumberFormat,
}

impl StyleDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: set font family
    pub fn with_font_name(mut self, name: impl Into<String>) -> Self {
        self.font.name = Some(name.into());
        self
    }

    /// Builder pattern: set font size in points
    pub fn with_font_size(mut self, points: f64) -> Self {
        self.font.size = Some(FontSize::from_points(points));
        self
    }

    /// Builder pattern: set bold
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.font.bold = bold;
        self
    }

    /// Builder pattern: set italic
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.font.italic = italic;
        self
    }

    /// Builder pattern: set text color
    pub fn with_font_color(mut self, color: impl Into<ColorRef>) -> Self {
        self.font.color = Some(color.into());
        self
    }

    /// Builder pattern: set a single-color background
    pub fn with_solid_fill(mut self, color: impl Into<ColorRef>) -> Self {
        self.fill = FillStyle::solid(color);
        self
    }

    /// Builder pattern: set one border edge
    pub fn with_border(
        mut self,
        edge: BorderEdge,
        style: BorderStyle,
        color: Option<ColorRef>,
    ) -> Self {
        *self.borders.side_mut(edge) = BorderSide { style, color };
        self
    }

    /// Builder pattern: set horizontal alignment
    pub fn with_horizontal_align(mut self, align: HorizontalAlign) -> Self {
        self.alignment.horizontal = Some(align);
        self
    }

    /// Builder pattern: set vertical alignment
    pub fn with_vertical_align(mut self, align: VerticalAlign) -> Self {
        self.alignment.vertical = Some(align);
        self
    }

    /// Builder pattern: set text wrapping
    pub fn with_wrap_text(mut self, wrap: bool) -> Self {
        self.alignment.wrap_text = Some(wrap);
        self
    }

    /// Builder pattern: set number format code
    pub fn with_number_format(mut self, code: &str) -> Self {
        self.number_format = NumberFormat::parse(code);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_argb_hex() {
        let color = Color::rgb(255, 128, 64);
        assert_eq!(color.to_argb_hex(), "FFFF8040");
        assert_eq!(Color::from_argb_hex("#ff8040"), Some(color));
        assert_eq!(Color::from_argb_hex("FFFF8040"), Some(color));
        assert_eq!(
            Color::from_argb_hex("80FF8040"),
            Some(Color::argb(0x80, 255, 128, 64))
        );
        assert_eq!(Color::from_argb_hex("F80"), None);
        assert_eq!(Color::from_argb_hex("zzzzzz"), None);
    }

    #[test]
    fn test_color_ref_normalization() {
        assert_eq!(
            ColorRef::Rgb(Color::RED).normalized_hex().as_deref(),
            Some("FFFF0000")
        );
        assert_eq!(
            ColorRef::Indexed(10).normalized_hex().as_deref(),
            Some("FFFF0000")
        );
        assert_eq!(ColorRef::Indexed(64).normalized_hex(), None);
        assert_eq!(ColorRef::Theme(1).normalized_hex(), None);
        assert_eq!(ColorRef::Auto.normalized_hex(), None);
    }

    #[test]
    fn test_ooxml_names() {
        assert_eq!(FillPattern::from_ooxml("gray125"), Some(FillPattern::Gray125));
        assert_eq!(FillPattern::Solid.as_ooxml(), "solid");
        assert_eq!(
            BorderStyle::from_ooxml("mediumDashDot"),
            Some(BorderStyle::MediumDashDot)
        );
        assert_eq!(BorderStyle::Thin.as_ooxml(), "thin");
        assert_eq!(
            HorizontalAlign::from_ooxml("centerContinuous"),
            Some(HorizontalAlign::CenterContinuous)
        );
        assert_eq!(VerticalAlign::Center.as_ooxml(), "center");
    }

    #[test]
    fn test_number_format_sentinel() {
        assert!(NumberFormat::parse("General").is_general());
        assert!(NumberFormat::parse("general").is_general());
        assert!(NumberFormat::parse("").is_general());
        assert_eq!(NumberFormat::parse("#,##0").code(), "#,##0");
    }

    #[test]
    fn test_date_time_detection() {
        assert!(NumberFormat::parse("yyyy-mm-dd").is_date_time());
        assert!(NumberFormat::parse("h:mm AM/PM").is_date_time());
        assert!(NumberFormat::parse("[$-409]d-mmm-yy").is_date_time());
        assert!(!NumberFormat::parse("#,##0.00").is_date_time());
        assert!(!NumberFormat::parse("0.00\" days\"").is_date_time());
        assert!(!NumberFormat::parse("[Red]0.00").is_date_time());
        assert!(!NumberFormat::General.is_date_time());
    }

    #[test]
    fn test_style_builder() {
        let style = StyleDescriptor::new()
            .with_bold(true)
            .with_font_color(Color::WHITE)
            .with_solid_fill(Color::RED)
            .with_border(BorderEdge::Left, BorderStyle::Thin, None)
            .with_font_size(14.0);

        assert!(style.font.bold);
        assert_eq!(style.font.color, Some(ColorRef::Rgb(Color::WHITE)));
        assert_eq!(style.fill.pattern, FillPattern::Solid);
        assert_eq!(style.fill.bg_color, style.fill.fg_color);
        assert_eq!(style.borders.left.style, BorderStyle::Thin);
        assert_eq!(style.font.size.map(|s| s.points()), Some(14.0));
    }

    #[test]
    fn test_style_serde_roundtrip() {
        let style = StyleDescriptor::new()
            .with_font_name("Calibri")
            .with_font_size(10.5)
            .with_number_format("0.00%");
        let json = serde_json::to_string(&style).unwrap();
        let back: StyleDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, style);
    }
}
