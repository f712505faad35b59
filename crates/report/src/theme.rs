//! Report theme: palette, page geometry and product strings.
//!
//! A theme is an immutable value handed to the composer; nothing about the
//! look of a report is process-wide state.

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor(pub u8, pub u8, pub u8);

impl RgbColor {
    pub const WHITE: RgbColor = RgbColor(255, 255, 255);

    /// Channels scaled to `0.0..=1.0`.
    pub fn unit(&self) -> (f32, f32, f32) {
        (
            f32::from(self.0) / 255.0,
            f32::from(self.1) / 255.0,
            f32::from(self.2) / 255.0,
        )
    }
}

/// Named colors used by the layout description.
///
/// Blocks refer to swatches rather than concrete colors so the same layout
/// can be drawn under any palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swatch {
    Text,
    Navy,
    Primary,
    Success,
    Danger,
    Muted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub navy: RgbColor,
    pub primary: RgbColor,
    pub success: RgbColor,
    pub danger: RgbColor,
    pub muted: RgbColor,
    pub border: RgbColor,
    pub background: RgbColor,
    pub text: RgbColor,
    /// Zebra fill for striped table rows.
    pub stripe: RgbColor,
    /// Masthead metadata lines.
    pub masthead_meta: RgbColor,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            navy: RgbColor(15, 23, 42),
            primary: RgbColor(249, 154, 29),
            success: RgbColor(34, 197, 94),
            danger: RgbColor(239, 68, 68),
            muted: RgbColor(100, 116, 139),
            border: RgbColor(226, 232, 240),
            background: RgbColor(248, 250, 252),
            text: RgbColor(51, 65, 85),
            stripe: RgbColor(241, 245, 249),
            masthead_meta: RgbColor(200, 200, 200),
        }
    }
}

impl Palette {
    pub fn resolve(&self, swatch: Swatch) -> RgbColor {
        match swatch {
            Swatch::Text => self.text,
            Swatch::Navy => self.navy,
            Swatch::Primary => self.primary,
            Swatch::Success => self.success,
            Swatch::Danger => self.danger,
            Swatch::Muted => self.muted,
        }
    }
}

/// Page geometry in millimetres, measured from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    /// First content line on the first page, below the masthead.
    pub first_page_top: f64,
    /// First content line on continuation pages.
    pub continuation_top: f64,
    /// Content must end above this line; the footer owns the rest.
    pub content_bottom: f64,
    pub footer_rule_y: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margin_left: 15.0,
            margin_right: 15.0,
            first_page_top: 60.0,
            continuation_top: 20.0,
            content_bottom: 268.0,
            footer_rule_y: 275.0,
        }
    }
}

impl PageGeometry {
    pub fn content_width(&self) -> f64 {
        self.width - self.margin_left - self.margin_right
    }

    pub fn right_edge(&self) -> f64 {
        self.width - self.margin_right
    }
}

/// Everything that determines how a report looks.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTheme {
    pub palette: Palette,
    pub geometry: PageGeometry,
    pub product_title: String,
    pub product_subtitle: String,
    pub footer_product_line: String,
    pub footer_notice: String,
    pub status_stamp: String,
}

impl Default for ReportTheme {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            geometry: PageGeometry::default(),
            product_title: "LAB GUARDIAN PRO".to_string(),
            product_subtitle: "SYSTEMS MONITORING & INFRASTRUCTURE MANAGEMENT".to_string(),
            footer_product_line: "LAB GUARDIAN - PROFESSIONAL INFRASTRUCTURE AUDIT TOOL"
                .to_string(),
            footer_notice: "CONFIDENTIAL - SYSTEM GENERATED DOCUMENT".to_string(),
            status_stamp: "VERIFIED".to_string(),
        }
    }
}
