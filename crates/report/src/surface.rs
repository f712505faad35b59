//! Drawing surface abstraction.
//!
//! [`DocumentSurface`] is the seam between report layout and the PDF library.
//! Coordinates are millimetres from the top-left corner of the page, y growing
//! downward; implementations convert to their native space.

use crate::error::ReportError;
use crate::theme::{PageGeometry, RgbColor};

const PT_TO_MM: f64 = 25.4 / 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// Horizontal anchoring of text relative to its x coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in points.
    pub size: f64,
    pub weight: FontWeight,
    pub color: RgbColor,
    pub align: Align,
}

impl TextStyle {
    pub fn new(size: f64, color: RgbColor) -> Self {
        Self {
            size,
            weight: FontWeight::Regular,
            color,
            align: Align::Left,
        }
    }

    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    pub fn aligned(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

/// Fill and outline of a rectangle; at least one should be set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectPaint {
    pub fill: Option<RgbColor>,
    pub stroke: Option<RgbColor>,
}

impl RectPaint {
    pub fn fill(color: RgbColor) -> Self {
        Self {
            fill: Some(color),
            stroke: None,
        }
    }

    pub fn fill_and_stroke(fill: RgbColor, stroke: RgbColor) -> Self {
        Self {
            fill: Some(fill),
            stroke: Some(stroke),
        }
    }
}

/// A paginated document that primitives can be drawn onto.
///
/// Page indices are zero-based. Drawing always targets the selected page;
/// [`DocumentSurface::add_page`] appends a page and selects it.
pub trait DocumentSurface {
    fn geometry(&self) -> &PageGeometry;

    fn page_count(&self) -> usize;

    fn current_page(&self) -> usize;

    /// Appends a blank page, selects it and returns its index.
    fn add_page(&mut self) -> Result<usize, ReportError>;

    fn select_page(&mut self, index: usize) -> Result<(), ReportError>;

    fn rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        paint: RectPaint,
    ) -> Result<(), ReportError>;

    fn line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        color: RgbColor,
    ) -> Result<(), ReportError>;

    /// Draws a single line of text with its baseline at `y`, anchored at `x`
    /// according to `style.align`.
    fn text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) -> Result<(), ReportError>;

    /// Serializes the finished document.
    fn finish(self) -> Result<Vec<u8>, ReportError>
    where
        Self: Sized;
}

/// Rejects non-finite or off-page coordinates.
pub(crate) fn check_point(geometry: &PageGeometry, x: f64, y: f64) -> Result<(), ReportError> {
    if !x.is_finite() || !y.is_finite() {
        return Err(ReportError::layout(format!(
            "non-finite coordinate ({}, {})",
            x, y
        )));
    }
    if x < 0.0 || x > geometry.width || y < 0.0 || y > geometry.height {
        return Err(ReportError::layout(format!(
            "coordinate ({:.1}, {:.1}) is outside the {}x{} mm page",
            x, y, geometry.width, geometry.height
        )));
    }
    Ok(())
}

pub(crate) fn check_extent(width: f64, height: f64) -> Result<(), ReportError> {
    if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
        return Err(ReportError::layout(format!(
            "invalid extent {} x {}",
            width, height
        )));
    }
    Ok(())
}

/// Approximate rendered width of `text` in millimetres, using the standard
/// Helvetica advance widths. Characters outside ASCII use a digit's width.
pub fn text_width(text: &str, size: f64, weight: FontWeight) -> f64 {
    let units: u32 = text
        .chars()
        .map(|c| advance_width(c, weight))
        .sum();
    f64::from(units) / 1000.0 * size * PT_TO_MM
}

/// Left edge of a text run anchored at `x`.
pub fn aligned_left(text: &str, x: f64, style: &TextStyle) -> f64 {
    let width = text_width(text, style.size, style.weight);
    match style.align {
        Align::Left => x,
        Align::Center => x - width / 2.0,
        Align::Right => x - width,
    }
}

/// Font size in points converted to millimetres.
pub fn line_height(size: f64) -> f64 {
    size * PT_TO_MM
}

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

fn advance_width(c: char, weight: FontWeight) -> u32 {
    let table = match weight {
        FontWeight::Regular => &HELVETICA,
        FontWeight::Bold => &HELVETICA_BOLD,
    };
    let code = c as u32;
    if (32..127).contains(&code) {
        u32::from(table[(code - 32) as usize])
    } else {
        556
    }
}
