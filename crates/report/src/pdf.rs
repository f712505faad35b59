//! `printpdf` implementation of [`DocumentSurface`].
//!
//! Uses the built-in Helvetica faces so no font files are needed at runtime.
//! The underlying document is not `Send`; build and finish it on one thread.

use std::io::BufWriter;

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerIndex, PdfLayerReference, PdfPageIndex, Point, Rect, Rgb,
};

use crate::error::ReportError;
use crate::surface::{
    aligned_left, check_extent, check_point, DocumentSurface, FontWeight, RectPaint, TextStyle,
};
use crate::theme::{PageGeometry, RgbColor};

const LAYER_NAME: &str = "Layer 1";
const RULE_THICKNESS: f32 = 0.5;

pub struct PdfSurface {
    doc: PdfDocumentReference,
    pages: Vec<(PdfPageIndex, PdfLayerIndex)>,
    current: usize,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    geometry: PageGeometry,
}

impl PdfSurface {
    pub fn new(title: &str, geometry: PageGeometry) -> Result<Self, ReportError> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            Mm(geometry.width as f32),
            Mm(geometry.height as f32),
            LAYER_NAME,
        );
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

        Ok(Self {
            doc,
            pages: vec![(page, layer)],
            current: 0,
            regular,
            bold,
            geometry,
        })
    }

    fn layer(&self) -> PdfLayerReference {
        let (page, layer) = self.pages[self.current];
        self.doc.get_page(page).get_layer(layer)
    }

    /// Converts a top-left based y coordinate to PDF space.
    fn flip(&self, y: f64) -> Mm {
        Mm((self.geometry.height - y) as f32)
    }

    fn point(&self, x: f64, y: f64) -> Point {
        Point::new(Mm(x as f32), self.flip(y))
    }
}

fn pdf_color(color: RgbColor) -> Color {
    let (r, g, b) = color.unit();
    Color::Rgb(Rgb::new(r, g, b, None))
}

impl DocumentSurface for PdfSurface {
    fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current_page(&self) -> usize {
        self.current
    }

    fn add_page(&mut self) -> Result<usize, ReportError> {
        let (page, layer) = self.doc.add_page(
            Mm(self.geometry.width as f32),
            Mm(self.geometry.height as f32),
            LAYER_NAME,
        );
        self.pages.push((page, layer));
        self.current = self.pages.len() - 1;
        Ok(self.current)
    }

    fn select_page(&mut self, index: usize) -> Result<(), ReportError> {
        if index >= self.pages.len() {
            return Err(ReportError::layout(format!(
                "page {} does not exist ({} pages)",
                index + 1,
                self.pages.len()
            )));
        }
        self.current = index;
        Ok(())
    }

    fn rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        paint: RectPaint,
    ) -> Result<(), ReportError> {
        check_point(&self.geometry, x, y)?;
        check_extent(width, height)?;

        let mode = match (paint.fill, paint.stroke) {
            (Some(_), Some(_)) => PaintMode::FillStroke,
            (Some(_), None) => PaintMode::Fill,
            (None, Some(_)) => PaintMode::Stroke,
            (None, None) => return Ok(()),
        };

        let layer = self.layer();
        if let Some(fill) = paint.fill {
            layer.set_fill_color(pdf_color(fill));
        }
        if let Some(stroke) = paint.stroke {
            layer.set_outline_color(pdf_color(stroke));
            layer.set_outline_thickness(RULE_THICKNESS);
        }

        let rect = Rect::new(
            Mm(x as f32),
            self.flip(y + height),
            Mm((x + width) as f32),
            self.flip(y),
        )
        .with_mode(mode);
        layer.add_rect(rect);
        Ok(())
    }

    fn line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        color: RgbColor,
    ) -> Result<(), ReportError> {
        check_point(&self.geometry, from.0, from.1)?;
        check_point(&self.geometry, to.0, to.1)?;

        let layer = self.layer();
        layer.set_outline_color(pdf_color(color));
        layer.set_outline_thickness(RULE_THICKNESS);
        layer.add_line(Line {
            points: vec![
                (self.point(from.0, from.1), false),
                (self.point(to.0, to.1), false),
            ],
            is_closed: false,
        });
        Ok(())
    }

    fn text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) -> Result<(), ReportError> {
        check_point(&self.geometry, x, y)?;
        if !style.size.is_finite() || style.size <= 0.0 {
            return Err(ReportError::layout(format!(
                "invalid font size {}",
                style.size
            )));
        }

        let left = aligned_left(text, x, style).max(0.0);
        let font = match style.weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        };

        let layer = self.layer();
        layer.set_fill_color(pdf_color(style.color));
        layer.use_text(text, style.size as f32, Mm(left as f32), self.flip(y), font);
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, ReportError> {
        let mut writer = BufWriter::new(Vec::<u8>::new());
        self.doc.save(&mut writer)?;
        writer
            .into_inner()
            .map_err(|e| ReportError::Pdf(format!("flushing document buffer: {}", e)))
    }
}
