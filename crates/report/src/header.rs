//! Report masthead.

use chrono::{DateTime, FixedOffset};

use domain::models::ReportKind;
use shared::format::{format_audit_id, format_audit_timestamp};

use crate::error::ReportError;
use crate::surface::{DocumentSurface, RectPaint, TextStyle};
use crate::theme::{ReportTheme, RgbColor};

const BAND_HEIGHT: f64 = 45.0;
const META_X: f64 = 140.0;

/// Draws the navy masthead band on the first page.
pub struct HeaderRenderer<'a> {
    theme: &'a ReportTheme,
}

impl<'a> HeaderRenderer<'a> {
    pub fn new(theme: &'a ReportTheme) -> Self {
        Self { theme }
    }

    pub fn draw<S: DocumentSurface>(
        &self,
        surface: &mut S,
        kind: ReportKind,
        generated_at: &DateTime<FixedOffset>,
    ) -> Result<(), ReportError> {
        let palette = &self.theme.palette;
        let width = surface.geometry().width;
        let left = surface.geometry().margin_left;

        surface.select_page(0)?;
        surface.rect(0.0, 0.0, width, BAND_HEIGHT, RectPaint::fill(palette.navy))?;

        surface.text(
            &self.theme.product_title,
            left,
            20.0,
            &TextStyle::new(24.0, RgbColor::WHITE).bold(),
        )?;
        surface.text(
            &self.theme.product_subtitle,
            left,
            27.0,
            &TextStyle::new(10.0, RgbColor::WHITE),
        )?;

        surface.rect(META_X, 15.0, 55.0, 10.0, RectPaint::fill(palette.primary))?;
        surface.text(
            &format!("{} LEVEL AUDIT", kind),
            META_X + 5.0,
            21.5,
            &TextStyle::new(8.0, RgbColor::WHITE).bold(),
        )?;

        let meta = TextStyle::new(8.0, palette.masthead_meta);
        surface.text(
            &format!("ID: {}", format_audit_id(generated_at)),
            META_X,
            32.0,
            &meta,
        )?;
        surface.text(
            &format!("DATE: {}", format_audit_timestamp(generated_at)),
            META_X,
            37.0,
            &meta,
        )?;
        surface.text(
            &format!("STATUS: {}", self.theme.status_stamp),
            META_X,
            42.0,
            &meta,
        )?;

        Ok(())
    }
}
