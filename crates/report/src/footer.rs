//! Page footers.
//!
//! Stamping needs the final page count, so it must run after every block has
//! been drawn.

use chrono::{DateTime, FixedOffset};

use shared::format::format_audit_timestamp;

use crate::error::ReportError;
use crate::surface::{Align, DocumentSurface, TextStyle};
use crate::theme::ReportTheme;

pub struct FooterStamper<'a> {
    theme: &'a ReportTheme,
}

impl<'a> FooterStamper<'a> {
    pub fn new(theme: &'a ReportTheme) -> Self {
        Self { theme }
    }

    /// Stamps the rule, notice and `PAGE n OF total` onto every page.
    pub fn stamp<S: DocumentSurface>(
        &self,
        surface: &mut S,
        generated_at: &DateTime<FixedOffset>,
    ) -> Result<(), ReportError> {
        let geometry = *surface.geometry();
        let palette = &self.theme.palette;
        let total = surface.page_count();
        let timestamp = format_audit_timestamp(generated_at);
        let small = TextStyle::new(7.0, palette.muted);
        let rule_y = geometry.footer_rule_y;

        for page in 0..total {
            surface.select_page(page)?;
            surface.line(
                (geometry.margin_left, rule_y),
                (geometry.right_edge(), rule_y),
                palette.border,
            )?;
            surface.text(
                &self.theme.footer_product_line,
                geometry.margin_left,
                rule_y + 7.0,
                &small,
            )?;
            surface.text(
                &format!("{} - {}", self.theme.footer_notice, timestamp),
                geometry.margin_left,
                rule_y + 11.0,
                &small,
            )?;
            surface.text(
                &format!("PAGE {} OF {}", page + 1, total),
                geometry.right_edge(),
                rule_y + 7.0,
                &small.aligned(Align::Right),
            )?;
        }

        Ok(())
    }
}
