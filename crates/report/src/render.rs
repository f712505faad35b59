//! Block flow: draws layout blocks top to bottom, breaking pages as needed.

use crate::error::ReportError;
use crate::layout::{Block, SummaryItem};
use crate::surface::{Align, DocumentSurface, RectPaint, TextStyle};
use crate::table::{fit_text, TableRenderer};
use crate::theme::ReportTheme;

const SUMMARY_HEIGHT: f64 = 25.0;
const SUMMARY_ADVANCE: f64 = 30.0;
const HEADING_GAP: f64 = 5.0;
const TABLE_GAP: f64 = 10.0;
const NOTICE_GAP: f64 = 10.0;
/// Horizontal room kept free on each side of a summary figure.
const SUMMARY_PADDING: f64 = 2.0;

pub struct BlockRenderer<'a> {
    theme: &'a ReportTheme,
}

impl<'a> BlockRenderer<'a> {
    pub fn new(theme: &'a ReportTheme) -> Self {
        Self { theme }
    }

    /// Draws `blocks` starting at `top` on the current page and returns the
    /// cursor position after the last block.
    pub fn draw<S: DocumentSurface>(
        &self,
        surface: &mut S,
        blocks: &[Block],
        top: f64,
    ) -> Result<f64, ReportError> {
        let mut y = top;
        for block in blocks {
            y = match block {
                Block::Summary(items) => {
                    let y = self.ensure_room(surface, y, SUMMARY_HEIGHT)?;
                    self.summary(surface, items, y)?;
                    y + SUMMARY_ADVANCE
                }
                Block::Heading { text, size } => {
                    let y = self.ensure_room(surface, y, HEADING_GAP * 3.0)?;
                    let baseline = y + HEADING_GAP;
                    let style = TextStyle::new(*size, self.theme.palette.navy).bold();
                    self.line_of_text(surface, text, baseline, &style)?;
                    baseline + HEADING_GAP
                }
                Block::Table(table) => {
                    TableRenderer::new(self.theme).draw(surface, table, y)? + TABLE_GAP
                }
                Block::Notice(text) => {
                    let y = self.ensure_room(surface, y, NOTICE_GAP * 2.0)?;
                    let baseline = y + NOTICE_GAP;
                    let style = TextStyle::new(10.0, self.theme.palette.muted);
                    self.line_of_text(surface, text, baseline, &style)?;
                    baseline + HEADING_GAP
                }
            };
        }
        Ok(y)
    }

    /// Starts a new page when `height` does not fit below `y`.
    fn ensure_room<S: DocumentSurface>(
        &self,
        surface: &mut S,
        y: f64,
        height: f64,
    ) -> Result<f64, ReportError> {
        let geometry = surface.geometry();
        if y + height <= geometry.content_bottom {
            return Ok(y);
        }
        let top = geometry.continuation_top;
        surface.add_page()?;
        Ok(top)
    }

    /// Left-aligned text cut down to the content width.
    fn line_of_text<S: DocumentSurface>(
        &self,
        surface: &mut S,
        text: &str,
        baseline: f64,
        style: &TextStyle,
    ) -> Result<(), ReportError> {
        let left = surface.geometry().margin_left;
        let width = surface.geometry().content_width();
        let fitted = fit_text(text, width, style.size, style.weight);
        surface.text(&fitted, left, baseline, style)
    }

    fn summary<S: DocumentSurface>(
        &self,
        surface: &mut S,
        items: &[SummaryItem],
        y: f64,
    ) -> Result<(), ReportError> {
        let palette = &self.theme.palette;
        let x = surface.geometry().margin_left;
        let width = surface.geometry().content_width();

        surface.rect(
            x,
            y,
            width,
            SUMMARY_HEIGHT,
            RectPaint::fill_and_stroke(palette.background, palette.border),
        )?;
        if items.is_empty() {
            return Ok(());
        }

        let item_width = width / items.len() as f64;
        let label_style = TextStyle::new(7.0, palette.muted)
            .bold()
            .aligned(Align::Center);
        let value_style = TextStyle::new(10.0, palette.navy)
            .bold()
            .aligned(Align::Center);

        for (i, item) in items.iter().enumerate() {
            let item_x = x + i as f64 * item_width;
            if i > 0 {
                surface.line((item_x, y + 5.0), (item_x, y + 20.0), palette.border)?;
            }
            let center = item_x + item_width / 2.0;
            let room = item_width - 2.0 * SUMMARY_PADDING;
            let label = fit_text(&item.label, room, label_style.size, label_style.weight);
            let value = fit_text(&item.value, room, value_style.size, value_style.weight);
            surface.text(&label, center, y + 8.0, &label_style)?;
            surface.text(&value, center, y + 18.0, &value_style)?;
        }
        Ok(())
    }
}
