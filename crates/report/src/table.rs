//! Table drawing with pagination.

use crate::error::ReportError;
use crate::layout::{Table, TableStyle};
use crate::surface::{
    line_height, text_width, Align, DocumentSurface, FontWeight, RectPaint, TextStyle,
};
use crate::theme::{ReportTheme, RgbColor, Swatch};

const ELLIPSIS: &str = "...";

/// Draws [`Table`]s onto a surface.
///
/// A row that would cross the content bottom starts a new page; the head row
/// is repeated at the top of every continuation page.
pub struct TableRenderer<'a> {
    theme: &'a ReportTheme,
}

impl<'a> TableRenderer<'a> {
    pub fn new(theme: &'a ReportTheme) -> Self {
        Self { theme }
    }

    /// Draws `table` with its top edge at `top` and returns the y coordinate
    /// of its bottom edge on the page it ended on.
    pub fn draw<S: DocumentSurface>(
        &self,
        surface: &mut S,
        table: &Table,
        top: f64,
    ) -> Result<f64, ReportError> {
        let columns = table.column_count();
        if columns == 0 {
            return Ok(top);
        }

        let geometry = *surface.geometry();
        let widths = column_widths(table, columns, geometry.content_width());
        let head_height = line_height(table.head_font_size) + 2.0 * table.padding;
        let row_height = line_height(table.font_size) + 2.0 * table.padding;

        let mut y = top;
        if !table.head.is_empty() {
            if y + head_height > geometry.content_bottom {
                surface.add_page()?;
                y = geometry.continuation_top;
            }
            y = self.draw_head(surface, table, &widths, y, head_height)?;
        }

        for (index, row) in table.rows.iter().enumerate() {
            if y + row_height > geometry.content_bottom {
                surface.add_page()?;
                y = geometry.continuation_top;
                if !table.head.is_empty() {
                    y = self.draw_head(surface, table, &widths, y, head_height)?;
                }
            }

            if table.style == TableStyle::Striped && index % 2 == 1 {
                surface.rect(
                    geometry.margin_left,
                    y,
                    geometry.content_width(),
                    row_height,
                    RectPaint::fill(self.theme.palette.stripe),
                )?;
            }

            let mut x = geometry.margin_left;
            for (col, width) in widths.iter().enumerate() {
                if table.style == TableStyle::Grid {
                    self.outline(surface, x, y, *width, row_height)?;
                }

                if let Some(cell) = row.get(col) {
                    let column = table.column_style(col);
                    let swatch = cell.color.or(column.color).unwrap_or(Swatch::Text);
                    let mut style = TextStyle::new(
                        table.font_size,
                        self.theme.palette.resolve(swatch),
                    )
                    .aligned(column.align.unwrap_or(table.align));
                    if cell.bold || column.bold {
                        style = style.bold();
                    }
                    self.cell_text(surface, &cell.text, x, y, *width, table.padding, &style)?;
                }
                x += width;
            }

            y += row_height;
        }

        Ok(y)
    }

    fn draw_head<S: DocumentSurface>(
        &self,
        surface: &mut S,
        table: &Table,
        widths: &[f64],
        y: f64,
        height: f64,
    ) -> Result<f64, ReportError> {
        let geometry = *surface.geometry();
        let color = match table.style {
            TableStyle::Plain => self.theme.palette.text,
            TableStyle::Striped | TableStyle::Grid => {
                surface.rect(
                    geometry.margin_left,
                    y,
                    geometry.content_width(),
                    height,
                    RectPaint::fill(self.theme.palette.resolve(table.head_fill)),
                )?;
                RgbColor::WHITE
            }
        };

        let style = TextStyle::new(table.head_font_size, color)
            .bold()
            .aligned(table.align);

        let mut x = geometry.margin_left;
        for (col, width) in widths.iter().enumerate() {
            if table.style == TableStyle::Grid {
                self.outline(surface, x, y, *width, height)?;
            }
            if let Some(text) = table.head.get(col) {
                self.cell_text(surface, text, x, y, *width, table.padding, &style)?;
            }
            x += width;
        }

        Ok(y + height)
    }

    fn outline<S: DocumentSurface>(
        &self,
        surface: &mut S,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), ReportError> {
        surface.rect(
            x,
            y,
            width,
            height,
            RectPaint {
                fill: None,
                stroke: Some(self.theme.palette.border),
            },
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn cell_text<S: DocumentSurface>(
        &self,
        surface: &mut S,
        text: &str,
        x: f64,
        y: f64,
        width: f64,
        padding: f64,
        style: &TextStyle,
    ) -> Result<(), ReportError> {
        let room = (width - 2.0 * padding).max(0.0);
        let fitted = fit_text(text, room, style.size, style.weight);
        if fitted.is_empty() {
            return Ok(());
        }

        let anchor = match style.align {
            Align::Left => x + padding,
            Align::Center => x + width / 2.0,
            Align::Right => x + width - padding,
        };
        // Baseline sits roughly one cap height below the padded top edge.
        let baseline = y + padding + line_height(style.size) * 0.75;
        surface.text(&fitted, anchor, baseline, style)
    }
}

/// Fixed widths are honoured; the rest of the content width is shared evenly.
fn column_widths(table: &Table, columns: usize, total: f64) -> Vec<f64> {
    let fixed: f64 = (0..columns)
        .filter_map(|c| table.column_style(c).width)
        .sum();
    let flexible = (0..columns)
        .filter(|c| table.column_style(*c).width.is_none())
        .count();
    let share = if flexible > 0 {
        ((total - fixed) / flexible as f64).max(0.0)
    } else {
        0.0
    };

    (0..columns)
        .map(|c| table.column_style(c).width.unwrap_or(share))
        .collect()
}

/// Truncates `text` with an ellipsis so it fits in `max_width` millimetres.
pub(crate) fn fit_text(text: &str, max_width: f64, size: f64, weight: FontWeight) -> String {
    if text_width(text, size, weight) <= max_width {
        return text.to_string();
    }

    let budget = max_width - text_width(ELLIPSIS, size, weight);
    if budget <= 0.0 {
        return String::new();
    }

    let mut fitted = String::new();
    let mut used = 0.0;
    for c in text.chars() {
        let w = text_width(c.encode_utf8(&mut [0; 4]), size, weight);
        if used + w > budget {
            break;
        }
        used += w;
        fitted.push(c);
    }
    fitted.push_str(ELLIPSIS);
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Cell, ColumnStyle};
    use crate::surface::recording::{DrawOp, RecordingSurface};
    use crate::theme::PageGeometry;

    fn table_with_rows(count: usize) -> Table {
        Table::new(TableStyle::Striped)
            .head(["NAME", "VALUE"], Swatch::Navy)
            .rows(
                (0..count)
                    .map(|i| vec![Cell::text(format!("row-{}", i)), Cell::text(i)])
                    .collect(),
            )
    }

    #[test]
    fn test_column_widths_share_remaining_space() {
        let table = Table::new(TableStyle::Plain)
            .head(["A", "B", "C"], Swatch::Navy)
            .column(
                0,
                ColumnStyle {
                    width: Some(40.0),
                    ..ColumnStyle::default()
                },
            );
        assert_eq!(column_widths(&table, 3, 180.0), vec![40.0, 70.0, 70.0]);
    }

    #[test]
    fn test_fit_text() {
        assert_eq!(fit_text("short", 100.0, 8.0, FontWeight::Regular), "short");
        let long = "A VERY LONG LAB FACILITY NAME THAT DOES NOT FIT";
        let fitted = fit_text(long, 20.0, 8.0, FontWeight::Regular);
        assert!(fitted.ends_with(ELLIPSIS));
        assert!(text_width(&fitted, 8.0, FontWeight::Regular) <= 20.0);
        assert_eq!(fit_text(long, 0.5, 8.0, FontWeight::Regular), "");
    }

    #[test]
    fn test_short_table_stays_on_one_page() {
        let theme = ReportTheme::default();
        let mut surface = RecordingSurface::new(PageGeometry::default());
        let bottom = TableRenderer::new(&theme)
            .draw(&mut surface, &table_with_rows(5), 100.0)
            .unwrap();

        assert_eq!(surface.page_count(), 1);
        assert!(bottom > 100.0);
        assert!(surface.has_text("row-4"));
    }

    #[test]
    fn test_long_table_paginates_and_repeats_head() {
        let theme = ReportTheme::default();
        let mut surface = RecordingSurface::new(PageGeometry::default());
        TableRenderer::new(&theme)
            .draw(&mut surface, &table_with_rows(60), 100.0)
            .unwrap();

        assert!(surface.page_count() > 1);
        for page in 0..surface.page_count() {
            let texts = surface.texts_on(page);
            assert_eq!(texts.iter().filter(|t| **t == "NAME").count(), 1);
        }
        // Every row is drawn exactly once.
        for i in 0..60 {
            let label = format!("row-{}", i);
            assert_eq!(surface.texts().iter().filter(|t| **t == label).count(), 1);
        }
    }

    #[test]
    fn test_rows_stay_above_content_bottom() {
        let theme = ReportTheme::default();
        let geometry = PageGeometry::default();
        let mut surface = RecordingSurface::new(geometry);
        TableRenderer::new(&theme)
            .draw(&mut surface, &table_with_rows(80), 60.0)
            .unwrap();

        for op in &surface.ops {
            if let DrawOp::Rect { y, height, .. } = op {
                assert!(y + height <= geometry.content_bottom + 1e-9);
            }
        }
    }

    #[test]
    fn test_cell_color_overrides() {
        let theme = ReportTheme::default();
        let mut surface = RecordingSurface::new(PageGeometry::default());
        let table = Table::new(TableStyle::Grid).rows(vec![vec![
            Cell::text("ONLINE").colored(Swatch::Success).bold(),
            Cell::text("plain"),
        ]]);
        TableRenderer::new(&theme)
            .draw(&mut surface, &table, 80.0)
            .unwrap();

        match surface.find_text("ONLINE") {
            Some(DrawOp::Text { style, .. }) => {
                assert_eq!(style.color, theme.palette.success);
                assert_eq!(style.weight, FontWeight::Bold);
            }
            other => panic!("unexpected op: {:?}", other),
        }
        match surface.find_text("plain") {
            Some(DrawOp::Text { style, .. }) => assert_eq!(style.color, theme.palette.text),
            other => panic!("unexpected op: {:?}", other),
        }
    }

    #[test]
    fn test_empty_table_draws_nothing() {
        let theme = ReportTheme::default();
        let mut surface = RecordingSurface::new(PageGeometry::default());
        let bottom = TableRenderer::new(&theme)
            .draw(&mut surface, &Table::new(TableStyle::Striped), 90.0)
            .unwrap();
        assert_eq!(bottom, 90.0);
        assert!(surface.ops.is_empty());
    }
}
