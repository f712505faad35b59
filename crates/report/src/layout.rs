//! Renderer-independent layout description.
//!
//! Section building produces a list of [`Block`]s; drawing them is a separate
//! pass. Every figure that ends up in a report can be asserted on here without
//! decoding PDF output.

use crate::surface::Align;
use crate::theme::Swatch;

/// One labelled figure inside a summary box.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryItem {
    pub label: String,
    pub value: String,
}

impl SummaryItem {
    pub fn new(label: impl Into<String>, value: impl ToString) -> Self {
        Self {
            label: label.into(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStyle {
    /// Filled head, alternating row fill.
    Striped,
    /// Filled head, every cell outlined.
    Grid,
    /// No head fill, no rules.
    Plain,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub color: Option<Swatch>,
    pub bold: bool,
}

impl Cell {
    pub fn text(text: impl ToString) -> Self {
        Self {
            text: text.to_string(),
            color: None,
            bold: false,
        }
    }

    pub fn colored(mut self, swatch: Swatch) -> Self {
        self.color = Some(swatch);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::text(text)
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::text(text)
    }
}

/// Per-column overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColumnStyle {
    pub align: Option<Align>,
    pub bold: bool,
    pub color: Option<Swatch>,
    /// Fixed width in millimetres; remaining width is shared evenly.
    pub width: Option<f64>,
}

impl ColumnStyle {
    /// Left-aligned bold label column, as used for the first column of most
    /// tables.
    pub fn label() -> Self {
        Self {
            align: Some(Align::Left),
            bold: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub style: TableStyle,
    pub head: Vec<String>,
    pub head_fill: Swatch,
    pub rows: Vec<Vec<Cell>>,
    /// Styles by column index; missing entries use the table defaults.
    pub columns: Vec<ColumnStyle>,
    pub font_size: f64,
    pub head_font_size: f64,
    pub padding: f64,
    pub align: Align,
}

impl Table {
    pub fn new(style: TableStyle) -> Self {
        Self {
            style,
            head: Vec::new(),
            head_fill: Swatch::Navy,
            rows: Vec::new(),
            columns: Vec::new(),
            font_size: 8.0,
            head_font_size: 9.0,
            padding: 4.0,
            align: Align::Left,
        }
    }

    pub fn head<I, S>(mut self, head: I, fill: Swatch) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.head = head.into_iter().map(Into::into).collect();
        self.head_fill = fill;
        self
    }

    pub fn rows(mut self, rows: Vec<Vec<Cell>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn column(mut self, index: usize, style: ColumnStyle) -> Self {
        if self.columns.len() <= index {
            self.columns.resize(index + 1, ColumnStyle::default());
        }
        self.columns[index] = style;
        self
    }

    pub fn fonts(mut self, body: f64, head: f64) -> Self {
        self.font_size = body;
        self.head_font_size = head;
        self
    }

    pub fn padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    pub fn centered(mut self) -> Self {
        self.align = Align::Center;
        self
    }

    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.head.len()))
            .max()
            .unwrap_or(0)
    }

    pub fn column_style(&self, index: usize) -> ColumnStyle {
        self.columns.get(index).copied().unwrap_or_default()
    }
}

/// A unit of report content, drawn top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Bordered box of evenly spaced label/value pairs.
    Summary(Vec<SummaryItem>),
    /// Bold section title.
    Heading { text: String, size: f64 },
    Table(Table),
    /// Muted single-line remark, e.g. when a table has no rows.
    Notice(String),
}

impl Block {
    pub fn heading(text: impl Into<String>) -> Self {
        Block::Heading {
            text: text.into(),
            size: 14.0,
        }
    }

    pub fn subheading(text: impl Into<String>) -> Self {
        Block::Heading {
            text: text.into(),
            size: 12.0,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Block::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_summary(&self) -> Option<&[SummaryItem]> {
        match self {
            Block::Summary(items) => Some(items),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_styles_fill_gaps() {
        let table = Table::new(TableStyle::Striped).column(2, ColumnStyle::label());
        assert_eq!(table.columns.len(), 3);
        assert_eq!(table.column_style(0), ColumnStyle::default());
        assert!(table.column_style(2).bold);
        assert_eq!(table.column_style(9), ColumnStyle::default());
    }

    #[test]
    fn test_column_count_covers_head_and_rows() {
        let table = Table::new(TableStyle::Plain)
            .rows(vec![vec![Cell::text("a"), Cell::text("b")]]);
        assert_eq!(table.column_count(), 2);

        let table = table.head(["A", "B", "C"], Swatch::Navy);
        assert_eq!(table.column_count(), 3);
    }

    #[test]
    fn test_cell_builders() {
        let cell = Cell::text(12).colored(Swatch::Success).bold();
        assert_eq!(cell.text, "12");
        assert_eq!(cell.color, Some(Swatch::Success));
        assert!(cell.bold);
    }
}
