//! Presentation styling for exported sheets.
//!
//! Header: bold, centered, thin border, 3x the base row height.
//! Data: thin border on every cell; row height grows with the number of lines
//! in the tallest cell. Column width follows the longest text in the column.
//!
//! None of this is part of the table itself, it exists only in the written file.

use innbot_core::Table;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Worksheet, XlsxError};
use thiserror::Error;

/// Header row height as a multiple of the base row height
pub const HEADER_HEIGHT_FACTOR: f64 = 3.0;

/// Padding added to the longest text in a column, in character units
pub const COLUMN_PADDING: f64 = 2.0;

/// Excel's maximum row height in points
const MAX_ROW_HEIGHT: f64 = 409.0;

/// Excel's maximum column width in character units
const MAX_COLUMN_WIDTH: f64 = 255.0;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid sheet style: {0}")]
    InvalidStyle(String),
    #[error("failed to apply sheet styling: {0}")]
    Xlsx(#[from] XlsxError),
}

/// Row-height units for the exported sheet, in points.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetStyle {
    /// Minimum height of any row; the header is 3x this
    pub base_row_height: f64,
    /// Height per text line in a data cell
    pub line_height: f64,
}

impl Default for SheetStyle {
    fn default() -> Self {
        Self {
            base_row_height: 15.0,
            line_height: 15.0,
        }
    }
}

impl SheetStyle {
    pub fn validate(&self) -> Result<(), FormatError> {
        for (name, value) in [
            ("base_row_height", self.base_row_height),
            ("line_height", self.line_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(FormatError::InvalidStyle(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    pub fn header_height(&self) -> f64 {
        (self.base_row_height * HEADER_HEIGHT_FACTOR).min(MAX_ROW_HEIGHT)
    }

    /// Height of a data row whose tallest cell has `lines` lines.
    pub fn data_row_height(&self, lines: usize) -> f64 {
        self.base_row_height
            .max(self.line_height * lines as f64)
            .min(MAX_ROW_HEIGHT)
    }
}

/// Width of each column: longest text (header included) plus padding.
pub fn column_widths(table: &Table) -> Vec<f64> {
    table
        .columns()
        .iter()
        .map(|column| {
            let longest = column
                .cells
                .iter()
                .map(|c| c.chars().count())
                .chain(std::iter::once(column.name.chars().count()))
                .max()
                .unwrap_or(0);
            (longest as f64 + COLUMN_PADDING).min(MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// Height of each data row (header excluded).
pub fn row_heights(table: &Table, style: &SheetStyle) -> Vec<f64> {
    (0..table.height())
        .map(|row| {
            let lines = table
                .row(row)
                .iter()
                .map(|cell| line_count(cell))
                .max()
                .unwrap_or(1);
            style.data_row_height(lines)
        })
        .collect()
}

fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

/// Bold, centered, thin border on all four sides.
fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin)
}

/// Thin border on all four sides.
fn cell_format() -> Format {
    Format::new().set_border(FormatBorder::Thin)
}

/// Apply formats, widths and heights to a worksheet that already holds `table`
/// (header in row 0). Cells are rewritten with their formats.
pub(crate) fn apply(worksheet: &mut Worksheet, table: &Table, style: &SheetStyle) -> Result<(), FormatError> {
    style.validate()?;

    let header_format = header_format();
    let cell_format = cell_format();

    for (col_idx, column) in table.columns().iter().enumerate() {
        let col = col_idx as u16;
        worksheet.write_string_with_format(0, col, &column.name, &header_format)?;

        for (row_idx, value) in column.cells.iter().enumerate() {
            let row = row_idx as u32 + 1;
            if value.is_empty() {
                worksheet.write_blank(row, col, &cell_format)?;
            } else {
                worksheet.write_string_with_format(row, col, value, &cell_format)?;
            }
        }
    }

    worksheet.set_row_height(0, style.header_height())?;
    for (row_idx, height) in row_heights(table, style).into_iter().enumerate() {
        worksheet.set_row_height(row_idx as u32 + 1, height)?;
    }
    for (col_idx, width) in column_widths(table).into_iter().enumerate() {
        worksheet.set_column_width(col_idx as u16, width)?;
    }

    Ok(())
}
