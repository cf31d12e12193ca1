// Excel file import and export (xlsx only)
//
// Import: the first worksheet becomes a text Table. The first row of the used
//         range is the header; every cell is converted to text, never typed.
// Export: a single worksheet, header row plus data rows, all written as strings.
//         Presentation (borders, widths, heights) is layered on by xlsx_styles
//         and dropped again if it cannot be applied.

use std::path::Path;
use std::time::Instant;

use calamine::{open_workbook, Data, ExcelDateTime, Reader, Xlsx, XlsxError};
use innbot_core::{Table, TableError};
use rust_xlsxwriter::{Workbook as XlsxWorkbook, Worksheet, XlsxError as XlsxWriteError};
use thiserror::Error;
use tracing::{debug, warn};

use crate::xlsx_styles::{self, SheetStyle};

/// Name of the single worksheet written on export
pub const SHEET_NAME: &str = "Sheet1";

/// Prefix for generated names of header cells that are empty
const UNNAMED_PREFIX: &str = "__UNNAMED__";

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to open Excel file '{path}': {message}")]
    Open { path: String, message: String },
    #[error("Excel file '{0}' contains no sheets")]
    NoSheets(String),
    #[error("failed to read sheet '{sheet}' of '{path}': {message}")]
    Sheet {
        path: String,
        sheet: String,
        message: String,
    },
    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write cell ({row}, {col}): {source}")]
    Cell {
        row: u32,
        col: u16,
        source: XlsxWriteError,
    },
    #[error("table too large for a worksheet: {rows} rows x {cols} columns")]
    TooLarge { rows: usize, cols: usize },
    #[error("failed to save XLSX file: {0}")]
    Save(XlsxWriteError),
}

// =============================================================================
// XLSX Import
// =============================================================================

/// Read the first worksheet of an xlsx file as a text table.
pub fn read_table(path: &Path) -> Result<Table, ReadError> {
    let start_time = Instant::now();
    let shown = path.display().to_string();

    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e: XlsxError| ReadError::Open {
        path: shown.clone(),
        message: e.to_string(),
    })?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ReadError::NoSheets(shown.clone()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ReadError::Sheet {
            path: shown.clone(),
            sheet: sheet_name.clone(),
            message: e.to_string(),
        })?;

    let mut rows = range.rows();
    let header = match rows.next() {
        Some(cells) => header_names(cells),
        None => return Ok(Table::default()),
    };
    let data: Vec<Vec<String>> = rows
        .map(|cells| cells.iter().map(cell_text).collect())
        .collect();

    let table = Table::from_rows(header, data)?;
    debug!(
        path = %shown,
        sheet = %sheet_name,
        rows = table.height(),
        cols = table.width(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "read xlsx table"
    );
    Ok(table)
}

/// Read one or two xlsx files and concatenate them column-wise.
///
/// With no second file the first table is returned as read. With two, the
/// tables must have the same number of rows and distinct column names.
pub fn merge(first: &Path, second: Option<&Path>) -> Result<Table, ReadError> {
    let left = read_table(first)?;
    let Some(second) = second else {
        return Ok(left);
    };
    let right = read_table(second)?;
    Ok(left.hconcat(&right)?)
}

/// Convert a calamine cell to the text it displays, without type inference.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            // Format nicely: integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => e.to_string(),
        Data::DateTime(dt) => datetime_text(dt),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

/// Dates as `dd.mm.yyyy`, with ` hh:mm:ss` when there is a time part.
/// Durations as `hh:mm:ss`.
fn datetime_text(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        let total = (dt.as_f64() * SECONDS_PER_DAY).round() as i64;
        return format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60);
    }
    let (year, month, day, hour, min, sec, _milli) = dt.to_ymd_hms_milli();
    if hour == 0 && min == 0 && sec == 0 {
        format!("{:02}.{:02}.{}", day, month, year)
    } else {
        format!("{:02}.{:02}.{} {:02}:{:02}:{:02}", day, month, year, hour, min, sec)
    }
}

/// Header names from the first row. Empty names get a positional placeholder,
/// repeated names get a numeric suffix so every column stays addressable.
fn header_names(cells: &[Data]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(cells.len());
    for (idx, cell) in cells.iter().enumerate() {
        let text = cell_text(cell);
        let base = if text.trim().is_empty() {
            format!("{}{}", UNNAMED_PREFIX, idx)
        } else {
            text
        };

        let mut name = base.clone();
        let mut n = 1;
        while names.contains(&name) {
            name = format!("{}_{}", base, n);
            n += 1;
        }
        names.push(name);
    }
    names
}

// =============================================================================
// XLSX Export
// =============================================================================

/// Result of an Excel export operation
#[derive(Debug, Default)]
pub struct ExportResult {
    pub rows_exported: usize,
    pub cols_exported: usize,
    /// Whether presentation styling made it into the file
    pub styled: bool,
    /// Why styling was dropped, if it was requested and failed
    pub style_error: Option<String>,
}

impl ExportResult {
    /// Short human-readable summary, e.g. "12 rows, 4 columns (styled)"
    pub fn summary(&self) -> String {
        let rows = if self.rows_exported == 1 { "row" } else { "rows" };
        let cols = if self.cols_exported == 1 { "column" } else { "columns" };
        let mut s = format!("{} {}, {} {}", self.rows_exported, rows, self.cols_exported, cols);
        if self.styled {
            s.push_str(" (styled)");
        } else if self.style_error.is_some() {
            s.push_str(" (unstyled)");
        }
        s
    }
}

/// Export a table to an xlsx file.
///
/// With `style`, presentation attributes are applied. If that fails the
/// failure is logged and the file is written again without styling; only
/// cell-writing and save failures are returned as errors.
pub fn export(table: &Table, path: &Path, style: Option<&SheetStyle>) -> Result<ExportResult, WriteError> {
    let start_time = Instant::now();
    let mut result = ExportResult {
        rows_exported: table.height(),
        cols_exported: table.width(),
        ..Default::default()
    };

    let mut workbook = build_workbook(table)?;

    if let Some(style) = style {
        let applied = match workbook.worksheet_from_index(0) {
            Ok(worksheet) => xlsx_styles::apply(worksheet, table, style),
            Err(e) => Err(e.into()),
        };
        match applied {
            Ok(()) => result.styled = true,
            Err(e) => {
                warn!(error = %e, "styling failed, writing unstyled table");
                result.style_error = Some(e.to_string());
                // Start over so no half-applied formatting leaks into the file
                workbook = build_workbook(table)?;
            }
        }
    }

    workbook.save(path).map_err(WriteError::Save)?;

    debug!(
        path = %path.display(),
        summary = %result.summary(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "exported xlsx"
    );
    Ok(result)
}

/// Workbook with one worksheet holding the header and data as plain strings.
fn build_workbook(table: &Table) -> Result<XlsxWorkbook, WriteError> {
    check_dimensions(table)?;

    let mut workbook = XlsxWorkbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .map_err(|source| WriteError::Cell { row: 0, col: 0, source })?;
    write_cells(table, worksheet)?;
    Ok(workbook)
}

/// Excel's hard sheet limits; the header takes one row.
fn check_dimensions(table: &Table) -> Result<(), WriteError> {
    const MAX_ROWS: usize = 1_048_576;
    const MAX_COLS: usize = 16_384;
    if table.height() + 1 > MAX_ROWS || table.width() > MAX_COLS {
        return Err(WriteError::TooLarge {
            rows: table.height(),
            cols: table.width(),
        });
    }
    Ok(())
}

fn write_cells(table: &Table, worksheet: &mut Worksheet) -> Result<(), WriteError> {
    for (col_idx, column) in table.columns().iter().enumerate() {
        let col = col_idx as u16;
        worksheet
            .write_string(0, col, &column.name)
            .map_err(|source| WriteError::Cell { row: 0, col, source })?;

        for (row_idx, value) in column.cells.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let row = row_idx as u32 + 1;
            worksheet
                .write_string(row, col, value)
                .map_err(|source| WriteError::Cell { row, col, source })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use innbot_core::Column;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    /// Write a fixture workbook where numeric-looking values are stored as
    /// real numbers, the way a user's spreadsheet usually has them.
    fn write_fixture(path: &Path, header: &[&str], rows: &[&[&str]]) {
        let mut workbook = XlsxWorkbook::new();
        let worksheet = workbook.add_worksheet();
        for (c, name) in header.iter().enumerate() {
            worksheet.write_string(0, c as u16, *name).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let (r, c) = (r as u32 + 1, c as u16);
                match value.parse::<f64>() {
                    Ok(n) if !value.starts_with('0') => {
                        worksheet.write_number(r, c, n).unwrap();
                    }
                    _ => {
                        worksheet.write_string(r, c, *value).unwrap();
                    }
                }
            }
        }
        workbook.save(path).unwrap();
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Float(7707083893.0)), "7707083893");
        assert_eq!(cell_text(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_text(&Data::Int(42)), "42");
        assert_eq!(cell_text(&Data::Bool(true)), "TRUE");
        assert_eq!(cell_text(&Data::String("007".into())), "007");
    }

    #[test]
    fn test_datetime_text() {
        use calamine::ExcelDateTimeType;

        let date = ExcelDateTime::new(45306.0, ExcelDateTimeType::DateTime, false);
        assert_eq!(cell_text(&Data::DateTime(date)), "15.01.2024");

        let stamp = ExcelDateTime::new(45306.4375, ExcelDateTimeType::DateTime, false);
        assert_eq!(cell_text(&Data::DateTime(stamp)), "15.01.2024 10:30:00");

        let span = ExcelDateTime::new(1.5, ExcelDateTimeType::TimeDelta, false);
        assert_eq!(cell_text(&Data::DateTime(span)), "36:00:00");
    }

    #[test]
    fn test_read_table_date_column_stays_a_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dates.xlsx");

        let mut workbook = XlsxWorkbook::new();
        let worksheet = workbook.add_worksheet();
        let date_format = rust_xlsxwriter::Format::new().set_num_format("dd.mm.yyyy");
        worksheet.write_string(0, 0, "ИНН").unwrap();
        worksheet.write_string(0, 1, "Дата регистрации").unwrap();
        worksheet.write_string(1, 0, "7707083893").unwrap();
        let registered = rust_xlsxwriter::ExcelDateTime::from_ymd(2024, 1, 15).unwrap();
        worksheet
            .write_datetime_with_format(1, 1, &registered, &date_format)
            .unwrap();
        workbook.save(&path).unwrap();

        let table = read_table(&path).unwrap();
        assert_eq!(table.cell(0, "Дата регистрации"), Some("15.01.2024"));

        // Passes through export unchanged as text
        let out = dir.path().join("out.xlsx");
        export(&table, &out, Some(&SheetStyle::default())).unwrap();
        let back = read_table(&out).unwrap();
        assert_eq!(back.cell(0, "Дата регистрации"), Some("15.01.2024"));
    }

    #[test]
    fn test_header_names_fill_and_dedupe() {
        let header = vec![
            Data::String("ИНН".into()),
            Data::Empty,
            Data::String("ИНН".into()),
        ];
        assert_eq!(header_names(&header), vec!["ИНН", "__UNNAMED__1", "ИНН_1"]);
    }

    #[test]
    fn test_read_table_keeps_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.xlsx");
        write_fixture(
            &path,
            &["ИНН", "ОГРН"],
            &[&["770708389312", "0012"], &["7707083893", "1027700132195"]],
        );

        let table = read_table(&path).unwrap();

        assert_eq!(table.column_names(), vec!["ИНН", "ОГРН"]);
        assert_eq!(table.height(), 2);
        assert_eq!(table.row(0), vec!["770708389312", "0012"]);
        assert_eq!(table.row(1), vec!["7707083893", "1027700132195"]);
    }

    #[test]
    fn test_read_table_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_table(&dir.path().join("nope.xlsx")).unwrap_err();
        assert!(matches!(err, ReadError::Open { .. }));
    }

    #[test]
    fn test_read_table_not_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.xlsx");
        std::fs::write(&path, "ИНН,ОГРН\n1,2\n").unwrap();
        assert!(matches!(read_table(&path).unwrap_err(), ReadError::Open { .. }));
    }

    #[test]
    fn test_merge_two_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.xlsx");
        let b = dir.path().join("b.xlsx");
        write_fixture(&a, &["ИНН", "ОГРН"], &[&["123456789012", "0"], &["1234567890", "5"]]);
        write_fixture(&b, &["Город"], &[&["Москва"], &["Казань"]]);

        let merged = merge(&a, Some(&b)).unwrap();

        assert_eq!(merged.column_names(), vec!["ИНН", "ОГРН", "Город"]);
        assert_eq!(merged.height(), 2);
        assert_eq!(merged.row(1), vec!["1234567890", "5", "Казань"]);
    }

    #[test]
    fn test_merge_single_file_is_identity() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.xlsx");
        write_fixture(&a, &["ИНН", "Город"], &[&["123456789012", "Москва"]]);

        assert_eq!(merge(&a, None).unwrap(), read_table(&a).unwrap());
    }

    #[test]
    fn test_merge_row_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.xlsx");
        let b = dir.path().join("b.xlsx");
        write_fixture(&a, &["ИНН"], &[&["1"], &["2"]]);
        write_fixture(&b, &["Город"], &[&["Москва"]]);

        let err = merge(&a, Some(&b)).unwrap_err();
        assert!(matches!(
            err,
            ReadError::Table(TableError::RowCountMismatch { left: 2, right: 1 })
        ));
    }

    #[test]
    fn test_export_roundtrip_preserves_order_and_text() {
        let table = Table::from_columns(vec![
            Column::new("ИНН", cells(&["007707083893", "1234567890"])),
            Column::new("ФИО", cells(&["Иванов", ""])),
            Column::new("Город", cells(&["Москва", "Казань"])),
        ])
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let result = export(&table, &path, Some(&SheetStyle::default())).unwrap();

        assert!(result.styled);
        assert_eq!(result.summary(), "2 rows, 3 columns (styled)");

        let back = read_table(&path).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_export_falls_back_when_styling_fails() {
        let table = Table::from_columns(vec![Column::new("ИНН", cells(&["1234567890"]))]).unwrap();
        let style = SheetStyle {
            base_row_height: -1.0,
            ..SheetStyle::default()
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let result = export(&table, &path, Some(&style)).unwrap();

        assert!(!result.styled);
        assert!(result.style_error.is_some());
        assert_eq!(read_table(&path).unwrap(), table);
    }

    #[test]
    fn test_export_unstyled() {
        let table = Table::from_columns(vec![Column::new("a", cells(&["1"]))]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.xlsx");

        let result = export(&table, &path, None).unwrap();
        assert!(!result.styled);
        assert!(result.style_error.is_none());
        assert_eq!(result.summary(), "1 row, 1 column");
    }
}
