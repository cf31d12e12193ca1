//! Column-oriented text table.
//!
//! Every cell is stored as the text it was read as. Nothing here parses numbers
//! or dates, so identifier-like values (leading zeros, 12+ digits) survive
//! untouched from input to output.
//!
//! Operations never mutate `self`; each returns a new `Table`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
    #[error("row count mismatch: left table has {left} rows, right table has {right}")]
    RowCountMismatch { left: usize, right: usize },
    #[error("column '{column}' has {found} cells, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },
}

/// A named column of text cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<String>) -> Self {
        Self { name: name.into(), cells }
    }
}

/// Ordered columns of equal length.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    columns: Vec<Column>,
    height: usize,
}

impl Table {
    /// Build a table from columns, checking that names are unique and all
    /// columns have the same number of cells.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, TableError> {
        let height = columns.first().map(|c| c.cells.len()).unwrap_or(0);
        for (idx, column) in columns.iter().enumerate() {
            if column.cells.len() != height {
                return Err(TableError::ColumnLength {
                    column: column.name.clone(),
                    expected: height,
                    found: column.cells.len(),
                });
            }
            if columns[..idx].iter().any(|c| c.name == column.name) {
                return Err(TableError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self { columns, height })
    }

    /// Build a table from a header row and data rows.
    ///
    /// Short rows are padded with empty cells; cells past the header width are
    /// dropped.
    pub fn from_rows(header: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, TableError> {
        let mut columns: Vec<Column> = header
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(rows.len())))
            .collect();

        for row in rows {
            let mut cells = row.into_iter();
            for column in columns.iter_mut() {
                column.cells.push(cells.next().unwrap_or_default());
            }
        }

        Self::from_columns(columns)
    }

    /// Number of data rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Cell text at `row` in column `name`, if both exist.
    pub fn cell(&self, row: usize, name: &str) -> Option<&str> {
        self.column(name)
            .and_then(|c| c.cells.get(row))
            .map(String::as_str)
    }

    /// All cells of one row, in column order.
    pub fn row(&self, row: usize) -> Vec<&str> {
        self.columns
            .iter()
            .filter_map(|c| c.cells.get(row).map(String::as_str))
            .collect()
    }

    /// Horizontal concatenation: columns of `self` followed by columns of
    /// `other`, row `i` paired with row `i`.
    ///
    /// Both tables must have the same height and no column name in common.
    pub fn hconcat(&self, other: &Table) -> Result<Table, TableError> {
        if self.height != other.height {
            return Err(TableError::RowCountMismatch {
                left: self.height,
                right: other.height,
            });
        }
        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());
        Table::from_columns(columns)
    }

    /// Add `column`, or replace the cells of an existing column with the same
    /// name (keeping its position).
    pub fn with_column(&self, column: Column) -> Result<Table, TableError> {
        if column.cells.len() != self.height && !self.columns.is_empty() {
            return Err(TableError::ColumnLength {
                column: column.name,
                expected: self.height,
                found: column.cells.len(),
            });
        }
        let mut columns = self.columns.clone();
        match columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => existing.cells = column.cells,
            None => columns.push(column),
        }
        Table::from_columns(columns)
    }

    /// Reorder so the named columns come first (in the given order, skipping
    /// names that are absent), followed by the rest in their original order.
    pub fn with_leading(&self, leading: &[&str]) -> Table {
        let mut columns: Vec<Column> = Vec::with_capacity(self.columns.len());
        for name in leading {
            if columns.iter().any(|c| c.name == *name) {
                continue;
            }
            if let Some(column) = self.column(name) {
                columns.push(column.clone());
            }
        }
        for column in &self.columns {
            if !leading.contains(&column.name.as_str()) {
                columns.push(column.clone());
            }
        }
        Table {
            columns,
            height: self.height,
        }
    }
}
