//! Row enrichment: one registry lookup per row, producing the ФИО column.
//!
//! Rows are processed strictly in order and the output keeps every input row
//! at its original position. A lookup failure or an organization without a
//! registered head aborts the whole table.

use innbot_core::{Column, Table, TableError, FULL_NAME_COLUMN, INN_COLUMN, OGRN_COLUMN};
use innbot_lookup::{LookupError, PartySuggester};
use thiserror::Error;
use tracing::{debug, info};

use crate::identifier::{IdentifierKind, IdentifierRecord, INDIVIDUAL_PREFIX};

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("input has no '{0}' column")]
    MissingColumn(&'static str),
    /// The registry answered, but not with what an organization needs.
    #[error("row {row}: registry returned no {missing} for organization ИНН {inn}")]
    LookupShape {
        row: usize,
        inn: String,
        missing: &'static str,
    },
    #[error("row {row}: lookup failed: {source}")]
    Lookup { row: usize, source: LookupError },
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Counts for one enrichment run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichStats {
    pub rows: usize,
    pub lookups: usize,
    /// Rows that ended with a non-empty name
    pub named: usize,
    /// Rows skipped because the ИНН length is neither 10 nor 12
    pub skipped: usize,
}

/// Add (or overwrite) the ФИО column with names looked up per row.
pub fn enrich<S: PartySuggester + ?Sized>(table: &Table, suggester: &S) -> Result<(Table, EnrichStats), EnrichError> {
    let inn_column = table
        .column(INN_COLUMN)
        .ok_or(EnrichError::MissingColumn(INN_COLUMN))?;
    let ogrn_column = table.column(OGRN_COLUMN);

    let mut stats = EnrichStats {
        rows: table.height(),
        ..Default::default()
    };
    let mut names = Vec::with_capacity(table.height());

    for (idx, inn) in inn_column.cells.iter().enumerate() {
        let ogrn = ogrn_column
            .and_then(|c| c.cells.get(idx))
            .map(String::as_str)
            .unwrap_or("");
        let record = IdentifierRecord::new(inn, ogrn);
        let row = sheet_row(idx);

        let name = match record.kind() {
            IdentifierKind::Individual => {
                stats.lookups += 1;
                individual_name(&record, row, suggester)?
            }
            IdentifierKind::Organization => {
                stats.lookups += 1;
                organization_name(&record, row, suggester)?
            }
            IdentifierKind::Unsupported => {
                stats.skipped += 1;
                String::new()
            }
        };

        debug!(row, kind = record.kind().as_str(), found = !name.is_empty(), "row enriched");
        if !name.is_empty() {
            stats.named += 1;
        }
        names.push(name);
    }

    let enriched = table.with_column(Column::new(FULL_NAME_COLUMN, names))?;
    info!(
        rows = stats.rows,
        lookups = stats.lookups,
        named = stats.named,
        skipped = stats.skipped,
        "enrichment finished"
    );
    Ok((enriched, stats))
}

/// Spreadsheet row number of data row `idx` (header is row 1).
fn sheet_row(idx: usize) -> usize {
    idx + 2
}

/// Individual entrepreneur: the candidate's display value minus the `ИП `
/// marker; no candidate means no name.
fn individual_name<S: PartySuggester + ?Sized>(
    record: &IdentifierRecord<'_>,
    row: usize,
    suggester: &S,
) -> Result<String, EnrichError> {
    let candidate = suggester
        .suggest_party(&record.query())
        .map_err(|source| EnrichError::Lookup { row, source })?;

    Ok(match candidate {
        Some(s) => s.value.strip_prefix(INDIVIDUAL_PREFIX).unwrap_or(&s.value).to_string(),
        None => String::new(),
    })
}

/// Organization: the registered head's name. Both the candidate and its
/// management block are required.
fn organization_name<S: PartySuggester + ?Sized>(
    record: &IdentifierRecord<'_>,
    row: usize,
    suggester: &S,
) -> Result<String, EnrichError> {
    let candidate = suggester
        .suggest_party(&record.query())
        .map_err(|source| EnrichError::Lookup { row, source })?
        .ok_or_else(|| EnrichError::LookupShape {
            row,
            inn: record.inn.to_string(),
            missing: "candidate",
        })?;

    candidate
        .management_name()
        .map(str::to_string)
        .ok_or_else(|| EnrichError::LookupShape {
            row,
            inn: record.inn.to_string(),
            missing: "management name",
        })
}
