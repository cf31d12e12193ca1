//! Merge → enrich → present → write, with the lookup client injected.
//!
//! The bot handler and the `process` command both drive this; neither reaches
//! for a global client.

use std::path::Path;

use innbot_core::Table;
use innbot_io::{ExportResult, ReadError, SheetStyle, WriteError};
use innbot_lookup::PartySuggester;
use thiserror::Error;

use crate::enrich::{enrich, EnrichError, EnrichStats};
use crate::present::present;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Enrich(#[from] EnrichError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

pub struct Pipeline<'a, S: PartySuggester + ?Sized> {
    suggester: &'a S,
    style: SheetStyle,
}

impl<'a, S: PartySuggester + ?Sized> Pipeline<'a, S> {
    pub fn new(suggester: &'a S, style: SheetStyle) -> Self {
        Self { suggester, style }
    }

    /// Read one or two spreadsheets as a single wide table.
    pub fn merge(&self, first: &Path, second: Option<&Path>) -> Result<Table, PipelineError> {
        Ok(innbot_io::merge(first, second)?)
    }

    /// Add the ФИО column and move ИНН, ФИО to the front.
    pub fn enrich(&self, merged: &Table) -> Result<(Table, EnrichStats), PipelineError> {
        let (enriched, stats) = enrich(merged, self.suggester)?;
        Ok((present(&enriched), stats))
    }

    /// Intermediate merged table, written as-is without styling.
    pub fn write_merged(&self, merged: &Table, path: &Path) -> Result<ExportResult, PipelineError> {
        Ok(innbot_io::export(merged, path, None)?)
    }

    /// Final table with presentation styling; falls back to unstyled output
    /// when styling fails.
    pub fn write_presented(&self, presented: &Table, path: &Path) -> Result<ExportResult, PipelineError> {
        Ok(innbot_io::export(presented, path, Some(&self.style))?)
    }

    /// Whole run for local files.
    pub fn run(&self, first: &Path, second: Option<&Path>, output: &Path) -> Result<(EnrichStats, ExportResult), PipelineError> {
        let merged = self.merge(first, second)?;
        let (presented, stats) = self.enrich(&merged)?;
        let export = self.write_presented(&presented, output)?;
        Ok((stats, export))
    }
}
