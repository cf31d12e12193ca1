// Core types shared by the reader, the enrichment engine and the bot.

pub mod table;

pub use table::{Column, Table, TableError};

/// Taxpayer identifier column (required on input).
pub const INN_COLUMN: &str = "ИНН";

/// State registration number column (optional on input).
pub const OGRN_COLUMN: &str = "ОГРН";

/// Full-name column produced by enrichment.
pub const FULL_NAME_COLUMN: &str = "ФИО";
