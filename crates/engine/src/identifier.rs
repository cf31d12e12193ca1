//! Taxpayer identifier classification.
//!
//! The length of an ИНН tells what it identifies: 12 digits for an individual
//! entrepreneur, 10 for an organization. Each kind has its own rule for turning
//! a registry candidate into a person's name (see `enrich`).

/// Marker the registry puts in front of an individual entrepreneur's name
pub const INDIVIDUAL_PREFIX: &str = "ИП ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    /// 12-digit ИНН of an individual entrepreneur
    Individual,
    /// 10-digit ИНН of a legal entity
    Organization,
    /// Anything else; never looked up
    Unsupported,
}

impl IdentifierKind {
    pub fn classify(inn: &str) -> Self {
        match inn.chars().count() {
            12 => IdentifierKind::Individual,
            10 => IdentifierKind::Organization,
            _ => IdentifierKind::Unsupported,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierKind::Individual => "individual",
            IdentifierKind::Organization => "organization",
            IdentifierKind::Unsupported => "unsupported",
        }
    }
}

/// Identifier columns of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierRecord<'a> {
    pub inn: &'a str,
    /// Empty when the table has no ОГРН column or the cell is blank
    pub ogrn: &'a str,
}

impl<'a> IdentifierRecord<'a> {
    /// Surrounding whitespace is not part of either number.
    pub fn new(inn: &'a str, ogrn: &'a str) -> Self {
        Self {
            inn: inn.trim(),
            ogrn: ogrn.trim(),
        }
    }

    pub fn kind(&self) -> IdentifierKind {
        IdentifierKind::classify(self.inn)
    }

    /// Query text for the registry: `"{inn} {ogrn}"`, or just the ИНН when
    /// there is no registration number.
    pub fn query(&self) -> String {
        // Both parts are trimmed in `new`, and an empty ОГРН drops the
        // separator too, so the query is never `"{inn} "`.
        if self.ogrn.is_empty() {
            self.inn.to_string()
        } else {
            format!("{} {}", self.inn, self.ogrn)
        }
    }
}
