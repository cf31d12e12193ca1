//! Party suggestion client for the business registry.
//!
//! Given a free-text query (taxpayer identifier, optionally followed by the
//! registration number) the service returns ranked candidates. Only the best
//! candidate is ever requested.
//!
//! No caching. No retries. One client is meant to be shared across a batch.

mod client;
mod party;

pub use client::{DadataClient, LookupError, PartySuggester};
pub use party::{Management, PartyData, Suggestion};
