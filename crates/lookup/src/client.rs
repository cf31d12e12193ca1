//! Suggestion API HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). One POST per query,
//! asking for a single candidate.

use thiserror::Error;
use tracing::debug;

use crate::party::{SuggestResponse, Suggestion};

const SUGGEST_PARTY_PATH: &str = "/suggestions/api/4_1/rs/suggest/party";
const USER_AGENT: &str = concat!("innbot/", env!("CARGO_PKG_VERSION"));

/// Error type for lookup operations.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Missing, invalid or rejected API key
    #[error("lookup service rejected the API key (HTTP {0})")]
    NotAuthenticated(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {0}: {1}")]
    Http(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Anything that can answer a party query with at most one candidate.
///
/// The bot uses [`DadataClient`]; tests substitute their own.
pub trait PartySuggester {
    fn suggest_party(&self, query: &str) -> Result<Option<Suggestion>, LookupError>;
}

impl<T: PartySuggester + ?Sized> PartySuggester for &T {
    fn suggest_party(&self, query: &str) -> Result<Option<Suggestion>, LookupError> {
        (**self).suggest_party(query)
    }
}

/// Suggestion API client (blocking).
#[derive(Clone)]
pub struct DadataClient {
    http: reqwest::blocking::Client,
    api_base: String,
    api_key: String,
}

impl std::fmt::Debug for DadataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DadataClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl DadataClient {
    pub fn with_base_url(api_key: impl Into<String>, api_base: impl Into<String>) -> Result<Self, LookupError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<reqwest::blocking::Response, LookupError> {
        let response = self
            .http
            .post(url)
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Accept", "application/json")
            .json(body)
            .send()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(LookupError::NotAuthenticated(status));
        }
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LookupError::Http(status, body));
        }

        Ok(response)
    }
}

impl PartySuggester for DadataClient {
    fn suggest_party(&self, query: &str) -> Result<Option<Suggestion>, LookupError> {
        let url = format!("{}{}", self.api_base, SUGGEST_PARTY_PATH);
        let body = serde_json::json!({ "query": query, "count": 1 });

        let resp = self.post_json(&url, &body)?;
        let parsed: SuggestResponse = resp.json().map_err(|e| LookupError::Parse(e.to_string()))?;

        debug!(candidates = parsed.suggestions.len(), "party suggestions received");
        Ok(parsed.suggestions.into_iter().next())
    }
}
