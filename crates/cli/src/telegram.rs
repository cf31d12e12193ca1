//! Telegram Bot API client (blocking).
//!
//! Only the handful of methods the bot needs: long polling, file download,
//! text and document replies, the typing indicator.

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::transport::{ChatId, IncomingFile, Transport, TransportError};

const USER_AGENT: &str = concat!("innbot/", env!("CARGO_PKG_VERSION"));

/// Upper bound for ordinary calls and uploads
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Extra time on top of the long-poll timeout before the HTTP call gives up
const POLL_GRACE: Duration = Duration::from_secs(10);

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
    pub document: Option<Document>,
    /// Shared by all messages sent together as an album
    pub media_group_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub file_id: String,
    pub file_name: Option<String>,
}

impl Document {
    pub fn to_incoming(&self) -> IncomingFile {
        IncomingFile {
            file_id: self.file_id.clone(),
            file_name: self.file_name.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileInfo {
    file_path: Option<String>,
}

// ── Client ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::blocking::Client,
    api_base: String,
    token: String,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    pub fn with_base_url(token: impl Into<String>, api_base: impl Into<String>) -> Result<Self, TransportError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_base, self.token, file_path)
    }

    fn call<T: DeserializeOwned>(&self, method: &str, body: &serde_json::Value) -> Result<T, TransportError> {
        trace!(method, "bot API call");
        let resp = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        read_result(resp)
    }

    /// Check the token. Used once at startup so a bad token fails fast.
    pub fn get_me(&self) -> Result<BotUser, TransportError> {
        self.call("getMe", &serde_json::json!({}))
    }

    /// Long-poll for updates after `offset`, waiting up to `timeout_secs`.
    pub fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, TransportError> {
        let body = serde_json::json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        let resp = self
            .http
            .post(self.method_url("getUpdates"))
            .timeout(Duration::from_secs(timeout_secs) + POLL_GRACE)
            .json(&body)
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        read_result(resp)
    }
}

/// Unwrap the `{ok, result}` envelope. Error responses carry the same
/// envelope, so the body is parsed before the status is considered.
fn read_result<T: DeserializeOwned>(resp: reqwest::blocking::Response) -> Result<T, TransportError> {
    let status = resp.status().as_u16();
    let text = resp.text().map_err(|e| TransportError::Network(e.to_string()))?;

    let envelope: ApiResponse<T> = serde_json::from_str(&text).map_err(|e| {
        if status >= 400 {
            TransportError::Api {
                code: status,
                description: text.clone(),
            }
        } else {
            TransportError::Parse(e.to_string())
        }
    })?;

    if !envelope.ok {
        return Err(TransportError::Api {
            code: envelope.error_code.unwrap_or(status),
            description: envelope.description.unwrap_or_default(),
        });
    }
    envelope
        .result
        .ok_or_else(|| TransportError::Parse("response has no result".to_string()))
}

impl Transport for TelegramClient {
    fn download(&self, file: &IncomingFile, dest: &Path) -> Result<(), TransportError> {
        let info: FileInfo = self.call("getFile", &serde_json::json!({ "file_id": file.file_id }))?;
        let file_path = info
            .file_path
            .ok_or_else(|| TransportError::Parse(format!("no download path for '{}'", file.file_name)))?;

        let mut resp = self
            .http
            .get(self.file_url(&file_path))
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(TransportError::Api {
                code: resp.status().as_u16(),
                description: format!("download of '{}' failed", file.file_name),
            });
        }

        let mut out = File::create(dest)?;
        let bytes = resp
            .copy_to(&mut out)
            .map_err(|e| TransportError::Network(e.to_string()))?;
        debug!(bytes, file = %file.file_name, "document downloaded");
        Ok(())
    }

    fn send_text(&self, chat: ChatId, text: &str) -> Result<(), TransportError> {
        let _: serde_json::Value = self.call("sendMessage", &serde_json::json!({ "chat_id": chat, "text": text }))?;
        Ok(())
    }

    fn send_document(&self, chat: ChatId, path: &Path) -> Result<(), TransportError> {
        let form = reqwest::blocking::multipart::Form::new()
            .text("chat_id", chat.to_string())
            .file("document", path)?;

        let resp = self
            .http
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let _: serde_json::Value = read_result(resp)?;
        debug!(path = %path.display(), "document sent");
        Ok(())
    }

    fn send_typing(&self, chat: ChatId) -> Result<(), TransportError> {
        let _: bool = self.call(
            "sendChatAction",
            &serde_json::json!({ "chat_id": chat, "action": "typing" }),
        )?;
        Ok(())
    }
}
