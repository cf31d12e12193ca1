//! The chat side of the bot, as seen by the batch handler.

use std::path::Path;

use thiserror::Error;

pub type ChatId = i64;

/// A document attached to an incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingFile {
    /// Opaque handle used to download the content
    pub file_id: String,
    /// Name the sender gave the file; empty when the client sent none
    pub file_name: String,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    /// The Bot API answered `ok: false`
    #[error("bot API error {code}: {description}")]
    Api { code: u16, description: String },
    #[error("unexpected bot API response: {0}")]
    Parse(String),
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outbound operations the handler needs from a chat service.
pub trait Transport {
    /// Save the content of `file` to `dest`, replacing what is there.
    fn download(&self, file: &IncomingFile, dest: &Path) -> Result<(), TransportError>;

    fn send_text(&self, chat: ChatId, text: &str) -> Result<(), TransportError>;

    /// Upload the file at `path`; the recipient sees its file name.
    fn send_document(&self, chat: ChatId, path: &Path) -> Result<(), TransportError>;

    /// Show the "typing" indicator.
    fn send_typing(&self, chat: ChatId) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn download(&self, file: &IncomingFile, dest: &Path) -> Result<(), TransportError> {
        (**self).download(file, dest)
    }

    fn send_text(&self, chat: ChatId, text: &str) -> Result<(), TransportError> {
        (**self).send_text(chat, text)
    }

    fn send_document(&self, chat: ChatId, path: &Path) -> Result<(), TransportError> {
        (**self).send_document(chat, path)
    }

    fn send_typing(&self, chat: ChatId) -> Result<(), TransportError> {
        (**self).send_typing(chat)
    }
}
