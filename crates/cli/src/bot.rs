//! Long-polling loop: turn updates into batches and hand each batch to its
//! own worker thread.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use innbot_lookup::PartySuggester;
use tracing::{debug, error, info, warn};

use crate::batch::{Batch, MediaGroupCollector};
use crate::handler::BatchHandler;
use crate::telegram::{TelegramClient, Update};
use crate::transport::{ChatId, IncomingFile, TransportError};

const START_COMMAND: &str = "/start";

/// Poll timeout while a media group is waiting to settle
const PENDING_POLL_SECS: u64 = 1;

const MAX_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct PollOptions {
    pub poll_timeout_secs: u64,
    pub settle: Duration,
}

/// What an update asks of the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Start(ChatId),
    Document {
        chat: ChatId,
        media_group_id: Option<String>,
        file: IncomingFile,
    },
    Ignored,
}

pub fn classify(update: &Update) -> Incoming {
    let Some(message) = &update.message else {
        return Incoming::Ignored;
    };
    let chat = message.chat.id;

    if let Some(document) = &message.document {
        return Incoming::Document {
            chat,
            media_group_id: message.media_group_id.clone(),
            file: document.to_incoming(),
        };
    }

    match message.text.as_deref().and_then(|t| t.split_whitespace().next()) {
        // "/start@botname" in group chats
        Some(cmd) if cmd == START_COMMAND || cmd.starts_with("/start@") => Incoming::Start(chat),
        _ => Incoming::Ignored,
    }
}

/// Token rejected or bot unknown; polling again will not help.
fn is_fatal(err: &TransportError) -> bool {
    matches!(err, TransportError::Api { code: 401 | 404, .. })
}

/// Poll until a fatal transport error.
pub fn serve<S>(handler: Arc<BatchHandler<TelegramClient, S>>, options: &PollOptions) -> Result<(), TransportError>
where
    S: PartySuggester + Send + Sync + 'static,
{
    let mut offset = 0i64;
    let mut collector = MediaGroupCollector::new(options.settle);
    let mut backoff = Duration::from_secs(1);

    info!(poll_timeout = options.poll_timeout_secs, "polling for updates");
    loop {
        let timeout = if collector.has_pending() {
            PENDING_POLL_SECS.min(options.poll_timeout_secs)
        } else {
            options.poll_timeout_secs
        };

        let updates = match handler.transport().get_updates(offset, timeout) {
            Ok(updates) => {
                backoff = Duration::from_secs(1);
                updates
            }
            Err(e) if is_fatal(&e) => return Err(e),
            Err(e) => {
                warn!(error = %e, retry_in = ?backoff, "getUpdates failed");
                thread::sleep(backoff);
                backoff = (backoff * 2).min(MAX_BACKOFF);
                continue;
            }
        };

        for update in &updates {
            offset = offset.max(update.update_id + 1);
            match classify(update) {
                Incoming::Start(chat) => {
                    if let Err(e) = handler.welcome(chat) {
                        warn!(chat, error = %e, "could not send welcome");
                    }
                }
                Incoming::Document {
                    chat,
                    media_group_id,
                    file,
                } => {
                    debug!(chat, group = ?media_group_id, "document received");
                    if let Some(batch) = collector.push(chat, media_group_id, file, Instant::now()) {
                        dispatch(&handler, batch);
                    }
                }
                Incoming::Ignored => {}
            }
        }

        for batch in collector.drain_ready(Instant::now()) {
            dispatch(&handler, batch);
        }
    }
}

fn dispatch<S>(handler: &Arc<BatchHandler<TelegramClient, S>>, batch: Batch)
where
    S: PartySuggester + Send + Sync + 'static,
{
    let handler = Arc::clone(handler);
    let spawned = thread::Builder::new()
        .name(format!("batch-{}", batch.chat))
        .spawn(move || {
            handler.handle(&batch);
        });
    if let Err(e) = spawned {
        error!(error = %e, "could not start batch worker");
    }
}
