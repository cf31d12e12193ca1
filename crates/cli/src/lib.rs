// innbot: chat bot and command line around the enrichment pipeline

pub mod batch;
pub mod bot;
pub mod handler;
pub mod messages;
pub mod telegram;
pub mod transport;

pub use batch::{Accepted, Batch, MediaGroupCollector, Rejection};
pub use handler::{BatchHandler, BatchOutcome, HandlerError, ENRICHED_PREFIX, MERGED_PREFIX};
pub use telegram::TelegramClient;
pub use transport::{ChatId, IncomingFile, Transport, TransportError};
