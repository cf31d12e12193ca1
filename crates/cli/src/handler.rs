//! One batch, start to finish: validate, download, merge, enrich, reply.
//!
//! Every file the handler creates is a scoped temp file in the work
//! directory and is gone when `handle` returns, whatever the outcome.

use innbot_engine::{EnrichStats, Pipeline, PipelineError};
use innbot_io::{SheetStyle, WorkDir};
use innbot_lookup::PartySuggester;
use thiserror::Error;
use tracing::{error, info, info_span, warn};

use crate::batch::{Accepted, Batch, Rejection};
use crate::messages;
use crate::transport::{ChatId, Transport, TransportError};

/// Prefix of the merged table sent before the lookups start
pub const MERGED_PREFIX: &str = "ООО_";
/// Prefix of the final table with the ФИО column
pub const ENRICHED_PREFIX: &str = "ООО_ФИО_";
const INPUT_PREFIX: &str = "input_";

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("work directory: {0}")]
    WorkDir(#[from] std::io::Error),
}

#[derive(Debug)]
pub enum BatchOutcome {
    Rejected(Rejection),
    Completed(EnrichStats),
    /// The user was sent the error text
    Failed(HandlerError),
}

pub struct BatchHandler<T, S> {
    transport: T,
    suggester: S,
    workdir: WorkDir,
    send_merged: bool,
    style: SheetStyle,
}

impl<T: Transport, S: PartySuggester> BatchHandler<T, S> {
    pub fn new(transport: T, suggester: S, workdir: WorkDir) -> Self {
        Self {
            transport,
            suggester,
            workdir,
            send_merged: true,
            style: SheetStyle::default(),
        }
    }

    pub fn with_send_merged(mut self, send_merged: bool) -> Self {
        self.send_merged = send_merged;
        self
    }

    pub fn with_style(mut self, style: SheetStyle) -> Self {
        self.style = style;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Reply to `/start`.
    pub fn welcome(&self, chat: ChatId) -> Result<(), TransportError> {
        self.transport.send_text(chat, messages::WELCOME)
    }

    /// Run one batch. Failures are reported to the chat, never returned.
    pub fn handle(&self, batch: &Batch) -> BatchOutcome {
        let span = info_span!(
            "batch",
            chat = batch.chat,
            group = batch.media_group_id.as_deref().unwrap_or("-"),
            files = batch.documents.len()
        );
        let _enter = span.enter();

        let accepted = match batch.validate() {
            Ok(accepted) => accepted,
            Err(rejection) => {
                info!(?rejection, "batch rejected");
                self.reply(batch.chat, rejection.message());
                return BatchOutcome::Rejected(rejection);
            }
        };

        info!("batch started");
        match self.process(batch, accepted) {
            Ok(stats) => {
                info!(
                    rows = stats.rows,
                    lookups = stats.lookups,
                    named = stats.named,
                    skipped = stats.skipped,
                    "batch finished"
                );
                BatchOutcome::Completed(stats)
            }
            Err(e) => {
                error!(error = %e, detail = ?e, "batch failed");
                self.reply(batch.chat, &messages::failure(&e));
                BatchOutcome::Failed(e)
            }
        }
    }

    fn reply(&self, chat: ChatId, text: &str) {
        if let Err(e) = self.transport.send_text(chat, text) {
            warn!(error = %e, "could not deliver reply");
        }
    }

    fn process(&self, batch: &Batch, accepted: Accepted<'_>) -> Result<EnrichStats, HandlerError> {
        let chat = batch.chat;

        let first = self.workdir.temp_xlsx(INPUT_PREFIX)?;
        self.transport.download(accepted.first, first.path())?;
        let second = match accepted.second {
            Some(document) => {
                let input = self.workdir.temp_xlsx(INPUT_PREFIX)?;
                self.transport.download(document, input.path())?;
                Some(input)
            }
            None => None,
        };

        let pipeline = Pipeline::new(&self.suggester, self.style.clone());
        let merged = pipeline.merge(first.path(), second.as_ref().map(|input| input.path()))?;

        if self.send_merged {
            let out = self.workdir.temp_xlsx(MERGED_PREFIX)?;
            pipeline.write_merged(&merged, out.path())?;
            self.transport.send_document(chat, out.path())?;
        }

        self.transport.send_typing(chat)?;
        self.transport.send_text(chat, &messages::estimate(merged.height()))?;

        let (presented, stats) = pipeline.enrich(&merged)?;
        let out = self.workdir.temp_xlsx(ENRICHED_PREFIX)?;
        let export = pipeline.write_presented(&presented, out.path())?;
        info!(output = %export.summary(), "output written");
        self.transport.send_document(chat, out.path())?;

        self.transport.send_text(chat, &messages::success(&batch.file_names()))?;
        Ok(stats)
    }
}
