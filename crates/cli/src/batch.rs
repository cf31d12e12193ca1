//! Grouping incoming documents into batches.
//!
//! Documents sent together arrive as separate messages that share a media
//! group id. A group is complete once no new part has arrived for the settle
//! window; a document sent alone is a batch by itself.

use std::time::{Duration, Instant};

use crate::messages;
use crate::transport::{ChatId, IncomingFile};

const XLSX_EXTENSION: &str = ".xlsx";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub chat: ChatId,
    pub media_group_id: Option<String>,
    pub documents: Vec<IncomingFile>,
}

/// The documents of a valid batch, in the order they were sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accepted<'a> {
    pub first: &'a IncomingFile,
    pub second: Option<&'a IncomingFile>,
}

/// Why a batch is not processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// A document arrived without a file name
    MissingInfo,
    /// Wrong number of files, or a file that is not `.xlsx`
    NotOneOrTwoWorkbooks,
}

impl Rejection {
    /// Reply text for the user
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::MissingInfo => messages::DOCUMENT_INFO_MISSING,
            Rejection::NotOneOrTwoWorkbooks => messages::REJECT_BATCH,
        }
    }
}

impl Batch {
    pub fn single(chat: ChatId, document: IncomingFile) -> Self {
        Self {
            chat,
            media_group_id: None,
            documents: vec![document],
        }
    }

    /// Accept 1 or 2 documents, all `.xlsx`, and hand back the first and
    /// the optional second one.
    pub fn validate(&self) -> Result<Accepted<'_>, Rejection> {
        if self.documents.iter().any(|d| d.file_name.trim().is_empty()) {
            return Err(Rejection::MissingInfo);
        }
        if !self.documents.iter().all(|d| is_xlsx(&d.file_name)) {
            return Err(Rejection::NotOneOrTwoWorkbooks);
        }
        match self.documents.as_slice() {
            [first] => Ok(Accepted { first, second: None }),
            [first, second] => Ok(Accepted {
                first,
                second: Some(second),
            }),
            _ => Err(Rejection::NotOneOrTwoWorkbooks),
        }
    }

    pub fn file_names(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.file_name.clone()).collect()
    }
}

fn is_xlsx(file_name: &str) -> bool {
    file_name.to_lowercase().ends_with(XLSX_EXTENSION)
}

#[derive(Debug)]
struct PendingGroup {
    chat: ChatId,
    group_id: String,
    documents: Vec<IncomingFile>,
    last_seen: Instant,
}

/// Collects media group parts until their settle window passes.
#[derive(Debug)]
pub struct MediaGroupCollector {
    settle: Duration,
    // Arrival order, so batches are released oldest first
    pending: Vec<PendingGroup>,
}

impl MediaGroupCollector {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            pending: Vec::new(),
        }
    }

    /// Record a document. Returns a batch right away when it is not part of
    /// a group.
    pub fn push(
        &mut self,
        chat: ChatId,
        media_group_id: Option<String>,
        document: IncomingFile,
        now: Instant,
    ) -> Option<Batch> {
        let Some(group_id) = media_group_id else {
            return Some(Batch::single(chat, document));
        };

        match self
            .pending
            .iter_mut()
            .find(|g| g.chat == chat && g.group_id == group_id)
        {
            Some(group) => {
                group.documents.push(document);
                group.last_seen = now;
            }
            None => self.pending.push(PendingGroup {
                chat,
                group_id,
                documents: vec![document],
                last_seen: now,
            }),
        }
        None
    }

    /// Remove and return every group whose last part is older than the
    /// settle window.
    pub fn drain_ready(&mut self, now: Instant) -> Vec<Batch> {
        let settle = self.settle;
        let (ready, waiting): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|g| now.saturating_duration_since(g.last_seen) >= settle);
        self.pending = waiting;

        ready
            .into_iter()
            .map(|g| Batch {
                chat: g.chat,
                media_group_id: Some(g.group_id),
                documents: g.documents,
            })
            .collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
