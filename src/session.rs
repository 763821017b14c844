//! Per-client editing session.
//!
//! A session holds at most one [`EditableDocument`]. Each upload replaces it
//! wholesale. Uploads can overlap (a user picks a second file while the first
//! is still at the gateway), so every upload is tagged with an
//! [`UploadTicket`]; only the most recently issued ticket may install its
//! result. A stale result is dropped and the newer document survives.

use crate::document::ExtractedDocument;
use crate::editor::EditableDocument;
use tracing::{debug, warn};

/// Identifies one upload attempt within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UploadTicket {
    generation: u64,
}

impl UploadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// One editor's state: the current document, if any, and the upload counter.
#[derive(Debug, Default)]
pub struct Session {
    generation: u64,
    document: Option<EditableDocument>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an upload. Any ticket issued earlier becomes stale.
    pub fn begin_upload(&mut self) -> UploadTicket {
        self.generation += 1;
        debug!("Upload {} started", self.generation);
        UploadTicket {
            generation: self.generation,
        }
    }

    /// True if `ticket` is the latest issued.
    pub fn is_current(&self, ticket: UploadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Install the result of an upload.
    ///
    /// Returns `false` (and drops `document`) when a newer upload has begun
    /// since `ticket` was issued.
    pub fn complete_upload(&mut self, ticket: UploadTicket, document: ExtractedDocument) -> bool {
        if !self.is_current(ticket) {
            warn!(
                "Discarding result of upload {} (upload {} is newer)",
                ticket.generation, self.generation
            );
            return false;
        }
        debug!(
            "Upload {} installed: {} elements",
            ticket.generation,
            document.elements.len()
        );
        self.document = Some(EditableDocument::new(document));
        true
    }

    /// Record a failed upload. The current document, if any, is kept.
    pub fn fail_upload(&mut self, ticket: UploadTicket, error: &str) {
        warn!("Upload {} failed: {}", ticket.generation, error);
    }

    pub fn document(&self) -> Option<&EditableDocument> {
        self.document.as_ref()
    }

    /// Mutable access for the point edits on [`EditableDocument`].
    pub fn document_mut(&mut self) -> Option<&mut EditableDocument> {
        self.document.as_mut()
    }

    /// Drop the current document.
    pub fn clear(&mut self) {
        self.document = None;
    }
}
