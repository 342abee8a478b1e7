//! Text chunk creation workflow
//!
//! A [`CreateTextSession`] is the state machine behind one "create text chunk"
//! form. It owns a single [`FormState`] and exposes the operator's actions:
//!
//! - [`load_reference_data`](CreateTextSession::load_reference_data): fetch
//!   authors, titles and publishers (all or nothing)
//! - [`toggle_mode`](CreateTextSession::toggle_mode) /
//!   [`set_mode`](CreateTextSession::set_mode): switch between manual text and
//!   file upload, resetting dependent state
//! - field setters: edit the metadata draft one field at a time
//! - [`ingest`](CreateTextSession::ingest): upload a file, bind the returned
//!   chunk id and merge extracted metadata
//! - [`submit`](CreateTextSession::submit): gate and dispatch the finalization
//!   call for the active mode
//!
//! Each operation holds the state lock only between its own await points.
//! Collaborator calls run unlocked, so a slow upload never blocks an edit or a
//! mode switch. Ingestion responses are matched against a sequence number and
//! dropped when a newer attempt or a mode switch superseded them.

mod editing;
mod ingestion;
mod mode;
mod reference_loader;
mod submission;

pub use ingestion::IngestOutcome;

use crate::api::CatalogApi;
use crate::error::WorkflowError;
use crate::models::{
    ChunkIdentity, EntryMode, MetadataDraft, ReferenceOptions, RequestLifecycle,
};
use std::sync::Arc;
use tcm_common::events::{CreationEvent, EventBus};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Complete state of one creation form
///
/// Returned by value from [`CreateTextSession::snapshot`]; mutate only through
/// session operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub mode: EntryMode,
    /// Typed text (manual mode)
    pub text: String,
    /// Name of the last selected file (file mode)
    pub selected_file: Option<String>,
    pub draft: MetadataDraft,
    pub chunk: Option<ChunkIdentity>,
    pub options: ReferenceOptions,
    pub reference_load: RequestLifecycle,
    pub upload: RequestLifecycle,
    pub submission: RequestLifecycle,
    /// Confirmation of the last successful submission
    pub confirmation: Option<String>,
    /// Last local validation failure, cleared by the next accepted submit
    pub validation_message: Option<String>,
    /// Advanced by every ingestion attempt and every mode switch
    pub(crate) latest_ingest_seq: u64,
}

impl FormState {
    /// Selection controls and the form body are usable only once all
    /// reference collections have loaded
    pub fn controls_enabled(&self) -> bool {
        self.reference_load.is_succeeded()
    }

    /// Whether the submit trigger should be enabled
    pub fn can_submit(&self) -> bool {
        if !self.controls_enabled() || self.submission.is_pending() || self.upload.is_pending() {
            return false;
        }
        match self.mode {
            EntryMode::Manual => !self.text.trim().is_empty(),
            EntryMode::File => self.chunk.is_some(),
        }
    }

    pub(crate) fn ensure_controls_enabled(&self) -> Result<(), WorkflowError> {
        if self.controls_enabled() {
            Ok(())
        } else {
            Err(WorkflowError::FormUnavailable)
        }
    }
}

/// State machine for one creation form
pub struct CreateTextSession {
    session_id: Uuid,
    api: Arc<dyn CatalogApi>,
    event_bus: EventBus,
    state: RwLock<FormState>,
}

impl CreateTextSession {
    /// Create a session in manual mode with an empty draft
    ///
    /// Reference data is not loaded until
    /// [`load_reference_data`](Self::load_reference_data) is called.
    pub fn new(api: Arc<dyn CatalogApi>, event_bus: EventBus) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            api,
            event_bus,
            state: RwLock::new(FormState::default()),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Copy of the current form state
    pub async fn snapshot(&self) -> FormState {
        self.state.read().await.clone()
    }

    pub async fn mode(&self) -> EntryMode {
        self.state.read().await.mode
    }

    pub async fn draft(&self) -> MetadataDraft {
        self.state.read().await.draft.clone()
    }

    pub async fn chunk_identity(&self) -> Option<ChunkIdentity> {
        self.state.read().await.chunk
    }

    fn emit(&self, event: CreationEvent) {
        tracing::debug!(session_id = %self.session_id, event = event.kind(), "Creation event");
        self.event_bus.emit_lossy(event);
    }
}
