//! File ingestion pipeline
//!
//! upload → server extraction → draft pre-population, with last-write-wins
//! across overlapping attempts.

use super::CreateTextSession;
use crate::api::UploadFile;
use crate::error::WorkflowError;
use crate::models::{ChunkIdentity, EntryMode, RequestLifecycle};
use chrono::Utc;
use tcm_common::events::CreationEvent;
use tracing::{info, warn};

/// Shown when the upload failed without a usable message
pub const UPLOAD_FALLBACK_MESSAGE: &str = "File upload failed";

/// How an ingestion attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Response applied: identity bound and metadata merged
    Applied { chunk_id: i64 },
    /// Attempt was superseded by a newer upload or a mode switch before its
    /// response arrived; state was left untouched
    Discarded { seq: u64 },
}

impl CreateTextSession {
    /// Upload `file` and seed the draft from the extraction result
    ///
    /// Requires file mode. Uploading over a previously bound chunk starts
    /// from a default draft, so nothing carries over between files. On
    /// failure the chunk identity is cleared and the
    /// draft reset, and the collaborator's message is recorded on the upload
    /// lifecycle.
    pub async fn ingest(&self, file: UploadFile) -> Result<IngestOutcome, WorkflowError> {
        let file_name = file.file_name.clone();

        let seq = {
            let mut state = self.state.write().await;
            state.ensure_controls_enabled()?;
            if state.mode != EntryMode::File {
                return Err(WorkflowError::WrongMode {
                    expected: EntryMode::File,
                    actual: state.mode,
                });
            }
            // A re-upload replaces the previous file's metadata wholesale
            if state.chunk.is_some() || state.upload.is_succeeded() {
                state.draft.reset();
            }
            state.latest_ingest_seq += 1;
            state.upload = RequestLifecycle::Pending;
            state.chunk = None;
            state.selected_file = Some(file_name.clone());
            state.latest_ingest_seq
        };

        info!(seq, file_name = %file_name, bytes = file.len(), "Ingestion started");
        self.emit(CreationEvent::IngestionStarted {
            session_id: self.session_id,
            seq,
            file_name,
            timestamp: Utc::now(),
        });

        let result = self.api.upload_and_extract(file).await;

        let mut state = self.state.write().await;
        if state.latest_ingest_seq != seq {
            warn!(
                seq,
                latest = state.latest_ingest_seq,
                "Discarding superseded ingestion response"
            );
            self.emit(CreationEvent::IngestionDiscarded {
                session_id: self.session_id,
                seq,
                timestamp: Utc::now(),
            });
            return Ok(IngestOutcome::Discarded { seq });
        }

        match result {
            Ok(extraction) => {
                let chunk_id = extraction.chunk_id;
                state.chunk = Some(ChunkIdentity { chunk_id });
                state.draft.merge_extracted(extraction.metadata);
                state.upload = RequestLifecycle::Succeeded;

                info!(seq, chunk_id, "Ingestion completed");
                self.emit(CreationEvent::IngestionCompleted {
                    session_id: self.session_id,
                    seq,
                    chunk_id,
                    timestamp: Utc::now(),
                });
                Ok(IngestOutcome::Applied { chunk_id })
            }
            Err(e) => {
                let message = e.message_or(UPLOAD_FALLBACK_MESSAGE);
                state.chunk = None;
                state.draft.reset();
                state.upload = RequestLifecycle::Failed(message.clone());

                warn!(seq, error = %e, "Ingestion failed");
                self.emit(CreationEvent::IngestionFailed {
                    session_id: self.session_id,
                    seq,
                    message,
                    timestamp: Utc::now(),
                });
                Err(WorkflowError::catalog(e, UPLOAD_FALLBACK_MESSAGE))
            }
        }
    }
}
