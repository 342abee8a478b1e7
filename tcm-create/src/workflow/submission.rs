//! Submission gate and finalization dispatch

use super::CreateTextSession;
use crate::api::{CreateManualRequest, SaveMetadataRequest};
use crate::error::WorkflowError;
use crate::models::{EntryMode, RequestLifecycle};
use chrono::Utc;
use tcm_common::events::CreationEvent;
use tracing::{debug, info, warn};

/// Shown when the finalization call failed without a usable message
pub const SUBMIT_FALLBACK_MESSAGE: &str = "An error occurred during submission.";

pub const MANUAL_SUCCESS_MESSAGE: &str = "Text chunk and metadata created successfully!";

const ENTER_TEXT_MESSAGE: &str = "Please enter text.";
const UPLOAD_FIRST_MESSAGE: &str = "Please upload a file first.";
const UPLOAD_PENDING_MESSAGE: &str = "Please wait for the file upload to finish.";

enum Finalize {
    Manual(CreateManualRequest),
    File(SaveMetadataRequest),
}

impl CreateTextSession {
    /// Validate readiness for the active mode and dispatch the final request
    ///
    /// Returns the confirmation message. Local validation failures are
    /// reported as [`WorkflowError::Validation`] and never reach the
    /// collaborator. A collaborator failure leaves the draft intact so the
    /// operator can edit and resubmit.
    pub async fn submit(&self) -> Result<String, WorkflowError> {
        let (mode, request) = {
            let mut state = self.state.write().await;
            state.ensure_controls_enabled()?;
            if state.submission.is_pending() {
                return Err(WorkflowError::SubmitPending);
            }

            let gate = match state.mode {
                EntryMode::Manual if state.text.trim().is_empty() => Err(ENTER_TEXT_MESSAGE),
                EntryMode::Manual => Ok(Finalize::Manual(CreateManualRequest {
                    text: state.text.clone(),
                    metadata: state.draft.clone(),
                })),
                EntryMode::File if state.upload.is_pending() => Err(UPLOAD_PENDING_MESSAGE),
                EntryMode::File => match state.chunk {
                    Some(identity) => Ok(Finalize::File(SaveMetadataRequest {
                        chunk_id: identity.chunk_id,
                        metadata: state.draft.clone(),
                    })),
                    None => Err(UPLOAD_FIRST_MESSAGE),
                },
            };

            let request = match gate {
                Ok(request) => request,
                Err(message) => {
                    debug!(mode = %state.mode.kind(), reason = message, "Submit blocked locally");
                    state.validation_message = Some(message.to_string());
                    return Err(WorkflowError::Validation(message.to_string()));
                }
            };

            state.validation_message = None;
            state.confirmation = None;
            state.submission = RequestLifecycle::Pending;
            (state.mode, request)
        };

        info!(session_id = %self.session_id, mode = %mode.kind(), "Submitting");
        self.emit(CreationEvent::SubmissionStarted {
            session_id: self.session_id,
            mode: mode.kind(),
            timestamp: Utc::now(),
        });

        let result = match request {
            Finalize::Manual(request) => self
                .api
                .create_manual(request)
                .await
                .map(|confirmation| (confirmation, MANUAL_SUCCESS_MESSAGE.to_string())),
            Finalize::File(request) => {
                let chunk_id = request.chunk_id;
                self.api.save_metadata(request).await.map(|confirmation| {
                    (
                        confirmation,
                        format!("Metadata updated successfully for Text Chunk ID {}!", chunk_id),
                    )
                })
            }
        };

        let mut state = self.state.write().await;
        match result {
            Ok((confirmation, message)) => {
                debug!(server_message = %confirmation.message, "Catalog confirmation");
                info!(mode = %mode.kind(), "Submission succeeded");
                state.submission = RequestLifecycle::Succeeded;
                state.confirmation = Some(message.clone());
                self.emit(CreationEvent::SubmissionSucceeded {
                    session_id: self.session_id,
                    mode: mode.kind(),
                    message: message.clone(),
                    timestamp: Utc::now(),
                });
                Ok(message)
            }
            Err(e) => {
                let message = e.message_or(SUBMIT_FALLBACK_MESSAGE);
                warn!(mode = %mode.kind(), error = %e, "Submission failed");
                state.submission = RequestLifecycle::Failed(message.clone());
                self.emit(CreationEvent::SubmissionFailed {
                    session_id: self.session_id,
                    mode: mode.kind(),
                    message,
                    timestamp: Utc::now(),
                });
                Err(WorkflowError::catalog(e, SUBMIT_FALLBACK_MESSAGE))
            }
        }
    }
}
