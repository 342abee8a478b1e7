//! Reference data loading
//!
//! Authors, titles and publishers are requested concurrently. The load is all
//! or nothing: the first failure decides the reported message and no partial
//! option list is ever exposed.

use super::CreateTextSession;
use crate::error::WorkflowError;
use crate::models::{ReferenceOptions, RequestLifecycle};
use chrono::Utc;
use tcm_common::events::CreationEvent;
use tracing::{info, warn};

/// Shown when the failing collaborator gave no message
pub const OPTIONS_FALLBACK_MESSAGE: &str = "Failed to load form options.";

impl CreateTextSession {
    /// Fetch all reference collections
    ///
    /// Not retried automatically; call again to reload. After a successful
    /// load, draft selections missing from the new options are dropped.
    pub async fn load_reference_data(&self) -> Result<(), WorkflowError> {
        self.state.write().await.reference_load = RequestLifecycle::Pending;
        info!(session_id = %self.session_id, "Loading reference data");

        let result = tokio::try_join!(
            self.api.load_authors(),
            self.api.load_titles(),
            self.api.load_publishers(),
        );

        let mut state = self.state.write().await;
        match result {
            Ok((authors, titles, publishers)) => {
                info!(
                    authors = authors.len(),
                    titles = titles.len(),
                    publishers = publishers.len(),
                    "Reference data loaded"
                );
                self.emit(CreationEvent::ReferenceDataLoaded {
                    session_id: self.session_id,
                    authors: authors.len(),
                    titles: titles.len(),
                    publishers: publishers.len(),
                    timestamp: Utc::now(),
                });
                state.options = ReferenceOptions {
                    authors,
                    titles,
                    publishers,
                };
                state.reference_load = RequestLifecycle::Succeeded;

                // A reload may withdraw options the draft still references
                let state = &mut *state;
                if state.draft.retain_known(&state.options) {
                    warn!("Dropped draft selections no longer offered by the catalog");
                }
                Ok(())
            }
            Err(e) => {
                let message = e.message_or(OPTIONS_FALLBACK_MESSAGE);
                warn!(error = %e, "Reference data load failed");
                state.options = ReferenceOptions::default();
                state.reference_load = RequestLifecycle::Failed(message.clone());
                self.emit(CreationEvent::ReferenceDataFailed {
                    session_id: self.session_id,
                    message,
                    timestamp: Utc::now(),
                });
                Err(WorkflowError::catalog(e, OPTIONS_FALLBACK_MESSAGE))
            }
        }
    }
}
