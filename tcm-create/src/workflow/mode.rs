//! Entry mode switching

use super::{CreateTextSession, FormState};
use crate::models::{EntryMode, RequestLifecycle};
use chrono::Utc;
use tcm_common::events::CreationEvent;
use tracing::info;

impl CreateTextSession {
    /// Switch to the other entry mode; always allowed, even mid-upload
    ///
    /// Returns the new mode.
    pub async fn toggle_mode(&self) -> EntryMode {
        let mut state = self.state.write().await;
        let new_mode = state.mode.toggled();
        self.switch_mode(&mut state, new_mode);
        new_mode
    }

    /// Switch to `mode`
    ///
    /// Selecting the already active mode is a no-op and returns `false`.
    pub async fn set_mode(&self, mode: EntryMode) -> bool {
        let mut state = self.state.write().await;
        if state.mode == mode {
            return false;
        }
        self.switch_mode(&mut state, mode);
        true
    }

    /// Reset everything that belongs to a single mode's flow
    ///
    /// Advancing the ingestion sequence orphans any upload still in flight.
    fn switch_mode(&self, state: &mut FormState, new_mode: EntryMode) {
        let old_mode = state.mode;
        state.mode = new_mode;
        state.text.clear();
        state.selected_file = None;
        state.draft.reset();
        state.chunk = None;
        state.upload = RequestLifecycle::Idle;
        state.validation_message = None;
        state.latest_ingest_seq += 1;

        info!(
            session_id = %self.session_id,
            from = %old_mode.kind(),
            to = %new_mode.kind(),
            "Entry mode switched"
        );
        self.emit(CreationEvent::ModeChanged {
            session_id: self.session_id,
            old_mode: old_mode.kind(),
            new_mode: new_mode.kind(),
            timestamp: Utc::now(),
        });
    }
}
