//! Field-level edits
//!
//! Every setter replaces exactly one field. Multi-valued fields take the full
//! selected set. Reference-backed selections are checked against the loaded
//! options; nothing else is validated here.

use super::{CreateTextSession, FormState};
use crate::error::WorkflowError;
use crate::models::{EntryMode, PublicationStatus, ReferenceKind};
use std::collections::BTreeSet;

impl CreateTextSession {
    async fn edit<F>(&self, apply: F) -> Result<(), WorkflowError>
    where
        F: FnOnce(&mut FormState) -> Result<(), WorkflowError>,
    {
        let mut state = self.state.write().await;
        state.ensure_controls_enabled()?;
        apply(&mut state)
    }

    /// Replace the typed text (manual mode only)
    pub async fn set_text(&self, text: impl Into<String>) -> Result<(), WorkflowError> {
        let text = text.into();
        self.edit(move |state| {
            if state.mode != EntryMode::Manual {
                return Err(WorkflowError::WrongMode {
                    expected: EntryMode::Manual,
                    actual: state.mode,
                });
            }
            state.text = text;
            Ok(())
        })
        .await
    }

    pub async fn set_edition(&self, edition: impl Into<String>) -> Result<(), WorkflowError> {
        let edition = edition.into();
        self.edit(move |state| {
            state.draft.edition = edition;
            Ok(())
        })
        .await
    }

    /// ISO date (`YYYY-MM-DD`) or empty to clear
    pub async fn set_publish_date(&self, date: impl Into<String>) -> Result<(), WorkflowError> {
        let date = date.into();
        self.edit(move |state| {
            state.draft.publish_date = date;
            Ok(())
        })
        .await
    }

    pub async fn set_publication_status(
        &self,
        status: PublicationStatus,
    ) -> Result<(), WorkflowError> {
        self.edit(move |state| {
            state.draft.publication_status = status;
            Ok(())
        })
        .await
    }

    pub async fn set_identifier(&self, identifier: impl Into<String>) -> Result<(), WorkflowError> {
        let identifier = identifier.into();
        self.edit(move |state| {
            state.draft.identifier = identifier;
            Ok(())
        })
        .await
    }

    /// Replace the selected authors
    pub async fn select_authors<I>(&self, ids: I) -> Result<(), WorkflowError>
    where
        I: IntoIterator<Item = i64>,
    {
        let ids: BTreeSet<i64> = ids.into_iter().collect();
        self.edit(move |state| {
            check_known(state, ReferenceKind::Author, &ids)?;
            state.draft.author_ids = ids;
            Ok(())
        })
        .await
    }

    /// Select a title, or `None` for "no title"
    pub async fn select_title(&self, id: Option<i64>) -> Result<(), WorkflowError> {
        self.edit(move |state| {
            if let Some(id) = id {
                check_known(state, ReferenceKind::Title, &[id])?;
            }
            state.draft.title_id = id;
            Ok(())
        })
        .await
    }

    /// Replace the selected publishers
    pub async fn select_publishers<I>(&self, ids: I) -> Result<(), WorkflowError>
    where
        I: IntoIterator<Item = i64>,
    {
        let ids: BTreeSet<i64> = ids.into_iter().collect();
        self.edit(move |state| {
            check_known(state, ReferenceKind::Publisher, &ids)?;
            state.draft.publisher_ids = ids;
            Ok(())
        })
        .await
    }
}

fn check_known<'a, I>(state: &FormState, kind: ReferenceKind, ids: I) -> Result<(), WorkflowError>
where
    I: IntoIterator<Item = &'a i64>,
{
    match ids.into_iter().find(|id| !state.options.contains(kind, **id)) {
        Some(id) => Err(WorkflowError::UnknownOption { kind, id: *id }),
        None => Ok(()),
    }
}
