//! Error types for tcm-create
//!
//! Two layers:
//! - [`CatalogError`]: a collaborator (catalog API) call failed
//! - [`WorkflowError`]: the creation state machine refused or aborted an operation

use crate::models::{EntryMode, ReferenceKind};
use thiserror::Error;

/// Failure reported by a catalog collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Transport failure (connection refused, timeout, TLS)
    #[error("{0}")]
    Network(String),

    /// Server answered with a non-success status
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Local file could not be read for upload
    #[error("IO error: {0}")]
    Io(String),
}

impl CatalogError {
    /// Message to show the operator, when the failure carries a usable one
    ///
    /// Callers fall back to an operation-specific generic message on `None`.
    pub fn reported_message(&self) -> Option<String> {
        let message = match self {
            CatalogError::Rejected { message, .. } => message.trim().to_string(),
            other => other.to_string(),
        };
        if message.is_empty() {
            None
        } else {
            Some(message)
        }
    }

    /// Reported message or `fallback`
    pub fn message_or(&self, fallback: &str) -> String {
        self.reported_message()
            .unwrap_or_else(|| fallback.to_string())
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Io(err.to_string())
    }
}

/// Creation workflow errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Reference data has not loaded; the form is disabled
    #[error("Form options are not available")]
    FormUnavailable,

    /// Operation belongs to the other entry mode
    #[error("Operation requires {expected:?} mode but session is in {actual:?} mode")]
    WrongMode { expected: EntryMode, actual: EntryMode },

    /// Local required-field check failed; nothing was sent
    #[error("{0}")]
    Validation(String),

    /// A submission is already in flight
    #[error("Submission already in progress")]
    SubmitPending,

    /// Selected id is not among the loaded options
    #[error("Unknown {kind} id {id}")]
    UnknownOption { kind: ReferenceKind, id: i64 },

    /// Collaborator failure, with the message already resolved for display
    #[error("{message}")]
    Catalog {
        message: String,
        #[source]
        source: CatalogError,
    },
}

impl WorkflowError {
    pub(crate) fn catalog(source: CatalogError, fallback: &str) -> Self {
        WorkflowError::Catalog {
            message: source.message_or(fallback),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_message_is_verbatim() {
        let err = CatalogError::Rejected {
            status: 409,
            message: "This text already exists.".to_string(),
        };
        assert_eq!(err.reported_message().as_deref(), Some("This text already exists."));
        assert_eq!(err.to_string(), "This text already exists.");
    }

    #[test]
    fn test_empty_rejection_uses_fallback() {
        let err = CatalogError::Rejected {
            status: 500,
            message: "   ".to_string(),
        };
        assert_eq!(err.reported_message(), None);
        assert_eq!(
            err.message_or("An error occurred during submission."),
            "An error occurred during submission."
        );
    }

    #[test]
    fn test_workflow_catalog_error_displays_resolved_message() {
        let err = WorkflowError::catalog(
            CatalogError::Network("connection refused".to_string()),
            "File upload failed",
        );
        assert_eq!(err.to_string(), "connection refused");
    }
}
