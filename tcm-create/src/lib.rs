//! tcm-create library interface
//!
//! Registers text chunks with bibliographic metadata, either from typed text
//! or from an uploaded file that the catalog pre-processes into a draft chunk.
//! The [`workflow::CreateTextSession`] state machine is the core; the
//! [`api`] module supplies the catalog collaborator it drives.

pub mod api;
pub mod error;
pub mod models;
pub mod workflow;

pub use crate::error::{CatalogError, WorkflowError};
pub use crate::workflow::{CreateTextSession, FormState, IngestOutcome};
