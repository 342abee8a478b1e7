//! Data models for the creation workflow

pub mod lifecycle;
pub mod metadata;
pub mod reference;

pub use lifecycle::RequestLifecycle;
pub use metadata::{ExtractedMetadata, MetadataDraft, PublicationStatus};
pub use reference::{author_display_name, ReferenceKind, ReferenceOption, ReferenceOptions};

use serde::{Deserialize, Serialize};
use tcm_common::events::EntryModeKind;

/// Active creation path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryMode {
    /// Operator types the chunk text
    #[default]
    Manual,
    /// Operator uploads a file; the server creates a draft chunk
    File,
}

impl EntryMode {
    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            EntryMode::Manual => EntryMode::File,
            EntryMode::File => EntryMode::Manual,
        }
    }

    pub fn kind(self) -> EntryModeKind {
        match self {
            EntryMode::Manual => EntryModeKind::Manual,
            EntryMode::File => EntryModeKind::File,
        }
    }
}

/// Server-assigned id of the draft chunk created by a file upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkIdentity {
    pub chunk_id: i64,
}
