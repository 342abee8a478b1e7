//! Bibliographic metadata draft and extraction merge
//!
//! The draft is the single editable record behind the creation form. It is
//! independent of how the chunk's text was obtained and is only paired with a
//! chunk (typed text or uploaded file) at submission time.

use super::reference::{ReferenceKind, ReferenceOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Publication status choices
///
/// Defaults to `Published`, matching the catalog's model default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    Draft,
    #[default]
    Published,
    Archived,
    Unknown,
}

impl PublicationStatus {
    /// All choices in display order
    pub const ALL: [PublicationStatus; 4] = [
        PublicationStatus::Draft,
        PublicationStatus::Published,
        PublicationStatus::Archived,
        PublicationStatus::Unknown,
    ];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationStatus::Draft => "draft",
            PublicationStatus::Published => "published",
            PublicationStatus::Archived => "archived",
            PublicationStatus::Unknown => "unknown",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            PublicationStatus::Draft => "Draft",
            PublicationStatus::Published => "Published",
            PublicationStatus::Archived => "Archived",
            PublicationStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PublicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PublicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(PublicationStatus::Draft),
            "published" => Ok(PublicationStatus::Published),
            "archived" => Ok(PublicationStatus::Archived),
            "unknown" => Ok(PublicationStatus::Unknown),
            other => Err(format!(
                "unknown publication status '{}' (expected draft, published, archived or unknown)",
                other
            )),
        }
    }
}

/// Editable metadata for a text chunk
///
/// Multi-valued fields are sets; each edit replaces the whole set.
/// `title_id == None` means "no title selected", which is distinct from id 0.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetadataDraft {
    pub edition: String,
    /// ISO date (`YYYY-MM-DD`) or empty
    pub publish_date: String,
    pub publication_status: PublicationStatus,
    /// ISBN, DOI or custom identifier
    pub identifier: String,
    pub author_ids: BTreeSet<i64>,
    pub title_id: Option<i64>,
    pub publisher_ids: BTreeSet<i64>,
}

/// Metadata extracted server-side from an uploaded file
///
/// Every field is optional; an absent field means "not extracted".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_status: Option<PublicationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher_ids: Option<Vec<i64>>,
}

impl MetadataDraft {
    /// Restore every field to its default
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Shallow-override merge of extraction results
    ///
    /// Present scalar fields replace the draft's value; absent ones are kept.
    /// Author and publisher sets are always replaced, never unioned, and a
    /// missing list becomes an empty set.
    pub fn merge_extracted(&mut self, extracted: ExtractedMetadata) {
        if let Some(edition) = extracted.edition {
            self.edition = edition;
        }
        if let Some(publish_date) = extracted.publish_date {
            self.publish_date = publish_date;
        }
        if let Some(status) = extracted.publication_status {
            self.publication_status = status;
        }
        if let Some(identifier) = extracted.identifier {
            self.identifier = identifier;
        }
        if let Some(title_id) = extracted.title_id {
            self.title_id = Some(title_id);
        }
        self.author_ids = extracted.author_ids.unwrap_or_default().into_iter().collect();
        self.publisher_ids = extracted
            .publisher_ids
            .unwrap_or_default()
            .into_iter()
            .collect();
    }

    /// Drop selections that are not among `options`
    ///
    /// Returns true when anything was removed.
    pub fn retain_known(&mut self, options: &ReferenceOptions) -> bool {
        let before = (self.author_ids.len(), self.publisher_ids.len(), self.title_id);

        self.author_ids
            .retain(|id| options.contains(ReferenceKind::Author, *id));
        self.publisher_ids
            .retain(|id| options.contains(ReferenceKind::Publisher, *id));
        if let Some(id) = self.title_id {
            if !options.contains(ReferenceKind::Title, id) {
                self.title_id = None;
            }
        }

        before != (self.author_ids.len(), self.publisher_ids.len(), self.title_id)
    }
}
