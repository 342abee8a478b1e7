//! Reference options backing the selection controls

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which reference collection an option belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Author,
    Title,
    Publisher,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Author => write!(f, "author"),
            ReferenceKind::Title => write!(f, "title"),
            ReferenceKind::Publisher => write!(f, "publisher"),
        }
    }
}

/// A selectable entry: catalog id plus display label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceOption {
    pub id: i64,
    pub label: String,
}

impl ReferenceOption {
    pub fn new(id: i64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// The three loaded reference collections
///
/// Replaced as a whole by the reference loader; never partially populated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceOptions {
    pub authors: Vec<ReferenceOption>,
    pub titles: Vec<ReferenceOption>,
    pub publishers: Vec<ReferenceOption>,
}

impl ReferenceOptions {
    pub fn options(&self, kind: ReferenceKind) -> &[ReferenceOption] {
        match kind {
            ReferenceKind::Author => &self.authors,
            ReferenceKind::Title => &self.titles,
            ReferenceKind::Publisher => &self.publishers,
        }
    }

    pub fn contains(&self, kind: ReferenceKind, id: i64) -> bool {
        self.options(kind).iter().any(|option| option.id == id)
    }

    /// Display label for an id, if loaded
    pub fn label(&self, kind: ReferenceKind, id: i64) -> Option<&str> {
        self.options(kind)
            .iter()
            .find(|option| option.id == id)
            .map(|option| option.label.as_str())
    }
}

/// Author display name: `last, first` when a last name exists, else first name
pub fn author_display_name(first_name: &str, last_name: Option<&str>) -> String {
    match last_name.map(str::trim).filter(|last| !last.is_empty()) {
        Some(last) => format!("{}, {}", last, first_name),
        None => first_name.to_string(),
    }
}
