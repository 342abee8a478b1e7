//! Catalog collaborator interface
//!
//! The creation workflow never talks to the network directly. It consumes a
//! [`CatalogApi`] implementation: [`HttpCatalogClient`] in production, a
//! scripted double in tests.

mod http_client;

pub use http_client::HttpCatalogClient;

use crate::error::CatalogError;
use crate::models::{ExtractedMetadata, MetadataDraft, ReferenceOption};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Result type for collaborator calls
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Operations the creation workflow consumes
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn load_authors(&self) -> CatalogResult<Vec<ReferenceOption>>;

    async fn load_titles(&self) -> CatalogResult<Vec<ReferenceOption>>;

    async fn load_publishers(&self) -> CatalogResult<Vec<ReferenceOption>>;

    /// Upload a file; the server creates a draft chunk and extracts what
    /// metadata it can
    async fn upload_and_extract(&self, file: UploadFile) -> CatalogResult<ExtractionResult>;

    /// Create a chunk from typed text and attach its metadata in one operation
    async fn create_manual(&self, request: CreateManualRequest) -> CatalogResult<Confirmation>;

    /// Save the edited metadata of a chunk created by upload
    async fn save_metadata(&self, request: SaveMetadataRequest) -> CatalogResult<Confirmation>;
}

/// A selected file, read into memory for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk; the upload name is the path's final component
    pub async fn from_path(path: &Path) -> CatalogResult<Self> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| CatalogError::Io(format!("Not a file path: {}", path.display())))?;
        let bytes = tokio::fs::read(path).await?;
        Ok(Self { file_name, bytes })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Upload response: draft chunk id plus best-effort metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(rename = "text_chunk_id")]
    pub chunk_id: i64,
    #[serde(default)]
    pub metadata: ExtractedMetadata,
}

/// Manual-mode finalization payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateManualRequest {
    pub text: String,
    pub metadata: MetadataDraft,
}

/// File-mode finalization payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveMetadataRequest {
    #[serde(rename = "text_chunk_id")]
    pub chunk_id: i64,
    pub metadata: MetadataDraft,
}

/// Collaborator's acknowledgement of a finalization call
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Confirmation {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_extraction_result_wire_names() {
        let result: ExtractionResult =
            serde_json::from_str(r#"{"text_chunk_id": 42, "metadata": {"title_id": 1}}"#)
                .unwrap();
        assert_eq!(result.chunk_id, 42);
        assert_eq!(result.metadata.title_id, Some(1));

        let result: ExtractionResult = serde_json::from_str(r#"{"text_chunk_id": 5}"#).unwrap();
        assert_eq!(result.metadata, ExtractedMetadata::default());
    }

    #[test]
    fn test_save_request_wire_names() {
        let request = SaveMetadataRequest {
            chunk_id: 42,
            metadata: MetadataDraft::default(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["text_chunk_id"], 42);
        assert_eq!(json["metadata"]["publication_status"], "published");
    }

    #[tokio::test]
    async fn test_upload_file_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Call me Ishmael.").unwrap();

        let upload = UploadFile::from_path(file.path()).await.unwrap();
        assert_eq!(upload.bytes, b"Call me Ishmael.");
        assert_eq!(
            upload.file_name,
            file.path().file_name().unwrap().to_string_lossy()
        );
    }

    #[tokio::test]
    async fn test_upload_file_missing_path() {
        let err = UploadFile::from_path(Path::new("/nonexistent/tcm/notes.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
