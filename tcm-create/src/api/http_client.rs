//! HTTP catalog client
//!
//! Talks to the catalog's REST API. Paths are relative to the configured base
//! URL (default `http://localhost:8000/api`):
//!
//! | Operation            | Request                                   |
//! |----------------------|-------------------------------------------|
//! | `load_authors`       | `GET authors/`                            |
//! | `load_titles`        | `GET titles/`                             |
//! | `load_publishers`    | `GET publishers/`                         |
//! | `upload_and_extract` | `POST textchunks/create_from_file/` (multipart `file`) |
//! | `create_manual`      | `POST textchunks/create_manual/`          |
//! | `save_metadata`      | `PUT textchunks/{id}/metadata/`           |
//!
//! Error responses carry `{"detail": "..."}`; when absent an operation-specific
//! message is used instead.

use super::{
    CatalogApi, CatalogResult, Confirmation, CreateManualRequest, ExtractionResult,
    SaveMetadataRequest, UploadFile,
};
use crate::error::CatalogError;
use crate::models::{author_display_name, ReferenceOption};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tcm_common::config::ClientConfig;
use tracing::debug;

const USER_AGENT: &str = concat!("tcm-create/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct AuthorRecord {
    id: i64,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: Option<String>,
    /// Server-computed display name, when provided
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TitleRecord {
    id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct PublisherRecord {
    id: i64,
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
}

/// Catalog API client over HTTP
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpCatalogClient {
    /// Build a client from resolved configuration
    pub fn new(config: &ClientConfig) -> CatalogResult<Self> {
        Self::with_base_url(&config.api_base_url, config.request_timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> CatalogResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, fallback: &str) -> CatalogResult<T> {
        let url = self.url(path);
        debug!(url = %url, "GET");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| network_error(&url, e))?;
        let response = check_status(response, fallback).await?;

        response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(format!("{}: {}", url, e)))
    }
}

fn network_error(url: &str, err: reqwest::Error) -> CatalogError {
    CatalogError::Network(format!("Request to {} failed: {}", url, err))
}

/// Map a non-success response to `Rejected`, preferring the server's `detail`
async fn check_status(
    response: reqwest::Response,
    fallback: &str,
) -> CatalogResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .unwrap_or_default()
        .detail
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    debug!(status = status.as_u16(), body = %body, "Catalog request rejected");

    Err(CatalogError::Rejected {
        status: status.as_u16(),
        message: detail.unwrap_or_else(|| fallback.to_string()),
    })
}

/// Success bodies may be empty or carry `{"message": ...}`
async fn read_confirmation(response: reqwest::Response) -> Confirmation {
    let body = response.text().await.unwrap_or_default();
    if body.trim().is_empty() {
        return Confirmation::default();
    }
    serde_json::from_str(&body).unwrap_or_default()
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn load_authors(&self) -> CatalogResult<Vec<ReferenceOption>> {
        let records: Vec<AuthorRecord> = self.get_json("authors/", "Failed to fetch authors").await?;
        Ok(records
            .into_iter()
            .map(|record| {
                let label = record
                    .name
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or_else(|| {
                        author_display_name(&record.first_name, record.last_name.as_deref())
                    });
                ReferenceOption::new(record.id, label)
            })
            .collect())
    }

    async fn load_titles(&self) -> CatalogResult<Vec<ReferenceOption>> {
        let records: Vec<TitleRecord> = self.get_json("titles/", "Failed to fetch titles").await?;
        Ok(records
            .into_iter()
            .map(|record| ReferenceOption::new(record.id, record.title))
            .collect())
    }

    async fn load_publishers(&self) -> CatalogResult<Vec<ReferenceOption>> {
        let records: Vec<PublisherRecord> = self
            .get_json("publishers/", "Failed to fetch publishers")
            .await?;
        Ok(records
            .into_iter()
            .map(|record| ReferenceOption::new(record.id, record.name))
            .collect())
    }

    async fn upload_and_extract(&self, file: UploadFile) -> CatalogResult<ExtractionResult> {
        let url = self.url("textchunks/create_from_file/");
        debug!(url = %url, file_name = %file.file_name, bytes = file.len(), "Uploading file");

        let part = Part::bytes(file.bytes).file_name(file.file_name);
        let form = Form::new().part("file", part);

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| network_error(&url, e))?;
        let response = check_status(response, "Failed to upload file and process").await?;

        response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(format!("{}: {}", url, e)))
    }

    async fn create_manual(&self, request: CreateManualRequest) -> CatalogResult<Confirmation> {
        let url = self.url("textchunks/create_manual/");
        debug!(url = %url, text_len = request.text.len(), "Creating text chunk");

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| network_error(&url, e))?;
        let response = check_status(response, "Failed to create text chunk manually").await?;

        Ok(read_confirmation(response).await)
    }

    async fn save_metadata(&self, request: SaveMetadataRequest) -> CatalogResult<Confirmation> {
        let url = self.url(&format!("textchunks/{}/metadata/", request.chunk_id));
        debug!(url = %url, chunk_id = request.chunk_id, "Saving chunk metadata");

        let response = self
            .http_client
            .put(&url)
            .json(&request.metadata)
            .send()
            .await
            .map_err(|e| network_error(&url, e))?;
        let fallback = format!("Failed to save metadata for ID {}", request.chunk_id);
        let response = check_status(response, &fallback).await?;

        Ok(read_confirmation(response).await)
    }
}
