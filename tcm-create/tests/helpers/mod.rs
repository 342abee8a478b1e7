//! Test helpers: scripted in-memory catalog and session utilities

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tcm_common::events::EventBus;
use tcm_create::api::{
    CatalogApi, CatalogResult, Confirmation, CreateManualRequest, ExtractionResult,
    SaveMetadataRequest, UploadFile,
};
use tcm_create::models::{ExtractedMetadata, ReferenceKind, ReferenceOption};
use tcm_create::{CatalogError, CreateTextSession, FormState};
use tokio::sync::oneshot;

enum UploadScript {
    Ready(CatalogResult<ExtractionResult>),
    Gated(oneshot::Receiver<CatalogResult<ExtractionResult>>),
}

/// Catalog double with per-call scripting and call recording
///
/// Uploads are scripted by file name so overlapping ingestions resolve in
/// whatever order a test dictates.
pub struct MockCatalog {
    authors: Vec<ReferenceOption>,
    titles: Vec<ReferenceOption>,
    publishers: Vec<ReferenceOption>,
    reference_failures: Mutex<HashMap<ReferenceKind, CatalogError>>,
    replaced_options: Mutex<HashMap<ReferenceKind, Vec<ReferenceOption>>>,
    uploads: Mutex<HashMap<String, UploadScript>>,
    upload_calls: Mutex<Vec<String>>,
    create_failure: Mutex<Option<CatalogError>>,
    create_gate: Mutex<Option<oneshot::Receiver<()>>>,
    create_calls: Mutex<Vec<CreateManualRequest>>,
    save_failure: Mutex<Option<CatalogError>>,
    save_calls: Mutex<Vec<SaveMetadataRequest>>,
    reference_calls: AtomicUsize,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self {
            authors: vec![
                ReferenceOption::new(1, "Doe, John"),
                ReferenceOption::new(2, "Smith, Jane"),
                ReferenceOption::new(7, "Roe, Richard"),
            ],
            titles: vec![
                ReferenceOption::new(1, "The Great Novel"),
                ReferenceOption::new(2, "Another Story"),
            ],
            publishers: vec![
                ReferenceOption::new(1, "Publisher A"),
                ReferenceOption::new(2, "Publisher B"),
            ],
            reference_failures: Mutex::new(HashMap::new()),
            replaced_options: Mutex::new(HashMap::new()),
            uploads: Mutex::new(HashMap::new()),
            upload_calls: Mutex::new(Vec::new()),
            create_failure: Mutex::new(None),
            create_gate: Mutex::new(None),
            create_calls: Mutex::new(Vec::new()),
            save_failure: Mutex::new(None),
            save_calls: Mutex::new(Vec::new()),
            reference_calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_reference(&self, kind: ReferenceKind, error: CatalogError) {
        self.reference_failures.lock().unwrap().insert(kind, error);
    }

    pub fn clear_reference_failures(&self) {
        self.reference_failures.lock().unwrap().clear();
    }

    /// Serve `options` for `kind` on subsequent loads
    pub fn replace_options(&self, kind: ReferenceKind, options: Vec<ReferenceOption>) {
        self.replaced_options.lock().unwrap().insert(kind, options);
    }

    pub fn script_upload(&self, file_name: &str, result: CatalogResult<ExtractionResult>) {
        self.uploads
            .lock()
            .unwrap()
            .insert(file_name.to_string(), UploadScript::Ready(result));
    }

    /// Upload of `file_name` blocks until the returned sender fires
    pub fn gate_upload(&self, file_name: &str) -> oneshot::Sender<CatalogResult<ExtractionResult>> {
        let (tx, rx) = oneshot::channel();
        self.uploads
            .lock()
            .unwrap()
            .insert(file_name.to_string(), UploadScript::Gated(rx));
        tx
    }

    pub fn fail_create(&self, error: CatalogError) {
        *self.create_failure.lock().unwrap() = Some(error);
    }

    pub fn succeed_create(&self) {
        *self.create_failure.lock().unwrap() = None;
    }

    /// Next create_manual call blocks until the returned sender fires
    pub fn gate_create(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.create_gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn fail_save(&self, error: CatalogError) {
        *self.save_failure.lock().unwrap() = Some(error);
    }

    pub fn create_calls(&self) -> Vec<CreateManualRequest> {
        self.create_calls.lock().unwrap().clone()
    }

    pub fn save_calls(&self) -> Vec<SaveMetadataRequest> {
        self.save_calls.lock().unwrap().clone()
    }

    pub fn upload_calls(&self) -> Vec<String> {
        self.upload_calls.lock().unwrap().clone()
    }

    pub fn reference_calls(&self) -> usize {
        self.reference_calls.load(Ordering::SeqCst)
    }

    fn reference(&self, kind: ReferenceKind) -> CatalogResult<Vec<ReferenceOption>> {
        self.reference_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.reference_failures.lock().unwrap().get(&kind) {
            return Err(error.clone());
        }
        if let Some(options) = self.replaced_options.lock().unwrap().get(&kind) {
            return Ok(options.clone());
        }
        Ok(match kind {
            ReferenceKind::Author => self.authors.clone(),
            ReferenceKind::Title => self.titles.clone(),
            ReferenceKind::Publisher => self.publishers.clone(),
        })
    }
}

#[async_trait]
impl CatalogApi for MockCatalog {
    async fn load_authors(&self) -> CatalogResult<Vec<ReferenceOption>> {
        self.reference(ReferenceKind::Author)
    }

    async fn load_titles(&self) -> CatalogResult<Vec<ReferenceOption>> {
        self.reference(ReferenceKind::Title)
    }

    async fn load_publishers(&self) -> CatalogResult<Vec<ReferenceOption>> {
        self.reference(ReferenceKind::Publisher)
    }

    async fn upload_and_extract(&self, file: UploadFile) -> CatalogResult<ExtractionResult> {
        self.upload_calls.lock().unwrap().push(file.file_name.clone());
        let script = self.uploads.lock().unwrap().remove(&file.file_name);
        match script {
            Some(UploadScript::Ready(result)) => result,
            Some(UploadScript::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(CatalogError::Network("gate dropped".to_string()))),
            None => Err(CatalogError::Rejected {
                status: 500,
                message: format!("no upload scripted for {}", file.file_name),
            }),
        }
    }

    async fn create_manual(&self, request: CreateManualRequest) -> CatalogResult<Confirmation> {
        self.create_calls.lock().unwrap().push(request);
        let gate = self.create_gate.lock().unwrap().take();
        if let Some(rx) = gate {
            let _ = rx.await;
        }
        match self.create_failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(Confirmation {
                message: "Text chunk created successfully.".to_string(),
            }),
        }
    }

    async fn save_metadata(&self, request: SaveMetadataRequest) -> CatalogResult<Confirmation> {
        let chunk_id = request.chunk_id;
        self.save_calls.lock().unwrap().push(request);
        match self.save_failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(Confirmation {
                message: format!("Metadata saved successfully for ID {}.", chunk_id),
            }),
        }
    }
}

pub fn extraction(chunk_id: i64, metadata: ExtractedMetadata) -> CatalogResult<ExtractionResult> {
    Ok(ExtractionResult { chunk_id, metadata })
}

pub fn text_file(name: &str) -> UploadFile {
    UploadFile::new(name, format!("contents of {}", name).into_bytes())
}

/// Session over a fresh mock, without loading reference data
pub fn new_session() -> (Arc<MockCatalog>, CreateTextSession) {
    let catalog = Arc::new(MockCatalog::new());
    let session = CreateTextSession::new(catalog.clone(), EventBus::new(64));
    (catalog, session)
}

/// Session with reference data loaded
pub async fn loaded_session() -> (Arc<MockCatalog>, CreateTextSession) {
    let (catalog, session) = new_session();
    session.load_reference_data().await.unwrap();
    (catalog, session)
}

/// Yield until the session state satisfies `predicate`
pub async fn wait_until<F>(session: &CreateTextSession, predicate: F)
where
    F: Fn(&FormState) -> bool,
{
    for _ in 0..10_000 {
        if predicate(&session.snapshot().await) {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("session never reached the expected state");
}
