#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use lexsum_core::{ProgressSnapshot, ResultPayload, TabKind};
use lexsum_engine::{ApiError, BackendApi, FailureKind, UploadFile};
use serde_json::{json, Value};

/// In-memory backend whose answers are scripted per test.
pub struct ScriptedBackend {
    upload: Mutex<Result<String, ApiError>>,
    progress: Mutex<VecDeque<Result<ProgressSnapshot, ApiError>>>,
    fallback_progress: ProgressSnapshot,
    result: Mutex<Result<ResultPayload, ApiError>>,
    pub uploads: AtomicUsize,
    pub uploaded_files: Mutex<Vec<String>>,
    pub polls: AtomicUsize,
    pub fetches: AtomicUsize,
    pub tab_fetches: Mutex<Vec<TabKind>>,
    pub chats: Mutex<Vec<(String, String, Value)>>,
}

impl ScriptedBackend {
    pub fn new(request_id: &str) -> Self {
        Self {
            upload: Mutex::new(Ok(request_id.to_string())),
            progress: Mutex::new(VecDeque::new()),
            fallback_progress: ProgressSnapshot {
                percentage: 10.0,
                ..ProgressSnapshot::zeroed()
            },
            result: Mutex::new(Ok(sample_payload())),
            uploads: AtomicUsize::new(0),
            uploaded_files: Mutex::new(Vec::new()),
            polls: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
            tab_fetches: Mutex::new(Vec::new()),
            chats: Mutex::new(Vec::new()),
        }
    }

    pub fn with_upload(self, upload: Result<String, ApiError>) -> Self {
        *self.upload.lock().unwrap() = upload;
        self
    }

    /// Queued poll answers; once drained every poll returns an unfinished snapshot.
    pub fn with_progress(self, answers: Vec<Result<ProgressSnapshot, ApiError>>) -> Self {
        self.progress.lock().unwrap().extend(answers);
        self
    }

    pub fn with_result(self, result: Result<ResultPayload, ApiError>) -> Self {
        *self.result.lock().unwrap() = result;
        self
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn uploaded_files(&self) -> Vec<String> {
        self.uploaded_files.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl BackendApi for ScriptedBackend {
    async fn upload(&self, file: &UploadFile) -> Result<String, ApiError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.uploaded_files
            .lock()
            .unwrap()
            .push(file.file_name.clone());
        self.upload.lock().unwrap().clone()
    }

    async fn progress(&self, _request_id: &str) -> Result<ProgressSnapshot, ApiError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.progress
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback_progress.clone()))
    }

    async fn complete_summary(&self, _request_id: &str) -> Result<ResultPayload, ApiError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.result.lock().unwrap().clone()
    }

    async fn tab(&self, _request_id: &str, tab: TabKind) -> Result<Value, ApiError> {
        self.tab_fetches.lock().unwrap().push(tab);
        Ok(json!({ "from": "endpoint", "tab": tab.endpoint_slug() }))
    }

    async fn chat(
        &self,
        request_id: &str,
        message: &str,
        context: &Value,
    ) -> Result<String, ApiError> {
        self.chats.lock().unwrap().push((
            request_id.to_string(),
            message.to_string(),
            context.clone(),
        ));
        if message.contains("fail") {
            return Err(ApiError::new(FailureKind::HttpStatus(500), "500 Internal Server Error"));
        }
        Ok(format!("Answer about {message}"))
    }
}

pub fn sample_payload() -> ResultPayload {
    ResultPayload::from_value(json!({
        "summary_tab": {
            "summary": "Master services agreement between Acme Corp and Globex for IT support.",
            "parties": [{"name": "Acme Corp"}, {"name": "Globex"}],
            "jurisdiction": "Delaware"
        },
        "risk_analysis_tab": {"risks": [{"level": "high", "title": "Payment default"}]},
        "financial_terms_tab": {"total_value": "USD 120,000"},
        "quality_tab": {"score": 0.92},
        "audit_trail_tab": {"events": []}
    }))
    .unwrap()
}

pub fn pending(percentage: f64) -> Result<ProgressSnapshot, ApiError> {
    Ok(ProgressSnapshot {
        percentage,
        completed: false,
        ..ProgressSnapshot::zeroed()
    })
}

pub fn contract() -> UploadFile {
    UploadFile::new("contract.pdf", b"%PDF-1.7 test".to_vec())
}
