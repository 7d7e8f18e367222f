use std::time::Duration;

use lexsum_core::{ProgressSnapshot, ResultPayload, TabKind};
use lexsum_logging::lexsum_debug;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use url::Url;

use crate::wire::{self, ChatRequest};
use crate::{ApiError, FailureKind, UploadFile};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub upload_timeout: Duration,
    pub poll_timeout: Duration,
    pub result_timeout: Duration,
    pub tab_timeout: Duration,
    pub chat_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            upload_timeout: Duration::from_secs(30),
            poll_timeout: Duration::from_secs(10),
            result_timeout: Duration::from_secs(30),
            tab_timeout: Duration::from_secs(30),
            chat_timeout: Duration::from_secs(60),
        }
    }
}

impl ApiSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// The analysis backend as seen by the client.
#[async_trait::async_trait]
pub trait BackendApi: Send + Sync {
    /// Submits a document and returns the backend's request id.
    async fn upload(&self, file: &UploadFile) -> Result<String, ApiError>;

    async fn progress(&self, request_id: &str) -> Result<ProgressSnapshot, ApiError>;

    async fn complete_summary(&self, request_id: &str) -> Result<ResultPayload, ApiError>;

    /// Fetches one tab's slice from its dedicated endpoint.
    async fn tab(&self, request_id: &str, tab: TabKind) -> Result<Value, ApiError>;

    async fn chat(&self, request_id: &str, message: &str, context: &Value)
        -> Result<String, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: ApiSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let mut base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }
        // Keep any path prefix when joining endpoint paths.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(body.to_vec())
    }
}

#[async_trait::async_trait]
impl BackendApi for ReqwestBackend {
    async fn upload(&self, file: &UploadFile) -> Result<String, ApiError> {
        let url = self.endpoint("api/summarize-ui")?;
        lexsum_debug!(
            "POST {} file={} bytes={}",
            url,
            file.file_name,
            file.bytes.len()
        );
        let part = Part::bytes(file.bytes.to_vec()).file_name(file.file_name.clone());
        let form = Form::new().part("file", part);
        let request = self
            .client
            .post(url)
            .timeout(self.settings.upload_timeout)
            .multipart(form);
        let body = self.send(request).await?;
        wire::decode_upload_ack(&body)
    }

    async fn progress(&self, request_id: &str) -> Result<ProgressSnapshot, ApiError> {
        let url = self.endpoint(&format!("api/progress/{}", segment(request_id)))?;
        let request = self.client.get(url).timeout(self.settings.poll_timeout);
        let body = self.send(request).await?;
        wire::decode_progress(&body)
    }

    async fn complete_summary(&self, request_id: &str) -> Result<ResultPayload, ApiError> {
        let url = self.endpoint(&format!("api/complete-summary/{}", segment(request_id)))?;
        let request = self.client.get(url).timeout(self.settings.result_timeout);
        let body = self.send(request).await?;
        wire::decode_result(&body)
    }

    async fn tab(&self, request_id: &str, tab: TabKind) -> Result<Value, ApiError> {
        let url = self.endpoint(&format!(
            "api/{}-tab/{}",
            tab.endpoint_slug(),
            segment(request_id)
        ))?;
        let request = self.client.get(url).timeout(self.settings.tab_timeout);
        let body = self.send(request).await?;
        wire::decode_tab(&body)
    }

    async fn chat(
        &self,
        request_id: &str,
        message: &str,
        context: &Value,
    ) -> Result<String, ApiError> {
        let url = self.endpoint(&format!("api/chat/{}", segment(request_id)))?;
        let request = self
            .client
            .post(url)
            .timeout(self.settings.chat_timeout)
            .json(&ChatRequest { message, context });
        let body = self.send(request).await?;
        wire::decode_chat_reply(&body)
    }
}

/// Percent-encodes a request id for use as a single path segment.
fn segment(request_id: &str) -> String {
    url::form_urlencoded::byte_serialize(request_id.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
