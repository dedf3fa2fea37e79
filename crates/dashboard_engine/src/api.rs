use std::time::Duration;

use serde_json::{json, Value};

use dashboard_core::{ChainEntry, DocumentRecord, JobStatusSnapshot, SentenceChain};

use crate::normalize;
use crate::types::{ApiError, ApiErrorKind, QueryOutcome, QueryStatus, UploadInit};

/// Connection settings for the backend gateway.
///
/// `base_url` is the single configuration point selecting which host the
/// dashboard talks to.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Hard deadline for the synchronous query path before the engine falls
    /// back to submit-and-poll.
    pub sync_query_timeout: Duration,
}

impl ApiSettings {
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(15),
            sync_query_timeout: Duration::from_secs(12),
        }
    }
}

/// Typed access to the backend endpoints. One method per endpoint; every
/// implementation returns canonical records only.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    async fn get_docs(&self) -> Result<Vec<DocumentRecord>, ApiError>;
    async fn create_upload(&self, filename: &str) -> Result<UploadInit, ApiError>;
    async fn upload_to_presigned(&self, url: &str, bytes: Vec<u8>) -> Result<(), ApiError>;
    async fn trigger_processing(&self, job_id: &str) -> Result<(), ApiError>;
    async fn get_status(&self, job_id: &str) -> Result<JobStatusSnapshot, ApiError>;
    async fn get_processing_chain(&self, job_id: &str) -> Result<Vec<ChainEntry>, ApiError>;
    async fn get_sentence_chain(&self, sentence_hash: &str) -> Result<SentenceChain, ApiError>;
    /// Synchronous query, bounded by [`ApiSettings::sync_query_timeout`].
    async fn post_query(&self, question: &str) -> Result<QueryOutcome, ApiError>;
    /// Asynchronous fallback: returns the `query_id` to poll.
    async fn post_query_submit(&self, question: &str) -> Result<String, ApiError>;
    async fn get_query_status(&self, query_id: &str) -> Result<QueryStatus, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    settings: ApiSettings,
    client: reqwest::Client,
}

impl ReqwestApiClient {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(ApiErrorKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let payload = response.json::<Value>().await.ok();
            let message = payload
                .as_ref()
                .and_then(error_message)
                .unwrap_or_else(|| status.to_string());
            return Err(ApiError::http(status.as_u16(), message, payload));
        }
        response
            .json::<Value>()
            .await
            .map_err(|err| ApiError::malformed(err.to_string()))
    }

    async fn expect_success(response: reqwest::Response) -> Result<(), ApiError> {
        let status = response.status();
        if !status.is_success() {
            let payload = response.json::<Value>().await.ok();
            let message = payload
                .as_ref()
                .and_then(error_message)
                .unwrap_or_else(|| status.to_string());
            return Err(ApiError::http(status.as_u16(), message, payload));
        }
        Ok(())
    }

    async fn get_value(&self, path: &str) -> Result<Value, ApiError> {
        let response = self
            .client
            .get(self.endpoint(path))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::read_json(response).await
    }

    async fn post_value(
        &self,
        path: &str,
        body: Value,
        timeout: Option<Duration>,
    ) -> Result<Value, ApiError> {
        let mut request = self.client.post(self.endpoint(path)).json(&body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await.map_err(map_reqwest_error)?;
        Self::read_json(response).await
    }
}

#[async_trait::async_trait]
impl ApiClient for ReqwestApiClient {
    async fn get_docs(&self) -> Result<Vec<DocumentRecord>, ApiError> {
        let payload = self.get_value("docs").await?;
        normalize::parse_document_list(&payload)
    }

    async fn create_upload(&self, filename: &str) -> Result<UploadInit, ApiError> {
        let payload = self
            .post_value("upload", json!({ "filename": filename }), None)
            .await?;
        normalize::parse_upload_init(&payload)
    }

    async fn upload_to_presigned(&self, url: &str, bytes: Vec<u8>) -> Result<(), ApiError> {
        // The presigned target is absolute and outside the gateway base URL.
        let response = self
            .client
            .put(url)
            .body(bytes)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::http(
                status.as_u16(),
                format!("File upload failed with status {}", status.as_u16()),
                None,
            ));
        }
        Ok(())
    }

    async fn trigger_processing(&self, job_id: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint(&format!("trigger/{job_id}")))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::expect_success(response).await
    }

    async fn get_status(&self, job_id: &str) -> Result<JobStatusSnapshot, ApiError> {
        let payload = self.get_value(&format!("status/{job_id}")).await?;
        Ok(normalize::parse_job_status(&payload, job_id))
    }

    async fn get_processing_chain(&self, job_id: &str) -> Result<Vec<ChainEntry>, ApiError> {
        let payload = self.get_value(&format!("processing-chain/{job_id}")).await?;
        Ok(normalize::parse_chain_entries(&payload, &now_rfc3339()))
    }

    async fn get_sentence_chain(&self, sentence_hash: &str) -> Result<SentenceChain, ApiError> {
        let payload = self
            .get_value(&format!("sentence-chain/{sentence_hash}"))
            .await?;
        Ok(normalize::parse_sentence_chain(
            &payload,
            sentence_hash,
            &now_rfc3339(),
        ))
    }

    async fn post_query(&self, question: &str) -> Result<QueryOutcome, ApiError> {
        let payload = self
            .post_value(
                "query",
                json!({ "query": question }),
                Some(self.settings.sync_query_timeout),
            )
            .await?;
        normalize::parse_query_outcome(&payload)
    }

    async fn post_query_submit(&self, question: &str) -> Result<String, ApiError> {
        let payload = self
            .post_value("query/submit", json!({ "question": question }), None)
            .await?;
        normalize::parse_query_id(&payload)
    }

    async fn get_query_status(&self, query_id: &str) -> Result<QueryStatus, ApiError> {
        let payload = self.get_value(&format!("query/status/{query_id}")).await?;
        Ok(normalize::parse_query_status(&payload))
    }
}

fn error_message(payload: &Value) -> Option<String> {
    if let Some(message) = payload.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    if let Some(message) = payload.get("error").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    payload.as_str().map(str::to_string)
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(ApiErrorKind::Timeout, err.to_string());
    }
    ApiError::new(ApiErrorKind::Network, err.to_string())
}
