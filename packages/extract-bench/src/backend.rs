//! The benchmark service contract and its HTTP implementation.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{BenchError, Result, GENERIC_EXTRACTION_FAILURE};
use crate::request::ExtractRequest;
use crate::types::{ExtractionReport, Strategy, StrategyPromptDetail, StrategyResult};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Operations offered by the benchmark service.
#[async_trait]
pub trait BenchBackend: Send + Sync {
    /// `GET /strategies`
    async fn list_strategies(&self) -> Result<Vec<Strategy>>;

    /// `GET /strategy/{id}/prompt`
    async fn strategy_prompt(&self, strategy_id: &str) -> Result<StrategyPromptDetail>;

    /// `POST /extract`. Runs every strategy against the document.
    async fn extract(&self, request: &ExtractRequest) -> Result<ExtractionReport>;

    /// `POST /extract-single`. Runs one strategy; the request's concurrency
    /// and fields are not sent.
    async fn extract_single(
        &self,
        request: &ExtractRequest,
        strategy_id: &str,
    ) -> Result<StrategyResult>;

    /// `GET /health`. Returns the reported status string.
    async fn health(&self) -> Result<String>;
}

/// Error payload shape returned by the service on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    status: String,
}

/// Pull a human-readable message out of an error response body.
///
/// Falls back to a generic message when the body is not JSON or carries no
/// string `detail`/`message` field.
pub fn error_message_from_body(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| match b.detail {
            Some(Value::String(detail)) if !detail.is_empty() => Some(detail),
            _ => b.message.filter(|m| !m.is_empty()),
        })
        .unwrap_or_else(|| GENERIC_EXTRACTION_FAILURE.to_string())
}

/// HTTP client for the benchmark service.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl Default for HttpBackend {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Use a preconfigured `reqwest::Client` (proxies, TLS settings).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_json<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BenchError::Api {
                status: status.as_u16(),
                message: error_message_from_body(&body),
            });
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| BenchError::Parse(format!("Failed to decode response: {}", e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self.client.get(self.url(path)).send().await?;
        self.read_json(resp).await
    }
}

#[async_trait]
impl BenchBackend for HttpBackend {
    async fn list_strategies(&self) -> Result<Vec<Strategy>> {
        self.get_json("/strategies").await
    }

    async fn strategy_prompt(&self, strategy_id: &str) -> Result<StrategyPromptDetail> {
        self.get_json(&format!("/strategy/{}/prompt", strategy_id))
            .await
    }

    async fn extract(&self, request: &ExtractRequest) -> Result<ExtractionReport> {
        debug!(
            file = %request.file.file_name,
            bytes = request.file.size(),
            provider = %request.provider,
            has_schema = request.fields.schema.is_some(),
            has_ground_truth = request.fields.ground_truth.is_some(),
            "Posting extraction request"
        );

        let form = request.to_multipart()?;
        let resp = self
            .client
            .post(self.url("/extract"))
            .multipart(form)
            .send()
            .await?;
        self.read_json(resp).await
    }

    async fn extract_single(
        &self,
        request: &ExtractRequest,
        strategy_id: &str,
    ) -> Result<StrategyResult> {
        debug!(
            file = %request.file.file_name,
            strategy_id,
            provider = %request.provider,
            "Posting single-strategy request"
        );

        let resp = self
            .client
            .post(self.url("/extract-single"))
            .multipart(request.to_single_multipart(strategy_id))
            .send()
            .await?;
        self.read_json(resp).await
    }

    async fn health(&self) -> Result<String> {
        let body: HealthBody = self.get_json("/health").await?;
        Ok(body.status)
    }
}
