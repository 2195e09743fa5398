//! HTTP/JSON transport for the translation protocol

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{
    BatchTranslationRequest, BatchTranslationResponse, ErrorResponse, TranslationRequest,
    TranslationResponse,
};
use crate::core::service::TranslationService;

/// Path of the single-item operation
pub const TRANSLATE_PATH: &str = "/v1/translate";

/// Path of the batch operation
pub const BATCH_TRANSLATE_PATH: &str = "/v1/batch_translate";

/// Talks to a translation service over HTTP.
///
/// Building the transport does no network I/O; connection failures surface on
/// the first request. The underlying client is pooled and cheap to share.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Create a transport for `endpoint` (e.g. `http://localhost:50051`)
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &TranslatorConfig) -> Result<Self> {
        Self::new(config.endpoint(), Duration::from_millis(config.timeout_ms))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// One request/response round trip
    async fn call<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.endpoint, path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(TranslationError::from_transport)?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(TranslationError::from_transport)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            return Err(TranslationError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| TranslationError::InvalidResponseError {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl TranslationService for HttpTransport {
    async fn translate(&self, request: &TranslationRequest) -> Result<String> {
        let response: TranslationResponse = self.call(TRANSLATE_PATH, request).await?;
        response
            .translated_text
            .ok_or_else(|| TranslationError::InvalidResponseError {
                message: "missing translated_text".to_string(),
            })
    }

    async fn batch_translate(&self, request: &BatchTranslationRequest) -> Result<Vec<String>> {
        let response: BatchTranslationResponse = self.call(BATCH_TRANSLATE_PATH, request).await?;
        response
            .translated_texts
            .ok_or_else(|| TranslationError::InvalidResponseError {
                message: "missing translated_texts".to_string(),
            })
    }

    fn release(&self) {
        debug!("Releasing HTTP transport to {}", self.endpoint);
    }
}
