//! Translation engine backed by the Google Translate web endpoint
//!
//! Uses the keyless `translate_a/single` endpoint (client `gtx`). The response
//! is a nested JSON array whose first element lists translated segments:
//!
//! ```text
//! [[["こんにちは","hello",null,null,10]],null,"en",...]
//! ```

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::core::errors::{Result, TranslationError};
use crate::core::models::TranslationRequest;
use crate::core::service::TranslationService;

/// Public endpoint of the web translator
pub const DEFAULT_BASE_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// Google Translate engine
#[derive(Debug, Clone)]
pub struct GoogleTranslateEngine {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleTranslateEngine {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    /// Point the engine at another base URL
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Concatenate the translated segments of a response body
    fn parse_response(json: &serde_json::Value) -> Result<String> {
        let segments = json
            .get(0)
            .and_then(|s| s.as_array())
            .ok_or_else(|| TranslationError::InvalidResponseError {
                message: "No translation segments in response".to_string(),
            })?;

        Ok(segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(|t| t.as_str()))
            .collect())
    }
}

#[async_trait]
impl TranslationService for GoogleTranslateEngine {
    async fn translate(&self, request: &TranslationRequest) -> Result<String> {
        if request.text.trim().is_empty() {
            return Ok(request.text.clone());
        }

        debug!(
            "Google translate {} chars ({}->{})",
            request.text.len(),
            request.source_lang,
            request.target_lang
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("client", "gtx"),
                ("sl", request.source_lang.as_str()),
                ("tl", request.target_lang.as_str()),
                ("dt", "t"),
                ("q", request.text.as_str()),
            ])
            .send()
            .await
            .map_err(TranslationError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::ApiError {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let json: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| TranslationError::InvalidResponseError {
                    message: e.to_string(),
                })?;

        Self::parse_response(&json)
    }
}
