//! Translation client: single-item and batch calls over one channel

use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::core::channel::Channel;
use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{BatchTranslationRequest, JobReport, LanguagePair, TranslationRequest};
use crate::core::orchestrator::{ChunkEvent, ChunkingOrchestrator};
use crate::core::service::TranslationService;
use crate::core::transport::HttpTransport;

/// Client for a remote translation service.
///
/// Owns exactly one [`Channel`], opened at construction. Clones share the
/// channel; it is released by [`close`](Self::close) or when the last clone is
/// dropped.
pub struct TranslatorClient<S: TranslationService = HttpTransport> {
    channel: Arc<Channel<S>>,
    config: Arc<TranslatorConfig>,
    /// Bounds single-item fallback calls across all jobs on this client
    fallback_permits: Arc<Semaphore>,
}

impl<S: TranslationService> Clone for TranslatorClient<S> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel.clone(),
            config: self.config.clone(),
            fallback_permits: self.fallback_permits.clone(),
        }
    }
}

impl<S: TranslationService> fmt::Debug for TranslatorClient<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslatorClient")
            .field("endpoint", &self.channel.endpoint())
            .field("closed", &self.channel.is_closed())
            .field("config", &self.config)
            .finish()
    }
}

impl TranslatorClient<HttpTransport> {
    /// Create a client talking HTTP to `config.host:config.port`
    pub fn connect(config: TranslatorConfig) -> Result<Self> {
        config.validate()?;
        let channel = Channel::from_config(&config)?;
        Ok(Self::from_channel(channel, config))
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        Self::connect(TranslatorConfig::from_env()?)
    }
}

impl<S: TranslationService> TranslatorClient<S> {
    /// Create a client over any service implementation
    pub fn with_service(service: S, config: TranslatorConfig) -> Result<Self> {
        config.validate()?;
        let channel = Channel::new(service, config.endpoint());
        Ok(Self::from_channel(channel, config))
    }

    fn from_channel(channel: Channel<S>, config: TranslatorConfig) -> Self {
        let fallback_permits = Arc::new(Semaphore::new(config.max_concurrent));
        Self {
            channel: Arc::new(channel),
            config: Arc::new(config),
            fallback_permits,
        }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Language pair from configuration
    pub fn language_pair(&self) -> LanguagePair {
        self.config.language_pair()
    }

    pub fn is_closed(&self) -> bool {
        self.channel.is_closed()
    }

    /// Single-item call made while falling back from a failed chunk.
    ///
    /// At most `max_concurrent` of these run at once on this client, however
    /// many chunks are falling back.
    pub(crate) async fn translate_fallback(&self, request: &TranslationRequest) -> Result<String> {
        let _permit = self
            .fallback_permits
            .acquire()
            .await
            .map_err(|_| TranslationError::ChannelClosed)?;
        self.translate(request).await
    }

    /// Translate a single text.
    ///
    /// Any failure other than a closed channel is reported as
    /// [`TranslationError::TranslateFailed`] carrying the input text.
    pub async fn translate(&self, request: &TranslationRequest) -> Result<String> {
        debug!(
            "Translating single text ({} chars, {}->{})",
            request.text.len(),
            request.source_lang,
            request.target_lang
        );

        self.channel
            .translate(request)
            .await
            .map_err(|e| TranslationError::for_text(request.text.as_str(), e))
    }

    /// Translate a single text with the configured language pair
    pub async fn translate_text(&self, text: &str) -> Result<String> {
        let request = TranslationRequest::with_pair(text, &self.language_pair());
        self.translate(&request).await
    }

    /// Translate up to `batch_size` texts in one round trip.
    ///
    /// Does not re-chunk. Returns translations in input order, or
    /// `ProtocolViolation` when the service answers with a different count.
    pub async fn batch_translate(&self, request: &BatchTranslationRequest) -> Result<Vec<String>> {
        if self.channel.is_closed() {
            return Err(TranslationError::ChannelClosed);
        }

        if request.is_empty() {
            return Ok(Vec::new());
        }

        if request.len() > self.config.batch_size {
            return Err(TranslationError::BatchTooLarge {
                len: request.len(),
                max: self.config.batch_size,
            });
        }

        let translations = self.channel.batch_translate(request).await?;

        if translations.len() != request.len() {
            return Err(TranslationError::ProtocolViolation {
                expected: request.len(),
                actual: translations.len(),
            });
        }

        Ok(translations)
    }

    /// Translate an input of any length with the configured language pair.
    ///
    /// Never fails: chunks the service cannot translate keep their original
    /// text, and are listed in the report.
    pub async fn translate_all(&self, texts: &[String]) -> JobReport {
        self.translate_all_with(texts, &self.language_pair(), None)
            .await
    }

    /// Like [`translate_all`](Self::translate_all) with an explicit pair and an
    /// optional callback invoked once per resolved chunk.
    pub async fn translate_all_with(
        &self,
        texts: &[String],
        pair: &LanguagePair,
        on_chunk: Option<&(dyn Fn(&ChunkEvent) + Send + Sync)>,
    ) -> JobReport {
        ChunkingOrchestrator::new(self).run(texts, pair, on_chunk).await
    }

    /// Release the channel. Idempotent.
    pub fn close(&self) {
        self.channel.close();
    }
}
