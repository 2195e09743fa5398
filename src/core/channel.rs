//! Long-lived handle to the remote translation service

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, info};

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{BatchTranslationRequest, TranslationRequest};
use crate::core::service::TranslationService;
use crate::core::transport::HttpTransport;

/// Default request timeout for [`Channel::connect`]
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Owns the service handle between `connect` and `close`.
///
/// Calls may run concurrently from any number of tasks. `close` is idempotent
/// and releases the service exactly once; calls already in flight finish on
/// their own reference, every later call fails with `ChannelClosed`. Dropping
/// the channel closes it.
#[derive(Debug)]
pub struct Channel<S: TranslationService> {
    service: RwLock<Option<Arc<S>>>,
    endpoint: String,
}

impl Channel<HttpTransport> {
    /// Open a lazy HTTP channel to `host:port`. No connection is made here.
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let endpoint = format!("http://{}:{}", host, port);
        let transport = HttpTransport::new(endpoint.clone(), DEFAULT_TIMEOUT)?;
        Ok(Self::new(transport, endpoint))
    }

    pub fn from_config(config: &TranslatorConfig) -> Result<Self> {
        Ok(Self::new(HttpTransport::from_config(config)?, config.endpoint()))
    }
}

impl<S: TranslationService> Channel<S> {
    /// Wrap an already constructed service
    pub fn new(service: S, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        debug!("Opened channel to {}", endpoint);
        Self {
            service: RwLock::new(Some(Arc::new(service))),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_closed(&self) -> bool {
        self.service
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn acquire(&self) -> Result<Arc<S>> {
        self.service
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(TranslationError::ChannelClosed)
    }

    /// `Translate` round trip
    pub async fn translate(&self, request: &TranslationRequest) -> Result<String> {
        let service = self.acquire()?;
        service.translate(request).await
    }

    /// `BatchTranslate` round trip
    pub async fn batch_translate(&self, request: &BatchTranslationRequest) -> Result<Vec<String>> {
        let service = self.acquire()?;
        service.batch_translate(request).await
    }

    /// Release the service. Safe to call any number of times.
    pub fn close(&self) {
        let released = self
            .service
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(service) = released {
            service.release();
            info!("Closed channel to {}", self.endpoint);
        }
    }
}

impl<S: TranslationService> Drop for Channel<S> {
    fn drop(&mut self) {
        self.close();
    }
}
