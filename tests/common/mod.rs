//! Shared fakes for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use batch_translator::{
    BatchTranslationRequest, Result, TranslationError, TranslationRequest, TranslationService,
    TranslatorConfig,
};

type DelayFn = dyn Fn(&BatchTranslationRequest) -> Duration + Send + Sync;

/// Call counters shared with the test after the fake moves into a client
#[derive(Debug, Default)]
pub struct Counters {
    pub batch_calls: AtomicUsize,
    pub single_calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub single_in_flight: AtomicUsize,
    pub max_single_in_flight: AtomicUsize,
    pub releases: AtomicUsize,
}

impl Counters {
    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub fn single_calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn max_single_in_flight(&self) -> usize {
        self.max_single_in_flight.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

/// Translates `x` to `t(x)`, with configurable failures and latency
pub struct FakeService {
    pub counters: Arc<Counters>,
    fail_all_batches: bool,
    fail_batch_with: Option<String>,
    truncate_batch_with: Option<String>,
    fail_single_with: Option<String>,
    delay: Option<Box<DelayFn>>,
    single_delay: Option<Duration>,
}

impl FakeService {
    pub fn new() -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            fail_all_batches: false,
            fail_batch_with: None,
            truncate_batch_with: None,
            fail_single_with: None,
            delay: None,
            single_delay: None,
        }
    }

    /// Every batch call times out
    pub fn failing_all_batches(mut self) -> Self {
        self.fail_all_batches = true;
        self
    }

    /// Batches containing `text` fail with a network error
    pub fn failing_batches_with(mut self, text: &str) -> Self {
        self.fail_batch_with = Some(text.to_string());
        self
    }

    /// Batches containing `text` come back with a single translation
    pub fn truncating_batches_with(mut self, text: &str) -> Self {
        self.truncate_batch_with = Some(text.to_string());
        self
    }

    /// Single-item calls for `text` fail
    pub fn failing_single(mut self, text: &str) -> Self {
        self.fail_single_with = Some(text.to_string());
        self
    }

    pub fn with_delay(
        mut self,
        delay: impl Fn(&BatchTranslationRequest) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.delay = Some(Box::new(delay));
        self
    }
}

impl FakeService {
    /// Every single-item call takes `delay`
    pub fn with_single_delay(mut self, delay: Duration) -> Self {
        self.single_delay = Some(delay);
        self
    }
}

pub fn translated(text: &str) -> String {
    format!("t({})", text)
}

struct InFlight<'a> {
    current: &'a AtomicUsize,
}

impl<'a> InFlight<'a> {
    fn enter(current: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = current.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self { current }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TranslationService for FakeService {
    async fn translate(&self, request: &TranslationRequest) -> Result<String> {
        self.counters.single_calls.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlight::enter(
            &self.counters.single_in_flight,
            &self.counters.max_single_in_flight,
        );

        if let Some(delay) = self.single_delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_single_with.as_deref() == Some(request.text.as_str()) {
            return Err(TranslationError::ApiError {
                status: 500,
                message: "engine failure".to_string(),
            });
        }
        Ok(translated(&request.text))
    }

    async fn batch_translate(&self, request: &BatchTranslationRequest) -> Result<Vec<String>> {
        self.counters.batch_calls.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlight::enter(&self.counters.in_flight, &self.counters.max_in_flight);

        if let Some(delay) = &self.delay {
            tokio::time::sleep(delay(request)).await;
        }

        if self.fail_all_batches {
            return Err(TranslationError::TimeoutError);
        }

        let contains = |needle: &Option<String>| {
            needle
                .as_ref()
                .map(|n| request.texts.iter().any(|t| t == n))
                .unwrap_or(false)
        };

        if contains(&self.fail_batch_with) {
            return Err(TranslationError::NetworkError {
                message: "connection reset".to_string(),
            });
        }

        let translations: Vec<String> = request.texts.iter().map(|t| translated(t)).collect();

        if contains(&self.truncate_batch_with) {
            return Ok(translations.into_iter().take(1).collect());
        }

        Ok(translations)
    }

    fn release(&self) {
        self.counters.releases.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn config(batch_size: usize, max_concurrent: usize) -> TranslatorConfig {
    TranslatorConfig {
        batch_size,
        max_concurrent,
        ..Default::default()
    }
}

pub fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// `item-0`, `item-1`, ...
pub fn numbered(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("item-{}", i)).collect()
}

/// Index encoded by [`numbered`]
pub fn index_of(text: &str) -> usize {
    text.trim_start_matches("item-").parse().unwrap_or(0)
}
