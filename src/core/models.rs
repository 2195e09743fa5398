//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::time::Duration;

use crate::core::errors::TranslationError;

/// Default source language
pub const DEFAULT_SOURCE_LANG: &str = "en";

/// Default target language
pub const DEFAULT_TARGET_LANG: &str = "ja";

/// Source/target language pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source_lang: String,
    pub target_lang: String,
}

impl LanguagePair {
    pub fn new(source_lang: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
        }
    }
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_LANG, DEFAULT_TARGET_LANG)
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.source_lang, self.target_lang)
    }
}

/// Single-item translation request, as sent on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

impl TranslationRequest {
    /// Request with the default `en` -> `ja` pair
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_pair(text, &LanguagePair::default())
    }

    pub fn with_pair(text: impl Into<String>, pair: &LanguagePair) -> Self {
        Self {
            text: text.into(),
            source_lang: pair.source_lang.clone(),
            target_lang: pair.target_lang.clone(),
        }
    }

    pub fn with_source_lang(mut self, source_lang: impl Into<String>) -> Self {
        self.source_lang = source_lang.into();
        self
    }

    pub fn with_target_lang(mut self, target_lang: impl Into<String>) -> Self {
        self.target_lang = target_lang.into();
        self
    }
}

/// Single-item translation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResponse {
    /// Optional so that a missing field is reported as a malformed response
    #[serde(default)]
    pub translated_text: Option<String>,
}

/// Batch translation request, as sent on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTranslationRequest {
    pub texts: Vec<String>,
    pub source_lang: String,
    pub target_lang: String,
}

impl BatchTranslationRequest {
    pub fn new(texts: Vec<String>, pair: &LanguagePair) -> Self {
        Self {
            texts,
            source_lang: pair.source_lang.clone(),
            target_lang: pair.target_lang.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Batch translation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchTranslationResponse {
    #[serde(default)]
    pub translated_texts: Option<Vec<String>>,
}

/// Error body returned by the service with a non-2xx status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// A contiguous slice of the job input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position of this chunk within the job
    pub index: usize,
    /// Input indices covered by this chunk
    pub range: Range<usize>,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Outcome of dispatching one chunk
#[derive(Debug)]
pub enum ChunkResult {
    Translated(Vec<String>),
    Failed {
        texts: Vec<String>,
        error: TranslationError,
    },
}

/// How a chunk was finally resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    Succeeded,
    FallenBack,
}

impl fmt::Display for ChunkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkOutcome::Succeeded => write!(f, "succeeded"),
            ChunkOutcome::FallenBack => write!(f, "fallen back"),
        }
    }
}

/// Per-job lifecycle, logged as the job advances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    Chunking,
    Dispatching,
    Assembling,
    Completed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Created => "created",
            JobState::Chunking => "chunking",
            JobState::Dispatching => "dispatching",
            JobState::Assembling => "assembling",
            JobState::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Result of a whole translation job
#[derive(Debug, Clone)]
pub struct JobReport {
    /// Position-aligned with the job input
    pub translations: Vec<String>,
    pub chunk_count: usize,
    /// Indices of chunks that fell back, ascending
    pub degraded_chunks: Vec<usize>,
    /// Items whose output is their untranslated input
    pub untranslated_items: usize,
    pub elapsed: Duration,
}

impl JobReport {
    /// Whether every chunk was translated by the remote service
    pub fn is_complete(&self) -> bool {
        self.degraded_chunks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = TranslationRequest::new("hello");
        assert_eq!(request.source_lang, "en");
        assert_eq!(request.target_lang, "ja");

        let request = request.with_source_lang("fr").with_target_lang("de");
        assert_eq!(request.source_lang, "fr");
        assert_eq!(request.target_lang, "de");
    }

    #[test]
    fn test_wire_format() {
        let request = BatchTranslationRequest::new(
            vec!["a".to_string(), "b".to_string()],
            &LanguagePair::default(),
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"texts": ["a", "b"], "source_lang": "en", "target_lang": "ja"})
        );

        let response: TranslationResponse = serde_json::from_str("{}").unwrap();
        assert!(response.translated_text.is_none());
    }
}
