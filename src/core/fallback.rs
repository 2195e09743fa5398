//! Per-chunk failure fallback

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::core::client::TranslatorClient;
use crate::core::config::FallbackMode;
use crate::core::models::{
    BatchTranslationRequest, Chunk, ChunkOutcome, ChunkResult, LanguagePair, TranslationRequest,
};
use crate::core::service::TranslationService;

/// A chunk after the fallback policy has run
#[derive(Debug, Clone)]
pub struct ResolvedChunk {
    pub chunk: Chunk,
    /// Same length as the chunk
    pub output: Vec<String>,
    pub outcome: ChunkOutcome,
    /// Items in `output` that are their untranslated input
    pub untranslated: usize,
}

/// Dispatches a chunk and absorbs its failure.
///
/// This is the only place chunk errors are caught. A failed chunk never
/// produces an error, only original text in its own positions.
#[derive(Debug, Clone, Copy)]
pub struct FallbackPolicy {
    mode: FallbackMode,
}

impl FallbackPolicy {
    pub fn new(mode: FallbackMode) -> Self {
        Self { mode }
    }

    /// Send `texts` as one batch and resolve the result
    pub async fn dispatch<S: TranslationService>(
        &self,
        client: &TranslatorClient<S>,
        chunk: Chunk,
        texts: &[String],
        pair: &LanguagePair,
    ) -> ResolvedChunk {
        debug!(
            "Dispatching chunk {} ({} items, {})",
            chunk.index,
            texts.len(),
            pair
        );

        let request = BatchTranslationRequest::new(texts.to_vec(), pair);
        let result = match client.batch_translate(&request).await {
            Ok(translations) => ChunkResult::Translated(translations),
            Err(error) => ChunkResult::Failed {
                texts: request.texts,
                error,
            },
        };

        self.resolve(client, chunk, result, pair).await
    }

    /// Turn a chunk result into output text
    pub async fn resolve<S: TranslationService>(
        &self,
        client: &TranslatorClient<S>,
        chunk: Chunk,
        result: ChunkResult,
        pair: &LanguagePair,
    ) -> ResolvedChunk {
        match result {
            ChunkResult::Translated(output) => {
                debug_assert_eq!(output.len(), chunk.len());
                ResolvedChunk {
                    chunk,
                    output,
                    outcome: ChunkOutcome::Succeeded,
                    untranslated: 0,
                }
            }
            ChunkResult::Failed { texts, error } => {
                warn!(
                    "Chunk {} (items {}..{}) failed, keeping original text: {}",
                    chunk.index, chunk.range.start, chunk.range.end, error
                );

                let (output, untranslated) = match self.mode {
                    FallbackMode::Item if !error.is_channel_closed() => {
                        Self::translate_items(client, texts, pair).await
                    }
                    _ => {
                        let untranslated = texts.len();
                        (texts, untranslated)
                    }
                };

                ResolvedChunk {
                    chunk,
                    output,
                    outcome: ChunkOutcome::FallenBack,
                    untranslated,
                }
            }
        }
    }

    /// Send each item once through the single-item call, at most
    /// `max_concurrent` at a time
    async fn translate_items<S: TranslationService>(
        client: &TranslatorClient<S>,
        texts: Vec<String>,
        pair: &LanguagePair,
    ) -> (Vec<String>, usize) {
        let width = client.config().max_concurrent.max(1);
        let calls: Vec<_> = texts
            .iter()
            .map(|text| {
                let request = TranslationRequest::with_pair(text.as_str(), pair);
                async move { client.translate_fallback(&request).await }
            })
            .collect();
        let results: Vec<_> = stream::iter(calls).buffered(width).collect().await;

        let mut untranslated = 0;
        let output = texts
            .into_iter()
            .zip(results)
            .map(|(original, result)| match result {
                Ok(translation) => translation,
                Err(e) => {
                    debug!("Keeping original text: {}", e);
                    untranslated += 1;
                    original
                }
            })
            .collect();

        (output, untranslated)
    }
}
