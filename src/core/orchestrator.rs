//! Splits a job into chunks, dispatches them, and reassembles the output

use futures::stream::{self, StreamExt};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::core::client::TranslatorClient;
use crate::core::fallback::{FallbackPolicy, ResolvedChunk};
use crate::core::models::{Chunk, ChunkOutcome, JobReport, JobState, LanguagePair};
use crate::core::service::TranslationService;

/// Progress notification, one per resolved chunk
#[derive(Debug, Clone)]
pub struct ChunkEvent {
    pub chunk_index: usize,
    pub chunk_count: usize,
    /// Number of input items in this chunk
    pub items: usize,
    pub outcome: ChunkOutcome,
}

/// Partition `len` items into chunks of at most `batch_size`.
///
/// Chunk `k` covers `[k * batch_size, min((k + 1) * batch_size, len))`.
pub fn plan_chunks(len: usize, batch_size: usize) -> Vec<Chunk> {
    let batch_size = batch_size.max(1);
    (0..len)
        .step_by(batch_size)
        .enumerate()
        .map(|(index, start)| Chunk {
            index,
            range: start..(start + batch_size).min(len),
        })
        .collect()
}

/// Runs one translation job against a client
pub struct ChunkingOrchestrator<'a, S: TranslationService> {
    client: &'a TranslatorClient<S>,
    policy: FallbackPolicy,
    batch_size: usize,
    max_concurrent: usize,
}

impl<'a, S: TranslationService> ChunkingOrchestrator<'a, S> {
    pub fn new(client: &'a TranslatorClient<S>) -> Self {
        let config = client.config();
        Self {
            client,
            policy: FallbackPolicy::new(config.fallback),
            batch_size: config.batch_size,
            max_concurrent: config.max_concurrent,
        }
    }

    /// Translate `texts`, always returning one output per input.
    ///
    /// Up to `max_concurrent` chunks are in flight at once. Each resolved
    /// chunk is written to its own pre-sized slot, so the output order never
    /// depends on completion order. Dropping the returned future abandons the
    /// chunks still in flight.
    pub async fn run(
        &self,
        texts: &[String],
        pair: &LanguagePair,
        on_chunk: Option<&(dyn Fn(&ChunkEvent) + Send + Sync)>,
    ) -> JobReport {
        let started = Instant::now();
        self.transition(JobState::Created, texts.len());

        self.transition(JobState::Chunking, texts.len());
        let chunks = plan_chunks(texts.len(), self.batch_size);
        let chunk_count = chunks.len();
        let width = self.max_concurrent.clamp(1, chunk_count.max(1));

        self.transition(JobState::Dispatching, texts.len());
        let mut slots: Vec<Option<ResolvedChunk>> = vec![None; chunk_count];

        let policy = &self.policy;
        let client = self.client;
        let dispatches: Vec<_> = chunks
            .iter()
            .cloned()
            .map(|chunk| {
                let input = &texts[chunk.range.clone()];
                policy.dispatch(client, chunk, input, pair)
            })
            .collect();
        let mut in_flight = stream::iter(dispatches).buffer_unordered(width);

        while let Some(resolved) = in_flight.next().await {
            if let Some(callback) = on_chunk {
                callback(&ChunkEvent {
                    chunk_index: resolved.chunk.index,
                    chunk_count,
                    items: resolved.chunk.len(),
                    outcome: resolved.outcome,
                });
            }
            let index = resolved.chunk.index;
            slots[index] = Some(resolved);
        }

        self.transition(JobState::Assembling, texts.len());
        let mut translations = Vec::with_capacity(texts.len());
        let mut degraded_chunks = Vec::new();
        let mut untranslated_items = 0;

        for (chunk, slot) in chunks.iter().zip(slots) {
            match slot {
                Some(resolved) => {
                    if resolved.outcome == ChunkOutcome::FallenBack {
                        degraded_chunks.push(chunk.index);
                    }
                    untranslated_items += resolved.untranslated;
                    translations.extend(resolved.output);
                }
                None => {
                    // every dispatched chunk resolves; keep the length invariant regardless
                    degraded_chunks.push(chunk.index);
                    untranslated_items += chunk.len();
                    translations.extend_from_slice(&texts[chunk.range.clone()]);
                }
            }
        }

        let report = JobReport {
            translations,
            chunk_count,
            degraded_chunks,
            untranslated_items,
            elapsed: started.elapsed(),
        };
        self.transition(JobState::Completed, texts.len());

        if report.is_complete() {
            info!(
                "Translated {} texts in {} chunks ({:?})",
                texts.len(),
                chunk_count,
                report.elapsed
            );
        } else {
            warn!(
                "Translated {} texts in {} chunks, {} chunks degraded ({} texts untranslated)",
                texts.len(),
                chunk_count,
                report.degraded_chunks.len(),
                report.untranslated_items
            );
        }

        report
    }

    fn transition(&self, state: JobState, items: usize) {
        debug!("Job {} ({} items)", state, items);
    }
}
