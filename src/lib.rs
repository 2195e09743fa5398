//! Batch Translator - chunked batch translation client
//!
//! Splits an ordered list of texts into bounded chunks, sends each chunk to a
//! remote translation service, and reassembles a position-aligned result.
//! Chunks that fail keep their original text instead of failing the job.
//! The server half of the protocol is included under [`server`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod core;
pub mod server;
pub mod cli;

// Re-export key types for convenience
pub use crate::core::{
    channel::Channel,
    client::TranslatorClient,
    config::{FallbackMode, TranslatorConfig},
    errors::{Result, TranslationError},
    models::{BatchTranslationRequest, JobReport, LanguagePair, TranslationRequest},
    orchestrator::{plan_chunks, ChunkEvent},
    service::TranslationService,
    transport::HttpTransport,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
