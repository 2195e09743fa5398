//! Configuration management

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::info;

use crate::core::errors::{Result, TranslationError};
use crate::core::models::{LanguagePair, DEFAULT_SOURCE_LANG, DEFAULT_TARGET_LANG};

/// Prefix for environment overrides, e.g. `TRANSLATOR_BATCH_SIZE`
pub const ENV_PREFIX: &str = "TRANSLATOR";

/// What the fallback policy substitutes when a chunk fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    /// The whole chunk keeps its original text
    #[default]
    Chunk,
    /// Each item of a failed chunk is sent once through the single-item call
    Item,
}

impl fmt::Display for FallbackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackMode::Chunk => write!(f, "chunk"),
            FallbackMode::Item => write!(f, "item"),
        }
    }
}

/// Configuration for translator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub host: String,
    pub port: u16,
    pub batch_size: usize,
    pub source_lang: String,
    pub target_lang: String,
    pub max_concurrent: usize,
    pub timeout_ms: u64,
    pub fallback: FallbackMode,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 50051,
            batch_size: 50,
            source_lang: DEFAULT_SOURCE_LANG.to_string(),
            target_lang: DEFAULT_TARGET_LANG.to_string(),
            max_concurrent: 4,
            timeout_ms: 30000,
            fallback: FallbackMode::Chunk,
        }
    }
}

impl TranslatorConfig {
    /// Load configuration from `TRANSLATOR_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::load(None::<&Path>)
    }

    /// Load from a config file (format inferred from the extension)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TranslationError::ConfigError {
                message: format!("config file not found: {}", path.display()),
            });
        }
        Self::load(Some(path))
    }

    /// Layered load: defaults, then the optional file, then the environment
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            let path = path.as_ref();
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| {
            Err(TranslationError::ConfigError {
                message: message.to_string(),
            })
        };

        if self.host.trim().is_empty() {
            return invalid("host is required");
        }

        if self.port == 0 {
            return invalid("port must be greater than 0");
        }

        if self.batch_size == 0 {
            return invalid("batch_size must be greater than 0");
        }

        if self.max_concurrent == 0 {
            return invalid("max_concurrent must be greater than 0");
        }

        if self.source_lang.trim().is_empty() || self.target_lang.trim().is_empty() {
            return invalid("source_lang and target_lang must not be empty");
        }

        Ok(())
    }

    /// Base URL of the translation service
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Language pair used when a call does not name one
    pub fn language_pair(&self) -> LanguagePair {
        LanguagePair::new(&self.source_lang, &self.target_lang)
    }
}
