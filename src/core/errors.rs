//! Custom error types for translation operations

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Operation attempted after the channel was released
    #[error("Channel closed")]
    ChannelClosed,

    /// Single-item translation failed; carries the text that was being translated
    #[error("Failed to translate {text:?}: {source}")]
    TranslateFailed {
        text: String,
        #[source]
        source: Box<TranslationError>,
    },

    /// Response shape does not match the request
    #[error("Protocol violation: expected {expected} translations, got {actual}")]
    ProtocolViolation {
        expected: usize,
        actual: usize,
    },

    /// Batch larger than the configured chunk size
    #[error("Batch of {len} texts exceeds the maximum batch size of {max}")]
    BatchTooLarge {
        len: usize,
        max: usize,
    },

    /// Remote service answered with an error status
    #[error("API error: {status} - {message}")]
    ApiError {
        status: u16,
        message: String,
    },

    /// Network error
    #[error("Network error: {message}")]
    NetworkError {
        message: String,
    },

    /// Invalid response from the remote service
    #[error("Invalid response: {message}")]
    InvalidResponseError {
        message: String,
    },

    /// Request timeout
    #[error("Request timeout")]
    TimeoutError,

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl TranslationError {
    /// Wrap a failure of a single-item call together with its input text.
    ///
    /// `ChannelClosed` is passed through untouched: it describes the client,
    /// not the text.
    pub fn for_text(text: impl Into<String>, cause: TranslationError) -> Self {
        match cause {
            TranslationError::ChannelClosed => cause,
            cause => TranslationError::TranslateFailed {
                text: text.into(),
                source: Box::new(cause),
            },
        }
    }

    /// Whether this error was caused by using a released channel
    pub fn is_channel_closed(&self) -> bool {
        matches!(self, TranslationError::ChannelClosed)
    }

    /// Map a reqwest failure to the transport taxonomy
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TranslationError::TimeoutError
        } else {
            TranslationError::NetworkError {
                message: err.to_string(),
            }
        }
    }
}

impl From<config::ConfigError> for TranslationError {
    fn from(err: config::ConfigError) -> Self {
        TranslationError::ConfigError {
            message: err.to_string(),
        }
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
