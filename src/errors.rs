/*!
 * Error types for the subtrans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The provider did not answer within its timeout
    #[error("{provider} request timed out after {timeout_secs}s")]
    Timeout {
        /// Display name of the provider
        provider: String,
        /// Timeout that elapsed, in seconds
        timeout_secs: u64,
    },
}

impl ProviderError {
    /// Whether this error is the timeout kind
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Classify a transport error from reqwest
    pub fn from_transport(provider: &str, timeout_secs: u64, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                provider: provider.to_string(),
                timeout_secs,
            }
        } else if error.is_connect() {
            Self::ConnectionError(format!("{}: {}", provider, error))
        } else {
            Self::RequestFailed(format!("{}: {}", provider, error))
        }
    }

    /// Classify a non-success HTTP status
    pub fn from_status(provider: &str, status_code: u16, body: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(format!("{} rejected credentials: {}", provider, body)),
            429 => Self::RateLimitExceeded(format!("{}: {}", provider, body)),
            _ => Self::ApiError {
                status_code,
                message: format!("{}: {}", provider, body),
            },
        }
    }
}

/// Errors that can occur during subtitle processing
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SubtitleError {
    /// The document could not be decoded at all
    #[error("Invalid SRT file: {0}")]
    Malformed(String),

    /// The document parsed but contained no entries
    #[error("SRT file contains no subtitle entries")]
    Empty,
}

/// Errors raised while validating an inbound translation request
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RequestError {
    /// No file part was submitted
    #[error("Missing file")]
    MissingFile,

    /// No translation service was selected
    #[error("Missing translation service")]
    MissingProvider,

    /// The translation service is not one of the known identifiers
    #[error("Unsupported translation service: {0}")]
    UnknownProvider(String),

    /// No target language was given
    #[error("Missing target language")]
    MissingTargetLanguage,

    /// The file name does not end in .srt
    #[error("Only .srt files are supported (got '{0}')")]
    UnsupportedExtension(String),

    /// The uploaded file exceeds the configured limit
    #[error("File too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge {
        /// Size of the upload
        size: usize,
        /// Configured maximum
        limit: usize,
    },

    /// The multipart body itself could not be read
    #[error("Malformed request: {0}")]
    MalformedRequest(String),
}

/// Errors that end a translation job early
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The job was cancelled before all batches were scheduled
    #[error("Translation cancelled after {completed} of {total} entries")]
    Cancelled {
        /// Entries translated before cancellation
        completed: usize,
        /// Entries in the job
        total: usize,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from request validation
    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Whether the error was caused by the caller's input rather than by the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Subtitle(_))
    }
}
