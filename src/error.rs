use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the llm-read library.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// IO error with context about the file path.
    #[error("IO error accessing '{path}': {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Detailed error message
        message: String,
    },

    /// Invalid exclusion glob.
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The invalid pattern
        pattern: String,
        /// Reason why it's invalid
        reason: String,
    },

    /// The endpoint answered with a non-success status or could not be reached.
    #[error("HTTP request failed{}: {message}", status_suffix(.status))]
    Http {
        /// Status code, absent for transport failures
        status: Option<u16>,
        /// Response body or transport error message
        message: String,
    },

    /// The response body did not carry the expected answer field.
    #[error("Malformed response: missing '{field}'")]
    MalformedResponse {
        /// JSON path of the missing field
        field: String,
    },

    /// JSON serialization error.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message
        message: String,
    },

    /// The tokenizer could not be initialized.
    #[error("Tokenizer error: {message}")]
    Tokenizer {
        /// Error message
        message: String,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map_or_else(String::new, |code| format!(" with status {code}"))
}

impl Error {
    /// Creates an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid pattern error.
    #[must_use]
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Creates an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Creates a malformed response error.
    #[must_use]
    pub fn malformed(field: impl Into<String>) -> Self {
        Self::MalformedResponse {
            field: field.into(),
        }
    }

    /// Returns true if this is an IO error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::InvalidPattern { .. })
    }

    /// Returns true if this is an HTTP error.
    #[must_use]
    pub const fn is_http(&self) -> bool {
        matches!(self, Self::Http { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization {
            message: e.to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}
