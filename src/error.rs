//! Error types for rdelta

use thiserror::Error;

/// Result type alias for rdelta operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for rdelta
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors (stream reads, writes, seeks)
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid parameters or checksum-type magic
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Malformed signature or delta stream
    #[error("Format error: {message}")]
    Format { message: String },

    /// Bugs: states that are unreachable in correct code
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a wire-format error
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
        }
    }
}
