//! Error types for urlshort
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::pathmap::Format;

/// Result type alias using ShortenerError
pub type Result<T> = std::result::Result<T, ShortenerError>;

/// Unified error type for urlshort operations
#[derive(Debug, Error)]
pub enum ShortenerError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error on {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store file {} is locked by another process", .0.display())]
    Locked(PathBuf),

    // -------------------------------------------------------------------------
    // Decode Errors
    // -------------------------------------------------------------------------
    #[error("{format} decode error: {message}")]
    Decode { format: Format, message: String },

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Store error: {0}")]
    Store(String),

    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse error classes, as seen by callers deciding how to react
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Opening, reading or writing a file failed
    Io,
    /// A path map buffer was malformed
    Decode,
    /// A bucket or transaction operation failed
    Store,
    /// Settings were rejected before anything was opened
    Config,
}

impl ShortenerError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) | Self::File { .. } | Self::Locked(_) => ErrorKind::Io,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Store(_)
            | Self::BucketNotFound(_)
            | Self::Serialization(_) => ErrorKind::Store,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}

impl From<bincode::Error> for ShortenerError {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
