//! Ingestion Errors
//!
//! Every structural problem found while loading is reported as a distinct
//! [`LoadError`] variant. Query-time operations never fail; they signal
//! unknown words with `None` or an empty result instead.

use std::fmt;
use thiserror::Error;

/// Failure status reported by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportStatus {
    /// Numeric status code, when the transport has one (e.g. HTTP)
    pub code: Option<u16>,
    /// Human-readable reason
    pub reason: String,
}

impl TransportStatus {
    pub fn new(code: Option<u16>, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Status with a code, e.g. `404 Not Found`
    pub fn with_code(code: u16, reason: impl Into<String>) -> Self {
        Self::new(Some(code), reason)
    }
}

impl From<std::io::Error> for TransportStatus {
    fn from(err: std::io::Error) -> Self {
        Self::new(None, err.to_string())
    }
}

impl fmt::Display for TransportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} {}", code, self.reason),
            None => write!(f, "{}", self.reason),
        }
    }
}

/// Errors raised while building an embedding table
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("failed to fetch {source_id} ({status})")]
    Transport {
        source_id: String,
        status: TransportStatus,
    },

    #[error("{source_id} returned {content_type} instead of binary vector data; check that the vector parts are deployed")]
    UnexpectedContentType {
        source_id: String,
        content_type: String,
    },

    #[error("vector data is not float32-aligned ({total_bytes} bytes total)")]
    Alignment { total_bytes: u64 },

    #[error("vector length mismatch (expected {expected}, got {actual})")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("invalid vocabulary in {source_id}: {reason}")]
    InvalidVocabulary { source_id: String, reason: String },
}

/// A specialized `Result` type for loading.
pub type Result<T> = std::result::Result<T, LoadError>;
