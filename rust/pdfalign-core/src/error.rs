//! Error types
//!
//! "Not found" is never an error in this crate: matchers return
//! [`MatchOutcome::NotFound`](crate::matcher::MatchOutcome) and the pipeline
//! degrades to a placeholder rect. The types here cover genuine failures only.

use thiserror::Error;

/// Embedding subsystem failures. Only callers of the semantic matcher see these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Embedding model unavailable: {0}")]
    Unavailable(String),

    #[error("Model load failed: {0}")]
    LoadFailed(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    #[error("Shape error: {0}")]
    Shape(String),

    #[error("Embedding call cancelled")]
    Cancelled,
}

/// Anchor resolution failures that are not "quote not found"
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnchorError {
    #[error("No document registered for language '{0}'")]
    UnknownLanguage(String),

    #[error("Malformed text layer on page {page}: {reason}")]
    MalformedTextLayer { page: u32, reason: String },

    #[error("Bounding box requested for an empty token set")]
    EmptyTokenSet,

    #[error(transparent)]
    Embedding(#[from] ModelError),
}

/// Alignment dataset parse failures (reported per line, then skipped)
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Line {line}: invalid JSON: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Line {line}: invalid page '{page}'")]
    InvalidPage { line: usize, page: String },

    #[error("Invalid alignment type '{0}' (expected \"m-n\")")]
    InvalidAlignmentType(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
