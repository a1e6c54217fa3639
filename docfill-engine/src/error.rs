//! Error types for docfill

use thiserror::Error;

/// docfill error types
#[derive(Debug, Error)]
pub enum MergeError {
    /// Template could not be located in any searched directory.
    #[error("Template not found: {name}")]
    TemplateNotFound {
        /// Template name or path as supplied by the caller.
        name: String,
    },
    /// Template extension is not one the pipeline knows how to process.
    #[error("Unsupported template type: {0}")]
    UnsupportedTemplate(String),
    /// Template file exceeds the configured size cap.
    #[error("Template too large: {size} bytes (limit {limit})")]
    TemplateTooLarge {
        /// Template file size in bytes.
        size: u64,
        /// Configured cap in bytes.
        limit: u64,
    },
    /// Field path could not be parsed as `name` or `name[index]`.
    #[error("Invalid field path: {0}")]
    InvalidFieldPath(String),
    /// Incoming wire message exceeds the framing size cap.
    #[error("Message too large: {size} bytes")]
    MessageTooLarge {
        /// Declared body length from the frame header.
        size: usize,
    },
    /// Wire message ended before the declared length was read.
    #[error("Truncated message")]
    TruncatedMessage,
    /// No renderer is available for a reserved asset token.
    #[error("Asset renderer unavailable: {0}")]
    RenderUnavailable(String),
    /// Renderer reported a failure for a specific value.
    #[error("Asset render failed: {0}")]
    RenderFailed(String),
    /// I/O operation failed while reading or writing data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Internal invariant was violated.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, MergeError>;
