//! # Error Types
//!
//! Errors raised while addressing or loading documents. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations and
//! carry the offending path or pointer so they can be reported verbatim.

use thiserror::Error;

/// Error in the core document layer.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A JSON Pointer string is not well formed.
    #[error("invalid JSON Pointer {pointer:?}: {reason}")]
    InvalidPointer {
        /// The pointer text as supplied.
        pointer: String,
        /// Why the pointer was rejected.
        reason: String,
    },

    /// A document could not be read or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// A document could not be serialized back to text.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
