//! Error types for launchwire.

use thiserror::Error;

/// Main error type for all launchwire operations.
#[derive(Debug, Error)]
pub enum LaunchwireError {
    /// A message line had no `prefix:` delimiter.
    #[error("no prefix delimiter in message")]
    MissingPrefix,

    /// Text handed to the broadcast path contained an embedded NUL byte,
    /// which the wire reserves as the message terminator.
    #[error("message text contains an embedded NUL byte")]
    EmbeddedNul,

    /// A reassembled message was not valid UTF-8.
    #[error("reassembled message is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Failure surfaced by the display-connection collaborator
    /// (atom resolution, window lifecycle, event emission).
    #[error("connection error: {0}")]
    Connection(String),
}

/// Result type alias using LaunchwireError.
pub type Result<T> = std::result::Result<T, LaunchwireError>;
