//! Error types for the attachment-relay library.
//!
//! Two distinct error types reflect two distinct failure scopes:
//!
//! * [`FileError`] — **Per file**: one attachment could not be read,
//!   validated, converted or encoded. The file is skipped, the user sees one
//!   line about it, and the rest of the batch carries on. Collected in
//!   [`crate::pipeline::NormalizeOutcome`] and [`crate::TurnReport`].
//!
//! * [`RelayError`] — **Per turn / setup**: the message was empty, the
//!   webhook could not be reached or answered with a non-2xx status, or the
//!   configuration is invalid. Nothing here is process-fatal; a failed turn
//!   only ends that turn.

use std::borrow::Borrow;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a whole turn, or prevent the relay from being built.
#[derive(Debug, Error)]
pub enum RelayError {
    // ── Turn errors ───────────────────────────────────────────────────────
    /// Neither text nor attachments were supplied.
    #[error("Please upload a file or send a message.")]
    EmptyMessage,

    /// Transport-level failure talking to the webhook.
    #[error("request to '{url}' failed: {reason}")]
    DispatchFailed { url: String, reason: String },

    /// The configured request timeout elapsed before the webhook answered.
    #[error("request to '{url}' timed out after {secs}s")]
    DispatchTimeout { url: String, secs: u64 },

    /// The webhook answered with a non-2xx status.
    #[error("HTTP {status} from '{url}'")]
    WebhookStatus { url: String, status: u16 },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single attachment.
///
/// `Display` is the message shown to the user; [`FileError::user_message`]
/// adds the failure marker used in chat replies.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileError {
    /// The attachment pointed at a path that does not exist.
    #[error("File path '{}' does not exist.", .path.display())]
    PathNotFound { name: String, path: PathBuf },

    /// The path exists but the process may not read it.
    #[error("File path '{}' is not readable.", .path.display())]
    PathUnreadable { name: String, path: PathBuf },

    /// Reading the path failed part-way.
    #[error("Failed to read file '{name}' from path: {detail}")]
    ReadError { name: String, detail: String },

    /// MIME type outside the allow-list.
    #[error("File '{name}' type '{mime}' is not allowed.")]
    UnsupportedType { name: String, mime: String },

    /// PDF or JPEG could not be turned into a PNG.
    #[error("Failed to convert {format} to PNG for '{name}': {detail}")]
    ConversionError {
        name: String,
        format: String,
        detail: String,
    },

    /// No bytes left to send.
    #[error("File '{name}' has no content after all attempts.")]
    EmptyContent { name: String },

    /// Payload exceeds the configured size limit.
    #[error("File '{name}' exceeds the maximum allowed size of {}.", human_size(.limit))]
    TooLarge {
        name: String,
        size: usize,
        limit: usize,
    },

    /// Base64 encoding failed.
    #[error("Failed to process file '{name}': {detail}")]
    EncodingError { name: String, detail: String },
}

impl FileError {
    /// Name of the attachment this error belongs to.
    pub fn name(&self) -> &str {
        match self {
            FileError::PathNotFound { name, .. }
            | FileError::PathUnreadable { name, .. }
            | FileError::ReadError { name, .. }
            | FileError::UnsupportedType { name, .. }
            | FileError::ConversionError { name, .. }
            | FileError::EmptyContent { name }
            | FileError::TooLarge { name, .. }
            | FileError::EncodingError { name, .. } => name,
        }
    }

    /// The chat line shown for this error.
    pub fn user_message(&self) -> String {
        format!("❌ {self}")
    }
}

/// Render a byte limit the way users read it: whole MiB as `10MB`,
/// anything else in bytes.
fn human_size(bytes: impl Borrow<usize>) -> String {
    const MIB: usize = 1024 * 1024;
    let bytes = *bytes.borrow();
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{bytes} bytes")
    }
}
