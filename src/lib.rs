//! # attachment-relay
//!
//! Relay chat turns (text plus file attachments) to a single webhook.
//!
//! Attachments are normalised before they leave the process: only PNG, JPEG
//! and PDF are accepted, PDFs are rasterised to a PNG of their first page,
//! JPEGs are re-encoded as PNG, anything over the size limit is dropped and
//! the rest is base64-encoded into one JSON payload. The webhook's answer is
//! turned back into chat text.
//!
//! ## Pipeline Overview
//!
//! ```text
//! InboundMessage
//!  │
//!  ├─ 0. Gate      reject empty turns, default the text when only files arrive
//!  ├─ 1. Input     in-memory content or read from disk
//!  ├─ 2. Validate  MIME allow-list
//!  ├─ 3. Render    PDF page 1 / JPEG → PNG (spawn_blocking)
//!  ├─ 4. Check     non-empty, ≤ 10 MiB
//!  ├─ 5. Encode    base64 → NormalizedFile
//!  ├─ 6. Dispatch  POST {session_id, text, files} to the webhook
//!  └─ 7. Render    output › message › pretty JSON › raw text
//! ```
//!
//! A bad file never sinks the turn: it is skipped with one reply line and
//! the rest of the batch is still sent.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use attachment_relay::{Attachment, InboundMessage, Relay, RelayConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RelayConfig::builder("https://hooks.example.com/chat").build()?;
//!     let relay = Relay::new(config)?;
//!     let session = relay.start_session();
//!
//!     let message = InboundMessage::new("Please check this invoice")
//!         .with_attachment(Attachment::guess_from_path("invoice.pdf"));
//!     let report = relay.handle_message(&session, message).await;
//!     for line in &report.replies {
//!         println!("{line}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `relay` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! PDF rendering needs a pdfium shared library at runtime; see
//! [`pipeline::render`] for where it is looked up.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod attachment;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod payload;
pub mod pipeline;
pub mod progress;
pub mod relay;
pub mod response;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use attachment::{Attachment, AttachmentContent, AttachmentKind, SupportedType, ALLOWED_MIME_TYPES};
pub use config::{RelayConfig, RelayConfigBuilder, DEFAULT_MAX_FILE_SIZE, DEFAULT_PLACEHOLDER_TEXT};
pub use dispatch::WebhookClient;
pub use error::{FileError, RelayError};
pub use payload::{NormalizedFile, OutboundPayload, SessionContext};
pub use pipeline::{normalize_all, normalize_attachment, NormalizeOutcome};
pub use progress::{NoopProgressCallback, ProgressCallback, TurnProgressCallback};
pub use relay::{InboundMessage, Relay, TurnReport, TurnStatus};
pub use response::{render_display, render_response};
