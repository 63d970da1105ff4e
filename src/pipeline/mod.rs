//! Attachment normalisation stages.
//!
//! Each submodule implements exactly one transformation step, so each can
//! be tested on its own and the conversion backend can change without
//! touching validation.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ (allow-list) ──▶ render ──▶ (presence, size) ──▶ encode
//! (bytes/path)              (pdfium,                         (base64)
//!                            image)
//! ```
//!
//! 1. [`input`]     — resolve in-memory content or read the file from disk
//! 2. [`render`]    — PDF page 1 or JPEG → PNG, on the blocking pool
//! 3. [`encode`]    — PNG encoding and base64 wrapping
//! 4. [`normalize`] — drives the steps per file and folds a whole batch
//!    into accepted files plus per-file errors

pub mod encode;
pub mod input;
pub mod normalize;
pub mod render;

pub use normalize::{normalize_all, normalize_attachment, png_file_name, NormalizeOutcome};
