//! Configuration for the attachment relay.
//!
//! Everything a [`crate::Relay`] needs is held in one [`RelayConfig`], built
//! through [`RelayConfigBuilder`]. The webhook URL is the only required
//! value; every other knob has a default matching the behaviour users expect
//! from the chat front-end (10 MiB limit, fixed placeholder text, no timeout).

use crate::error::RelayError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Default per-file size limit: 10 MiB.
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Text sent when the user attaches files but types nothing.
pub const DEFAULT_PLACEHOLDER_TEXT: &str = "File uploaded for processing";

/// Message shown when a session starts.
pub const DEFAULT_GREETING: &str = "## 👋 Welcome!\n\
> 📁 Drop files here or use the attachment button (PNG, JPEG or PDF, up to 10MB).\n\n\
How can I help you today?\n";

/// Configuration for relaying chat turns to a webhook.
///
/// # Example
/// ```rust
/// use attachment_relay::RelayConfig;
///
/// let config = RelayConfig::builder("https://hooks.example.com/chat")
///     .max_file_size(5 * 1024 * 1024)
///     .request_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_file_size, 5 * 1024 * 1024);
/// ```
#[derive(Clone)]
pub struct RelayConfig {
    /// Webhook endpoint receiving one POST per turn.
    pub webhook_url: String,

    /// Largest accepted attachment, measured after conversion. Default: 10 MiB.
    pub max_file_size: usize,

    /// Text substituted when files arrive without any text.
    pub placeholder_text: String,

    /// Welcome message for new sessions.
    pub greeting: String,

    /// Longest edge, in pixels, of a rendered PDF page. Default: 2000.
    ///
    /// A4 at 2000 px is roughly 240 DPI, sharp enough for downstream OCR
    /// while keeping the PNG comfortably below the size limit.
    pub pdf_max_pixels: u32,

    /// Webhook request timeout. Default: none.
    pub request_timeout_secs: Option<u64>,

    /// Explicit pdfium library file or directory. Default: auto-locate.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Optional per-turn event sink.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("webhook_url", &self.webhook_url)
            .field("max_file_size", &self.max_file_size)
            .field("placeholder_text", &self.placeholder_text)
            .field("pdf_max_pixels", &self.pdf_max_pixels)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn TurnProgressCallback>"),
            )
            .finish()
    }
}

impl RelayConfig {
    /// Create a new builder targeting `webhook_url`.
    pub fn builder(webhook_url: impl Into<String>) -> RelayConfigBuilder {
        RelayConfigBuilder {
            config: Self {
                webhook_url: webhook_url.into(),
                max_file_size: DEFAULT_MAX_FILE_SIZE,
                placeholder_text: DEFAULT_PLACEHOLDER_TEXT.to_string(),
                greeting: DEFAULT_GREETING.to_string(),
                pdf_max_pixels: 2000,
                request_timeout_secs: None,
                pdfium_lib_path: None,
                progress_callback: None,
            },
        }
    }
}

/// Builder for [`RelayConfig`].
#[derive(Debug)]
pub struct RelayConfigBuilder {
    config: RelayConfig,
}

impl RelayConfigBuilder {
    pub fn max_file_size(mut self, bytes: usize) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    pub fn placeholder_text(mut self, text: impl Into<String>) -> Self {
        self.config.placeholder_text = text.into();
        self
    }

    pub fn greeting(mut self, text: impl Into<String>) -> Self {
        self.config.greeting = text.into();
        self
    }

    pub fn pdf_max_pixels(mut self, px: u32) -> Self {
        self.config.pdf_max_pixels = px.max(100);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RelayConfig, RelayError> {
        let c = &self.config;

        let url = reqwest::Url::parse(c.webhook_url.trim()).map_err(|e| {
            RelayError::InvalidConfig(format!("webhook URL '{}' is invalid: {e}", c.webhook_url))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(RelayError::InvalidConfig(format!(
                "webhook URL must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if c.max_file_size == 0 {
            return Err(RelayError::InvalidConfig(
                "max file size must be ≥ 1 byte".into(),
            ));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(RelayError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        if c.placeholder_text.trim().is_empty() {
            return Err(RelayError::InvalidConfig(
                "placeholder text must not be blank".into(),
            ));
        }

        let mut config = self.config;
        config.webhook_url = url.to_string();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = RelayConfig::builder("https://hooks.example.com/chat")
            .build()
            .unwrap();
        assert_eq!(c.max_file_size, 10 * 1024 * 1024);
        assert_eq!(c.placeholder_text, "File uploaded for processing");
        assert_eq!(c.pdf_max_pixels, 2000);
        assert!(c.request_timeout_secs.is_none());
        assert!(c.progress_callback.is_none());
    }

    #[test]
    fn rejects_empty_url() {
        let err = RelayConfig::builder("").build().unwrap_err();
        assert!(matches!(err, RelayError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = RelayConfig::builder("ftp://files.example.com/drop")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("ftp"), "got: {err}");
    }

    #[test]
    fn rejects_zero_size_limit() {
        let err = RelayConfig::builder("http://localhost:5678/webhook")
            .max_file_size(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, RelayError::InvalidConfig(_)));
    }

    #[test]
    fn pdf_pixels_clamped() {
        let c = RelayConfig::builder("http://localhost:5678/webhook")
            .pdf_max_pixels(10)
            .build()
            .unwrap();
        assert_eq!(c.pdf_max_pixels, 100);
    }

    #[test]
    fn debug_hides_callback() {
        let c = RelayConfig::builder("http://localhost:5678/webhook")
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("webhook_url"));
    }
}
