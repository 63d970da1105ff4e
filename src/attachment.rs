//! Inbound attachment model.
//!
//! Chat hosts hand over files and images as different element types, some
//! with their bytes in memory and some only as a path on disk. All of them
//! collapse into one [`Attachment`] shape; the element kind is kept for
//! logging but never changes how a file is processed.

use std::path::{Path, PathBuf};

/// MIME types the pipeline accepts.
pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/png", "image/jpeg", "application/pdf"];

/// Which kind of element the host delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachmentKind {
    #[default]
    File,
    Image,
}

/// Where an attachment's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentContent {
    /// Binary content already in memory.
    Bytes(Vec<u8>),
    /// Textual content; sent as its UTF-8 bytes.
    Text(String),
    /// Content lives on disk and must be read first.
    Path(PathBuf),
    /// The host supplied neither content nor a path.
    Absent,
}

/// One file or image submitted alongside a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub mime: String,
    pub kind: AttachmentKind,
    pub content: AttachmentContent,
}

impl Attachment {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, content: AttachmentContent) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            kind: AttachmentKind::File,
            content,
        }
    }

    pub fn from_bytes(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(name, mime, AttachmentContent::Bytes(bytes))
    }

    pub fn from_text(name: impl Into<String>, mime: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name, mime, AttachmentContent::Text(text.into()))
    }

    pub fn from_path(name: impl Into<String>, mime: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::new(name, mime, AttachmentContent::Path(path.into()))
    }

    /// Build a path attachment, deriving the name from the file name and the
    /// MIME type from the extension.
    pub fn guess_from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime = mime_for_name(&name);
        let kind = if mime.starts_with("image/") {
            AttachmentKind::Image
        } else {
            AttachmentKind::File
        };
        Self::from_path(name, mime, path).with_kind(kind)
    }

    pub fn with_kind(mut self, kind: AttachmentKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Best-effort MIME type from a file name's extension.
pub fn mime_for_name(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// An allow-listed attachment format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedType {
    Png,
    Jpeg,
    Pdf,
}

impl SupportedType {
    /// Exact match against [`ALLOWED_MIME_TYPES`].
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(SupportedType::Png),
            "image/jpeg" => Some(SupportedType::Jpeg),
            "application/pdf" => Some(SupportedType::Pdf),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            SupportedType::Png => "image/png",
            SupportedType::Jpeg => "image/jpeg",
            SupportedType::Pdf => "application/pdf",
        }
    }

    /// Extensions that get swapped for `.png` after conversion.
    pub(crate) fn source_extensions(self) -> &'static [&'static str] {
        match self {
            SupportedType::Png => &[],
            SupportedType::Jpeg => &["jpg", "jpeg"],
            SupportedType::Pdf => &["pdf"],
        }
    }

    /// Short label used in conversion error messages.
    pub(crate) fn label(self) -> &'static str {
        match self {
            SupportedType::Png => "PNG",
            SupportedType::Jpeg => "JPEG",
            SupportedType::Pdf => "PDF",
        }
    }
}
