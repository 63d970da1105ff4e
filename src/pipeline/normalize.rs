//! Per-attachment normalisation and the best-effort batch fold.

use crate::attachment::{Attachment, SupportedType};
use crate::config::RelayConfig;
use crate::error::FileError;
use crate::payload::NormalizedFile;
use crate::pipeline::{encode, input, render};
use tracing::{error, info, warn};

/// Result of normalising one batch: accepted files in input order, plus one
/// error per skipped file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeOutcome {
    pub files: Vec<NormalizedFile>,
    pub errors: Vec<FileError>,
}

impl NormalizeOutcome {
    /// Final names of the accepted files.
    pub fn accepted_names(&self) -> Vec<String> {
        self.files.iter().map(|f| f.name.clone()).collect()
    }

    /// One chat line per skipped file.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(FileError::user_message).collect()
    }
}

/// Normalise every attachment, never stopping on a bad file.
pub async fn normalize_all(attachments: Vec<Attachment>, config: &RelayConfig) -> NormalizeOutcome {
    let mut outcome = NormalizeOutcome::default();

    for attachment in attachments {
        match normalize_one(attachment, config).await {
            Ok((file, size)) => {
                info!("Successfully processed element '{}'", file.name);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_accepted(&file.name, size);
                }
                outcome.files.push(file);
            }
            Err(e) => {
                log_rejection(&e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_rejected(e.name(), &e.to_string());
                }
                outcome.errors.push(e);
            }
        }
    }

    if outcome.files.is_empty() {
        info!("No files accepted in this batch");
    }

    outcome
}

/// Normalise a single attachment.
///
/// Steps, stopping at the first failure: acquire content, check the MIME
/// allow-list, convert PDF/JPEG to PNG, require non-empty content, enforce
/// the size limit, base64-encode.
pub async fn normalize_attachment(
    attachment: Attachment,
    config: &RelayConfig,
) -> Result<NormalizedFile, FileError> {
    normalize_one(attachment, config).await.map(|(file, _)| file)
}

async fn normalize_one(
    attachment: Attachment,
    config: &RelayConfig,
) -> Result<(NormalizedFile, usize), FileError> {
    let Attachment {
        name,
        mime,
        kind,
        content,
    } = attachment;
    info!("Processing {:?} element '{}' with MIME type '{}'", kind, name, mime);

    let content = input::acquire_content(&name, content).await?;

    let Some(format) = SupportedType::from_mime(&mime) else {
        return Err(FileError::UnsupportedType { name, mime });
    };

    let (name, content) = match format {
        SupportedType::Png => (name, content),
        SupportedType::Jpeg | SupportedType::Pdf => {
            let source = content.unwrap_or_default();
            let png = render::to_png(format, source, config)
                .await
                .map_err(|detail| FileError::ConversionError {
                    name: name.clone(),
                    format: format.label().to_string(),
                    detail,
                })?;
            let renamed = png_file_name(&name, format);
            info!("Converted {} '{}' to PNG '{}'", format.label(), name, renamed);
            (renamed, Some(png))
        }
    };

    let bytes = match content {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return Err(FileError::EmptyContent { name }),
    };

    if bytes.len() > config.max_file_size {
        return Err(FileError::TooLarge {
            name,
            size: bytes.len(),
            limit: config.max_file_size,
        });
    }

    let content_base64 = encode::encode_base64(&bytes).map_err(|detail| FileError::EncodingError {
        name: name.clone(),
        detail,
    })?;

    let size = bytes.len();
    Ok((
        NormalizedFile {
            name,
            mime: SupportedType::Png.mime().to_string(),
            content_base64,
        },
        size,
    ))
}

/// Swap a converted file's source extension for `.png`.
///
/// Matching is case-insensitive. Names that do not end in one of the
/// format's source extensions are kept as they are.
pub fn png_file_name(name: &str, format: SupportedType) -> String {
    let lower = name.to_ascii_lowercase();
    let matches = format
        .source_extensions()
        .iter()
        .any(|ext| lower.ends_with(&format!(".{ext}")));

    match name.rsplit_once('.') {
        Some((stem, _)) if matches => format!("{stem}.png"),
        _ => name.to_string(),
    }
}

fn log_rejection(e: &FileError) {
    match e {
        FileError::ReadError { .. }
        | FileError::ConversionError { .. }
        | FileError::EncodingError { .. } => error!("{}", e),
        _ => warn!("{}", e),
    }
}
