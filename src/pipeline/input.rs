//! Content acquisition: turn an [`AttachmentContent`] into bytes.
//!
//! In-memory content is used as-is (text becomes its UTF-8 bytes). Path
//! content is read from disk after checking that the path exists and can be
//! opened, so users get a precise reason when an upload went missing or has
//! the wrong permissions.

use crate::attachment::AttachmentContent;
use crate::error::FileError;
use std::io::ErrorKind;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

/// Resolve the attachment's bytes. `Ok(None)` means the host supplied no
/// content at all; the presence check happens later in the pipeline.
pub async fn acquire_content(
    name: &str,
    content: AttachmentContent,
) -> Result<Option<Vec<u8>>, FileError> {
    match content {
        AttachmentContent::Bytes(bytes) => Ok(Some(bytes)),
        AttachmentContent::Text(text) => Ok(Some(text.into_bytes())),
        AttachmentContent::Path(path) => read_path(name, &path).await.map(Some),
        AttachmentContent::Absent => Ok(None),
    }
}

/// Read a file fully, mapping each failure to its own [`FileError`].
async fn read_path(name: &str, path: &Path) -> Result<Vec<u8>, FileError> {
    info!("Attempting to read file from path '{}'", path.display());

    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(FileError::PathNotFound {
            name: name.to_string(),
            path: path.to_path_buf(),
        });
    }

    let mut file = match tokio::fs::File::open(path).await {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Err(FileError::PathUnreadable {
                name: name.to_string(),
                path: path.to_path_buf(),
            });
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(FileError::PathNotFound {
                name: name.to_string(),
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(FileError::ReadError {
                name: name.to_string(),
                detail: e.to_string(),
            });
        }
    };

    let mut buf = Vec::new();
    file.read_to_end(&mut buf)
        .await
        .map_err(|e| FileError::ReadError {
            name: name.to_string(),
            detail: e.to_string(),
        })?;

    debug!("Read {} bytes from '{}'", buf.len(), path.display());
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn bytes_and_text_pass_through() {
        let b = acquire_content("a.png", AttachmentContent::Bytes(vec![1, 2, 3]))
            .await
            .unwrap();
        assert_eq!(b, Some(vec![1, 2, 3]));

        let t = acquire_content("a.png", AttachmentContent::Text("héllo".into()))
            .await
            .unwrap();
        assert_eq!(t, Some("héllo".as_bytes().to_vec()));

        let n = acquire_content("a.png", AttachmentContent::Absent)
            .await
            .unwrap();
        assert_eq!(n, None);
    }

    #[tokio::test]
    async fn reads_existing_path() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"\x89PNG fake").unwrap();

        let got = acquire_content("x.png", AttachmentContent::Path(tmp.path().to_path_buf()))
            .await
            .unwrap();
        assert_eq!(got.as_deref(), Some(&b"\x89PNG fake"[..]));
    }

    #[tokio::test]
    async fn missing_path_is_path_not_found() {
        let err = acquire_content(
            "ghost.pdf",
            AttachmentContent::Path("/definitely/not/here/ghost.pdf".into()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FileError::PathNotFound { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn directory_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = acquire_content("dir.png", AttachmentContent::Path(dir.path().to_path_buf()))
            .await
            .unwrap_err();
        assert!(matches!(err, FileError::ReadError { .. }), "got: {err:?}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn permission_denied_is_path_unreadable() {
        use std::os::unix::fs::PermissionsExt;

        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"\x89PNG locked").unwrap();
        std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(0o000)).unwrap();

        // root ignores file modes
        if std::fs::File::open(tmp.path()).is_ok() {
            return;
        }

        let err = acquire_content("locked.png", AttachmentContent::Path(tmp.path().to_path_buf()))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FileError::PathUnreadable {
                name: "locked.png".into(),
                path: tmp.path().to_path_buf(),
            }
        );
        assert!(err.user_message().ends_with("is not readable."));
    }
}
