//! Multipart intake and temp-file staging of uploaded images.

use std::io;
use std::path::Path;

use axum::extract::Multipart;
use bytes::Bytes;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

use crate::error::AppError;

/// Multipart field holding the user's description.
pub const DESCRIPTION_FIELD: &str = "description";

/// Multipart field holding the image file.
pub const IMAGE_FIELD: &str = "image";

/// An image received in the request body, not yet on disk.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Client-supplied filename, if the part carried one.
    pub filename: Option<String>,
    pub data: Bytes,
}

/// A validated `/process` request.
#[derive(Debug, Clone)]
pub struct SolveRequest {
    pub description: String,
    pub image: UploadedImage,
}

/// Read the `description` and `image` fields from a multipart body.
///
/// `image` must be a file part; a text part with that name counts as
/// missing. The description is kept exactly as sent. Both fields are
/// validated before anything is written to disk, so a rejected request
/// never leaves a file behind. Other fields are skipped.
pub async fn receive(mut multipart: Multipart) -> Result<SolveRequest, AppError> {
    let mut description = None;
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);

        match name.as_deref() {
            Some(DESCRIPTION_FIELD) => {
                description = Some(field.text().await?);
            }
            Some(IMAGE_FIELD) => {
                let Some(filename) = field.file_name() else {
                    tracing::debug!("Skipping non-file part named {}", IMAGE_FIELD);
                    continue;
                };
                let filename = (!filename.is_empty()).then(|| filename.to_owned());
                let data = field.bytes().await?;
                image = Some(UploadedImage { filename, data });
            }
            other => {
                tracing::debug!(field = ?other, "Skipping unexpected multipart field");
            }
        }
    }

    let description = description
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| AppError::Validation("description required".to_string()))?;

    let image = image
        .filter(|image| !image.data.is_empty())
        .ok_or_else(|| AppError::Validation("image required".to_string()))?;

    Ok(SolveRequest { description, image })
}

impl UploadedImage {
    /// Write the image to a fresh, uniquely named file in `upload_dir`.
    ///
    /// The returned handle owns the file; it is removed when the handle is
    /// closed or dropped. If the write fails the partial file is removed.
    pub async fn persist(&self, upload_dir: &Path) -> io::Result<TempImage> {
        let suffix = self
            .filename
            .as_deref()
            .and_then(storage_suffix)
            .unwrap_or_default();

        let named = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&suffix)
            .tempfile_in(upload_dir)?;
        let (file, path) = named.into_parts();

        let mut file = tokio::fs::File::from_std(file);
        file.write_all(&self.data).await?;
        file.flush().await?;

        tracing::debug!(path = %path.display(), bytes = self.data.len(), "Staged upload");

        Ok(TempImage {
            path,
            original_filename: self.filename.clone(),
        })
    }
}

/// `.ext` of the client filename, when the extension is plain ASCII alphanumerics.
fn storage_suffix(filename: &str) -> Option<String> {
    let ext = Path::new(filename).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(format!(".{}", ext))
}

/// An uploaded image staged on disk for the duration of one request.
#[derive(Debug)]
pub struct TempImage {
    path: TempPath,
    original_filename: Option<String>,
}

impl TempImage {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_filename(&self) -> Option<&str> {
        self.original_filename.as_deref()
    }

    /// Name the file was stored under.
    pub fn storage_filename(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }

    /// Remove the backing file, reporting any failure.
    pub fn close(self) -> io::Result<()> {
        self.path.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(filename: Option<&str>, data: &'static [u8]) -> UploadedImage {
        UploadedImage {
            filename: filename.map(str::to_owned),
            data: Bytes::from_static(data),
        }
    }

    #[test]
    fn test_storage_suffix() {
        assert_eq!(storage_suffix("eq.JPG").as_deref(), Some(".JPG"));
        assert_eq!(storage_suffix("eq.tar.gz").as_deref(), Some(".gz"));
        assert_eq!(storage_suffix("eq"), None);
        assert_eq!(storage_suffix("eq.p g"), None);
        assert_eq!(storage_suffix("eq.verylongextension"), None);
    }

    #[tokio::test]
    async fn test_persist_writes_and_close_removes() {
        let dir = tempfile::tempdir().unwrap();
        let staged = image(Some("problem.png"), b"\x89PNG")
            .persist(dir.path())
            .await
            .unwrap();

        let path = staged.path().to_path_buf();
        assert_eq!(std::fs::read(&path).unwrap(), b"\x89PNG");
        assert_eq!(staged.original_filename(), Some("problem.png"));
        let stored = staged.storage_filename().unwrap();
        assert!(stored.starts_with("upload-"));
        assert!(stored.ends_with(".png"));

        staged.close().unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let staged = image(None, b"data").persist(dir.path()).await.unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_same_filename_gets_distinct_paths() {
        let dir = tempfile::tempdir().unwrap();
        let upload = image(Some("photo.jpg"), b"a");

        let first = upload.persist(dir.path()).await.unwrap();
        let second = upload.persist(dir.path()).await.unwrap();

        assert_ne!(first.path(), second.path());
    }

    #[tokio::test]
    async fn test_persist_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = image(Some("a.png"), b"a").persist(&missing).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
