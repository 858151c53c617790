//! Base64 encoding of staged uploads.

use std::io;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::mime;
use crate::model::EncodedImage;
use crate::upload::TempImage;

/// Read a staged image and encode it for an inline-data request.
///
/// The media type comes from the client's filename, or from the stored
/// filename when the client sent none. The file is left in place.
pub async fn encode(image: &TempImage) -> io::Result<EncodedImage> {
    let bytes = tokio::fs::read(image.path()).await?;

    let name = image
        .original_filename()
        .or_else(|| image.storage_filename())
        .unwrap_or_default();

    Ok(EncodedImage {
        mime_type: mime::resolve(name),
        data: STANDARD.encode(&bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mime::MimeType;
    use crate::upload::UploadedImage;
    use bytes::Bytes;

    const SAMPLE: &[u8] = &[0x00, 0x01, 0x02, 0xfe, 0xff, b'x', b'=', b'5', 0x0a];

    async fn staged(dir: &std::path::Path, filename: Option<&str>) -> TempImage {
        UploadedImage {
            filename: filename.map(str::to_owned),
            data: Bytes::from_static(SAMPLE),
        }
        .persist(dir)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_base64_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let image = staged(dir.path(), Some("eq.gif")).await;

        let encoded = encode(&image).await.unwrap();

        assert_eq!(encoded.mime_type, MimeType::Gif);
        assert_eq!(STANDARD.decode(&encoded.data).unwrap(), SAMPLE);
    }

    #[tokio::test]
    async fn test_original_filename_wins_over_storage_name() {
        let dir = tempfile::tempdir().unwrap();
        // The stored name keeps the `.JPEG` suffix, but resolution must use the client name.
        let image = staged(dir.path(), Some("Board.JPEG")).await;

        assert_eq!(encode(&image).await.unwrap().mime_type, MimeType::Jpeg);
    }

    #[tokio::test]
    async fn test_missing_original_filename_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let image = staged(dir.path(), None).await;

        assert_eq!(encode(&image).await.unwrap().mime_type, MimeType::Png);
    }

    #[tokio::test]
    async fn test_does_not_remove_file() {
        let dir = tempfile::tempdir().unwrap();
        let image = staged(dir.path(), Some("a.bmp")).await;

        encode(&image).await.unwrap();
        assert!(image.path().exists());
    }

    #[tokio::test]
    async fn test_vanished_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let image = staged(dir.path(), Some("a.png")).await;
        std::fs::remove_file(image.path()).unwrap();

        let err = encode(&image).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        // Already gone; closing reports it rather than panicking.
        assert!(image.close().is_err());
    }
}
