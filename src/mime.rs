//! Filename-based media type resolution for uploaded images.

use std::fmt;
use std::path::Path;

use serde::{Serialize, Serializer};

/// Image media types the solver accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MimeType {
    #[default]
    Png,
    Jpeg,
    Gif,
    Bmp,
}

impl MimeType {
    /// The media type string, e.g. `image/png`.
    pub fn as_str(&self) -> &'static str {
        match self {
            MimeType::Png => "image/png",
            MimeType::Jpeg => "image/jpeg",
            MimeType::Gif => "image/gif",
            MimeType::Bmp => "image/bmp",
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MimeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Resolve the media type of an image from its filename.
///
/// The extension is matched case-insensitively. Unknown or missing
/// extensions resolve to `image/png`; content is never inspected.
///
/// # Example
/// ```
/// use mathlens::mime::{resolve, MimeType};
///
/// assert_eq!(resolve("IMG_0042.JPG"), MimeType::Jpeg);
/// assert_eq!(resolve("scan.webp"), MimeType::Png);
/// ```
pub fn resolve(filename: &str) -> MimeType {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => MimeType::Png,
        Some("jpg") | Some("jpeg") => MimeType::Jpeg,
        Some("gif") => MimeType::Gif,
        Some("bmp") => MimeType::Bmp,
        _ => MimeType::Png,
    }
}
