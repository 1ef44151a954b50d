//! Data-URL codec.
//!
//! A data URL bundles a mime type and a base64 payload into one
//! self-describing string, `data:<mimeType>;base64,<payload>`. It is the
//! canonical in-memory representation of every image the studio holds:
//! directly usable as an image source and as a download artifact.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::payload::ImagePayload;
use crate::error::{Result, StudioError};

/// Suggested filename when a data URL is offered as a download.
pub const DOWNLOAD_FILE_NAME: &str = "gemini-image.png";

static DATA_URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:(.*?);base64,(.*)$").expect("data URL pattern is valid"));

/// A `data:<mimeType>;base64,<payload>` string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataUrl(String);

impl DataUrl {
    /// Wraps an externally-produced data URL string without validating it.
    ///
    /// Validation happens on [`decode`](Self::decode); UI layers routinely
    /// hold URLs they never decode.
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Formats a payload as `data:{mimeType};base64,{base64}`.
    pub fn encode(payload: &ImagePayload) -> Self {
        Self(format!(
            "data:{};base64,{}",
            payload.mime_type, payload.base64
        ))
    }

    /// Parses the data URL back into an [`ImagePayload`].
    ///
    /// Primary path: the anchored `data:<mime>;base64,<payload>` grammar.
    /// Fallback path (tolerating minor encoder variance): the mime type is
    /// taken between the first `:` and the first `;`, the payload after the
    /// first `,`. Either way an empty mime type or payload is rejected, so
    /// primary matches with an empty capture fall through to the single
    /// rejection point below.
    pub fn decode(&self) -> Result<ImagePayload> {
        if let Some(caps) = DATA_URL_PATTERN.captures(&self.0) {
            let mime_type = &caps[1];
            let base64 = &caps[2];
            if !mime_type.is_empty() && !base64.is_empty() {
                return Ok(ImagePayload::new(base64, mime_type));
            }
        }

        let mime_type = match (self.0.find(':'), self.0.find(';')) {
            (Some(start), Some(end)) if start < end => &self.0[start + 1..end],
            _ => "",
        };
        let base64 = match self.0.find(',') {
            Some(at) => &self.0[at + 1..],
            None => "",
        };
        if mime_type.is_empty() || base64.is_empty() {
            return Err(StudioError::format("Invalid data URL format"));
        }
        Ok(ImagePayload::new(base64, mime_type))
    }

    /// Returns the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DataUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reads a local image file fully into memory and encodes it as a data URL.
///
/// The mime type is inferred from the file extension; unknown extensions
/// fall back to `application/octet-stream`. Read failures surface the
/// failing path in the error message.
pub async fn read_local_file(path: impl AsRef<Path>) -> Result<DataUrl> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| StudioError::format(format!("Failed to read {}: {err}", path.display())))?;
    let payload = ImagePayload::from_bytes(&bytes, mime_for_extension(path));
    Ok(DataUrl::encode(&payload))
}

fn mime_for_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let payload = ImagePayload::new("aGVsbG8=", "image/png");
        let url = DataUrl::encode(&payload);
        assert_eq!(url.as_str(), "data:image/png;base64,aGVsbG8=");
        assert_eq!(url.decode().unwrap(), payload);
    }

    #[test]
    fn test_decode_primary_grammar() {
        let url = DataUrl::new("data:image/jpeg;base64,QUJD");
        let payload = url.decode().unwrap();
        assert_eq!(payload.mime_type, "image/jpeg");
        assert_eq!(payload.base64, "QUJD");
    }

    #[test]
    fn test_decode_fallback_tolerates_variant_marker() {
        // No literal ";base64," so the primary pattern rejects it; the
        // fallback still extracts both fields.
        let url = DataUrl::new("data:image/png;base64x,QUJD");
        let payload = url.decode().unwrap();
        assert_eq!(payload.mime_type, "image/png");
        assert_eq!(payload.base64, "QUJD");
    }

    #[test]
    fn test_decode_rejects_empty_payload() {
        // Matches the primary grammar with an empty capture, then fails
        // the fallback's empty-field check.
        let err = DataUrl::new("data:image/png;base64,").decode().unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_decode_rejects_empty_mime_type() {
        let err = DataUrl::new("data:;base64,QUJD").decode().unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(DataUrl::new("not a data url").decode().is_err());
        assert!(DataUrl::new("data:image/png").decode().is_err());
    }

    #[tokio::test]
    async fn test_read_local_file_infers_mime_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("product.PNG");
        std::fs::write(&path, b"fake image bytes").unwrap();

        let url = read_local_file(&path).await.unwrap();
        assert!(url.as_str().starts_with("data:image/png;base64,"));

        let payload = url.decode().unwrap();
        assert_eq!(payload.decode_bytes().unwrap(), b"fake image bytes");
    }

    #[tokio::test]
    async fn test_read_local_file_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("product.raw");
        std::fs::write(&path, b"bytes").unwrap();

        let url = read_local_file(&path).await.unwrap();
        assert!(url.as_str().starts_with("data:application/octet-stream;"));
    }

    #[tokio::test]
    async fn test_read_local_file_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.png");

        let err = read_local_file(&path).await.unwrap_err();
        assert!(err.is_format());
        assert!(err.to_string().contains("missing.png"));
    }
}
