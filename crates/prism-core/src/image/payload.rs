//! Raw image payload type.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// An image held as base64 text plus its mime type.
///
/// Payloads are ephemeral: they are constructed on demand from a data URL
/// or raw bytes right before a capability call, and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// Base64-encoded image bytes (standard alphabet).
    pub base64: String,
    /// Mime type of the encoded image, e.g. `image/png`.
    pub mime_type: String,
}

impl ImagePayload {
    /// Creates a payload from already-encoded base64 text.
    pub fn new(base64: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            base64: base64.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Encodes raw image bytes into a payload.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            base64: BASE64_STANDARD.encode(bytes),
            mime_type: mime_type.into(),
        }
    }

    /// Decodes the base64 text back into raw bytes.
    ///
    /// Fails with a Format error when the payload is not valid base64.
    pub fn decode_bytes(&self) -> Result<Vec<u8>> {
        Ok(BASE64_STANDARD.decode(&self.base64)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_round_trip() {
        let payload = ImagePayload::from_bytes(b"\x89PNG\r\n", "image/png");
        assert_eq!(payload.mime_type, "image/png");
        assert_eq!(payload.decode_bytes().unwrap(), b"\x89PNG\r\n");
    }

    #[test]
    fn test_decode_bytes_rejects_invalid_base64() {
        let payload = ImagePayload::new("not base64!!!", "image/png");
        let err = payload.decode_bytes().unwrap_err();
        assert!(err.is_format());
    }
}
