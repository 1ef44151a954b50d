//! Error types for the PRISM studio engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel raised when image generation succeeds but returns zero images.
pub const NO_IMAGE_GENERATED: &str =
    "No image was generated. The model may not have been able to fulfill the request.";

/// Sentinel raised when an edit response carries no inline image part.
pub const NO_EDITED_IMAGE_RETURNED: &str =
    "No edited image was returned. Try adjusting your prompt for a clearer instruction.";

/// Sentinel raised when prompt refinement returns blank text.
pub const NO_REFINED_PROMPT: &str = "The model did not return a refined prompt.";

/// Prefixes of the internally-raised sentinel messages. A failure containing
/// one of these is shown to the user verbatim instead of being rewritten.
const SENTINEL_PREFIXES: [&str; 3] = [
    "No image was generated",
    "No edited image was returned",
    "The model did not return a refined prompt",
];

const SAFETY_MESSAGE: &str =
    "Your request was blocked due to safety settings. Please modify your prompt and try again.";
const QUOTA_MESSAGE: &str =
    "You have exceeded your API quota. Please check your Google AI Studio account for details.";
const INVALID_REQUEST_MESSAGE: &str =
    "There was an issue with the request. Please ensure your prompt, images, and settings are valid.";
const SERVER_ERROR_MESSAGE: &str =
    "The server encountered an error. Please wait a moment and try again.";
const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// A raw failure from a generative capability implementation.
///
/// These are produced at the wire boundary and are not user-facing;
/// orchestration converts them into [`StudioError`], which normalizes
/// the text for display.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum CapabilityError {
    /// The request could not be sent (connection, timeout, TLS, ...).
    #[error("Request failed: {0}")]
    Request(String),

    /// The API answered with a non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The call succeeded but carried no usable content.
    #[error("{0}")]
    Empty(String),
}

impl CapabilityError {
    /// Creates a Request error
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request(message.into())
    }

    /// Creates an Http error
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates an InvalidResponse error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Creates an Empty error carrying a sentinel message
    pub fn empty(message: impl Into<String>) -> Self {
        Self::Empty(message.into())
    }

    /// Check if this is an Http error
    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http { .. })
    }

    /// Check if this is an Empty error
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty(_))
    }
}

/// The closed, user-facing error taxonomy of the studio engine.
///
/// Every orchestration operation either returns its value or exactly one
/// of these; the `Display` text is the message shown to the user, so no
/// variant ever carries a raw internal failure.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StudioError {
    /// A required input was missing or blank. Raised before any remote call.
    #[error("{0}")]
    Validation(String),

    /// A data URL or capability response did not match its expected shape.
    #[error("{0}")]
    Format(String),

    /// A remote capability call failed; the message has been normalized.
    #[error("{0}")]
    Remote(String),

    /// The capability succeeded but returned no usable image or text.
    #[error("{0}")]
    EmptyResult(String),
}

impl StudioError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Format error
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    /// Creates a Remote error, normalizing the failure text for display
    pub fn remote(failure: impl std::fmt::Display) -> Self {
        Self::Remote(normalize_remote_failure(&failure.to_string()))
    }

    /// Creates an EmptyResult error carrying a sentinel message
    pub fn empty_result(message: impl Into<String>) -> Self {
        Self::EmptyResult(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a Format error
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }

    /// Check if this is a Remote error
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Check if this is an EmptyResult error
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::EmptyResult(_))
    }
}

/// Maps an arbitrary remote failure onto a single displayable message.
///
/// The rules are ordered and the first match wins, applied to the
/// lower-cased failure text:
///
/// 1. `safety` / `blocked` -> safety-settings message
/// 2. `quota` -> quota-exceeded message
/// 3. `400` / `bad request` / `invalid argument` -> invalid-request message
/// 4. `500` / `server error` -> transient-server-error message
/// 5. text containing an internally-raised sentinel -> passed through verbatim
/// 6. anything else -> generic unexpected-error message
///
/// Never fails; the original failure is logged for diagnostics.
pub fn normalize_remote_failure(failure: &str) -> String {
    tracing::error!("[ErrorNormalizer] Remote capability failure: {failure}");

    let lowered = failure.to_lowercase();
    if lowered.contains("safety") || lowered.contains("blocked") {
        SAFETY_MESSAGE.to_string()
    } else if lowered.contains("quota") {
        QUOTA_MESSAGE.to_string()
    } else if lowered.contains("400")
        || lowered.contains("bad request")
        || lowered.contains("invalid argument")
    {
        INVALID_REQUEST_MESSAGE.to_string()
    } else if lowered.contains("500") || lowered.contains("server error") {
        SERVER_ERROR_MESSAGE.to_string()
    } else if SENTINEL_PREFIXES.iter().any(|p| failure.contains(p)) {
        failure.to_string()
    } else {
        UNEXPECTED_ERROR_MESSAGE.to_string()
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<CapabilityError> for StudioError {
    fn from(err: CapabilityError) -> Self {
        match err {
            CapabilityError::Empty(message) => {
                Self::EmptyResult(normalize_remote_failure(&message))
            }
            other => Self::Remote(normalize_remote_failure(&other.to_string())),
        }
    }
}

impl From<base64::DecodeError> for StudioError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Format(format!("Invalid base64 payload: {err}"))
    }
}

/// A type alias for `Result<T, StudioError>`.
pub type Result<T> = std::result::Result<T, StudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_safety_failure() {
        let message = normalize_remote_failure("Request blocked: SAFETY filters triggered");
        assert_eq!(message, SAFETY_MESSAGE);
    }

    #[test]
    fn test_normalize_quota_failure() {
        let message = normalize_remote_failure("Quota exceeded for project");
        assert_eq!(message, QUOTA_MESSAGE);
    }

    #[test]
    fn test_normalize_invalid_request_failure() {
        assert_eq!(
            normalize_remote_failure("HTTP 400: API key not valid"),
            INVALID_REQUEST_MESSAGE
        );
        assert_eq!(
            normalize_remote_failure("upstream said Bad Request"),
            INVALID_REQUEST_MESSAGE
        );
    }

    #[test]
    fn test_normalize_server_failure() {
        assert_eq!(
            normalize_remote_failure("HTTP 500: internal failure"),
            SERVER_ERROR_MESSAGE
        );
    }

    #[test]
    fn test_safety_takes_priority_over_quota() {
        // Both "blocked" and "quota" appear; rule order decides.
        let message = normalize_remote_failure("blocked because quota ran out");
        assert_eq!(message, SAFETY_MESSAGE);
    }

    #[test]
    fn test_sentinel_passes_through_verbatim() {
        let message = normalize_remote_failure("No image was generated.");
        assert_eq!(message, "No image was generated.");

        let message = normalize_remote_failure(NO_EDITED_IMAGE_RETURNED);
        assert_eq!(message, NO_EDITED_IMAGE_RETURNED);
    }

    #[test]
    fn test_unrecognized_failure_maps_to_generic_message() {
        let message = normalize_remote_failure("socket hung up mid-flight");
        assert_eq!(message, UNEXPECTED_ERROR_MESSAGE);
    }

    #[test]
    fn test_capability_error_conversion() {
        let err: StudioError = CapabilityError::http(429, "quota exhausted").into();
        assert!(err.is_remote());
        assert_eq!(err.to_string(), QUOTA_MESSAGE);

        let err: StudioError = CapabilityError::empty(NO_REFINED_PROMPT).into();
        assert!(err.is_empty_result());
        assert_eq!(err.to_string(), NO_REFINED_PROMPT);
    }

    #[test]
    fn test_display_is_the_payload() {
        let err = StudioError::validation("Please enter a prompt.");
        assert_eq!(err.to_string(), "Please enter a prompt.");
        assert!(err.is_validation());
    }
}
