//! Recognition result and error types.
//!
//! The service's JSON is kept as an untyped [`serde_json::Value`]:
//! field extraction happens one lookup at a time in
//! [`crate::metadata::extract`], so a malformed section cannot sink the
//! whole response.

use serde_json::Value;

/// Outcome of one successful round-trip to the recognition service
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionResult {
    /// The service identified the track; holds the full response body
    Matched(Value),
    /// The service answered but could not identify the track
    NoMatch,
}

impl RecognitionResult {
    /// Classify a response body.
    ///
    /// A response counts as a match only when it carries a `track` object.
    /// Anything else (`{"matches": []}`, `null`, an array) is a no-match.
    pub fn from_response(body: Value) -> Self {
        let has_track = body
            .get("track")
            .map(Value::is_object)
            .unwrap_or(false);

        if has_track {
            Self::Matched(body)
        } else {
            Self::NoMatch
        }
    }
}

/// Errors from a single recognition attempt
#[derive(Debug, Clone, thiserror::Error)]
pub enum RecognitionError {
    #[error("Recognition request timed out")]
    Timeout,

    #[error("Connection reset: {0}")]
    ConnectionReset(String),

    #[error("Failed to connect to recognition service: {0}")]
    Connect(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Failed to read track: {0}")]
    Io(String),
}

impl RecognitionError {
    /// Whether another attempt may succeed.
    ///
    /// Only timeouts, resets and connection failures qualify. Everything else
    /// means the service (or the file) will answer the same way next time.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::ConnectionReset(_) | Self::Connect(_)
        )
    }
}
