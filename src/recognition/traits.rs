//! Trait definition for the recognition service client.
//!
//! The pipeline only ever talks to [`RecognitionClient`], so tests can swap
//! in a scripted double and production code can swap providers.
//!
//! # Example
//!
//! ```ignore
//! use autotag::recognition::RecognitionClient;
//!
//! async fn identify<R: RecognitionClient>(client: &R, path: &Path) {
//!     match client.recognize(path).await? { ... }
//! }
//! ```

use std::path::Path;

use async_trait::async_trait;

use super::domain::{RecognitionError, RecognitionResult};

/// Trait for audio recognition lookups.
///
/// One call is one attempt: retries, timeouts and backoff are applied by the
/// caller.
#[async_trait]
pub trait RecognitionClient: Send + Sync {
    /// Submit the track at `path` and return what the service made of it.
    async fn recognize(&self, path: &Path) -> Result<RecognitionResult, RecognitionError>;
}

#[async_trait]
impl RecognitionClient for super::client::HttpRecognitionClient {
    async fn recognize(&self, path: &Path) -> Result<RecognitionResult, RecognitionError> {
        self.recognize(path).await
    }
}
