//! Recognition service HTTP client
//!
//! Uploads the raw track bytes to the configured endpoint and returns the
//! service's JSON answer. The endpoint is expected to speak the common
//! song-detection response shape: a top-level `track` object on a match,
//! no `track` key when nothing was identified.
//!
//! ## Failure classification
//!
//! reqwest folds several distinct failures into one error type. The retry
//! policy needs to tell them apart, so [`classify`] maps them onto
//! [`RecognitionError`]:
//! - connect failures (DNS, refused, TLS handshake) → `Connect`
//! - an `io::Error` of kind `ConnectionReset`/`ConnectionAborted`/`BrokenPipe`
//!   anywhere in the source chain → `ConnectionReset`
//! - client-side timeouts → `Timeout`
//! - everything else → `Request` (not retried)

use std::error::Error as _;
use std::io;
use std::path::Path;

use crate::config::RecognitionConfig;
use crate::recognition::domain::{RecognitionError, RecognitionResult};

/// Header carrying the API key, when one is configured
const API_KEY_HEADER: &str = "X-Api-Key";

/// Recognition service client
pub struct HttpRecognitionClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpRecognitionClient {
    /// Create a new client from validated recognition settings
    ///
    /// The client is configured to:
    /// - Accept gzip-compressed responses (reduces bandwidth)
    /// - Send User-Agent header identifying the application
    ///
    /// No request timeout is set here; the caller bounds each attempt.
    pub fn new(config: &RecognitionConfig) -> Result<Self, RecognitionError> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| RecognitionError::Request("no endpoint configured".to_string()))?;

        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| RecognitionError::Request(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    /// Create a client for testing with custom endpoint
    #[cfg(test)]
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: None,
        }
    }

    /// Upload the track at `path` and classify the answer
    pub async fn recognize(&self, path: &Path) -> Result<RecognitionResult, RecognitionError> {
        let body = self.send_recognize_request(path).await?;
        Ok(RecognitionResult::from_response(body))
    }

    async fn send_recognize_request(
        &self,
        path: &Path,
    ) -> Result<serde_json::Value, RecognitionError> {
        let audio = tokio::fs::read(path)
            .await
            .map_err(|e| RecognitionError::Io(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), bytes = audio.len(), "Uploading track for recognition");

        let mut request = self
            .http_client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(audio);

        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await.map_err(|e| classify(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecognitionError::Http {
                status: status.as_u16(),
                message: format!(
                    "{} - {}",
                    status.canonical_reason().unwrap_or("Unknown"),
                    body.chars().take(200).collect::<String>()
                ),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| match classify(&e) {
                RecognitionError::Request(msg) if e.is_decode() => RecognitionError::Parse(msg),
                other => other,
            })
    }
}

/// Map a reqwest failure onto the recognition error taxonomy
pub(crate) fn classify(err: &reqwest::Error) -> RecognitionError {
    if err.is_timeout() {
        return RecognitionError::Timeout;
    }

    if let Some(io_err) = find_io_error(err)
        && is_reset(io_err.kind())
    {
        return RecognitionError::ConnectionReset(io_err.to_string());
    }

    if err.is_connect() {
        return RecognitionError::Connect(err.to_string());
    }

    RecognitionError::Request(err.to_string())
}

fn find_io_error(err: &reqwest::Error) -> Option<&io::Error> {
    let mut source = err.source();
    while let Some(current) = source {
        if let Some(io_err) = current.downcast_ref::<io::Error>() {
            return Some(io_err);
        }
        source = current.source();
    }
    None
}

fn is_reset(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted | io::ErrorKind::BrokenPipe
    )
}
