//! Cover art HTTP client
//!
//! Fetches images from the URLs handed out by the recognition service.
//! A non-success status is not an error: the track simply gets no artwork.

use super::{CoverArt, DEFAULT_MIME_TYPE};
use crate::metadata::TagError;

/// Cover art client
pub struct CoverArtClient {
    http_client: reqwest::Client,
}

impl CoverArtClient {
    /// Create a new client
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
        }
    }

    /// Download an image from a URL
    ///
    /// Returns `Ok(None)` when the server answers with a non-success status.
    pub async fn download(&self, url: &str) -> Result<Option<CoverArt>, TagError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| TagError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(
                url,
                status = status.as_u16(),
                "Cover art not available"
            );
            return Ok(None);
        }

        let mime_type = mime_type_of(
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );

        let data = response
            .bytes()
            .await
            .map_err(|e| TagError::Network(e.to_string()))?
            .to_vec();

        Ok(Some(CoverArt {
            data,
            mime_type,
            url: url.to_string(),
        }))
    }
}

impl Default for CoverArtClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Image MIME type from a Content-Type header, ignoring parameters.
fn mime_type_of(content_type: Option<&str>) -> String {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .filter(|ct| ct.starts_with("image/"))
        .unwrap_or(DEFAULT_MIME_TYPE)
        .to_string()
}
