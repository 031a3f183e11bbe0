//! Cover art download.
//!
//! Recognition results carry image URLs; this module turns a URL into bytes
//! plus a MIME type that can be embedded in a tag container.

mod client;

pub use client::CoverArtClient;

/// Downloaded cover art
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverArt {
    /// Raw image data (JPEG or PNG)
    pub data: Vec<u8>,
    /// MIME type (image/jpeg, image/png)
    pub mime_type: String,
    /// Source URL
    pub url: String,
}

/// MIME type assumed when the server does not send one
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";
