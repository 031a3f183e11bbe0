//! Trait definition for the tag container boundary.
//!
//! The pipeline never touches lofty, ffmpeg or the cover art client
//! directly: it drives a [`TagWriter`]. Production code uses
//! [`LoftyTagWriter`](super::LoftyTagWriter); tests use the in-memory
//! [`mocks::MockTagWriter`].

use std::path::Path;

use async_trait::async_trait;

use super::{ImageRole, TagError, TagFields};
use crate::cover::CoverArt;

/// Load, mutate and persist a track's tag container.
#[async_trait]
pub trait TagWriter: Send + Sync {
    /// In-memory tag container for one track
    type Container: Send + 'static;

    /// Load the container, or `None` if the file is not a taggable format.
    fn load(&self, path: &Path) -> Result<Option<Self::Container>, TagError>;

    /// Convert the file in place into the taggable format.
    fn transcode(&self, path: &Path) -> Result<(), TagError>;

    /// Replace the container's tags with an empty set.
    fn init_tags(&self, container: &mut Self::Container);

    /// Set the scalar fields that are present; absent ones are left alone.
    fn set_scalar_fields(&self, container: &mut Self::Container, fields: &TagFields);

    /// Download cover art. `Ok(None)` when the server answers with a
    /// non-success status.
    async fn fetch_cover_art(&self, url: &str) -> Result<Option<CoverArt>, TagError>;

    /// Store `art` under `role`, replacing whatever image held that role.
    fn attach_image(&self, container: &mut Self::Container, role: ImageRole, art: &CoverArt);

    /// Write the container back to disk.
    fn persist(&self, container: &Self::Container) -> Result<(), TagError>;

    /// Load the container, transcoding the file first if it is not taggable.
    ///
    /// A freshly transcoded file always starts from an empty tag set.
    fn ensure_container(&self, path: &Path) -> Result<Self::Container, TagError> {
        if let Some(container) = self.load(path)? {
            return Ok(container);
        }

        tracing::info!(path = %path.display(), "Not a taggable container, transcoding");
        self.transcode(path)?;

        let mut container = self
            .load(path)?
            .ok_or_else(|| TagError::untaggable(path))?;
        self.init_tags(&mut container);
        Ok(container)
    }
}
