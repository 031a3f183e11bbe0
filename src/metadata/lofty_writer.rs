//! [`TagWriter`] backed by lofty, ffmpeg and the cover art client.
//!
//! The taggable container is MPEG audio with an ID3v2 tag. A file whose
//! content sniffs as anything else (or that lofty cannot parse) counts as
//! not taggable and is handed to [`crate::transcode`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lofty::config::WriteOptions;
use lofty::file::{FileType, TaggedFile, TaggedFileExt};
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::probe::Probe;
use lofty::tag::{Accessor, Tag, TagExt, TagType};

use super::traits::TagWriter;
use super::{ImageRole, TagError, TagFields};
use crate::cover::{CoverArt, CoverArtClient};
use crate::transcode;

/// Tag container for one MPEG file
pub struct LoftyContainer {
    path: PathBuf,
    tag: Tag,
}

/// Production tag writer
pub struct LoftyTagWriter {
    cover_client: CoverArtClient,
}

impl LoftyTagWriter {
    pub fn new() -> Self {
        Self {
            cover_client: CoverArtClient::new(),
        }
    }
}

impl Default for LoftyTagWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Read `path` if its content is MPEG audio.
fn read_mpeg(path: &Path) -> lofty::error::Result<Option<TaggedFile>> {
    let probe = Probe::open(path)?.guess_file_type()?;
    if probe.file_type() != Some(FileType::Mpeg) {
        return Ok(None);
    }
    probe.read().map(Some)
}

fn picture_type(role: ImageRole) -> PictureType {
    match role {
        ImageRole::FrontCover => PictureType::CoverFront,
        ImageRole::BackCover => PictureType::CoverBack,
        ImageRole::Leaflet => PictureType::Leaflet,
        ImageRole::Media => PictureType::Media,
    }
}

#[async_trait]
impl TagWriter for LoftyTagWriter {
    type Container = LoftyContainer;

    fn load(&self, path: &Path) -> Result<Option<LoftyContainer>, TagError> {
        // Missing or unreadable files are real errors, not "wrong format"
        std::fs::metadata(path).map_err(|e| TagError::io(path, e))?;

        let tagged_file = match read_mpeg(path) {
            Ok(Some(file)) => file,
            Ok(None) => {
                tracing::debug!(path = %path.display(), "Content is not MPEG audio");
                return Ok(None);
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "lofty could not parse file");
                return Ok(None);
            }
        };

        let tag = tagged_file
            .primary_tag()
            .cloned()
            .unwrap_or_else(|| Tag::new(TagType::Id3v2));

        Ok(Some(LoftyContainer {
            path: path.to_path_buf(),
            tag,
        }))
    }

    fn transcode(&self, path: &Path) -> Result<(), TagError> {
        transcode::transcode_to_mp3(path)
    }

    fn init_tags(&self, container: &mut LoftyContainer) {
        container.tag = Tag::new(TagType::Id3v2);
    }

    fn set_scalar_fields(&self, container: &mut LoftyContainer, fields: &TagFields) {
        let tag = &mut container.tag;

        if let Some(title) = &fields.title {
            tag.set_title(title.clone());
        }
        if let Some(artist) = &fields.artist {
            tag.set_artist(artist.clone());
        }
        if let Some(album) = &fields.album {
            tag.set_album(album.clone());
        }
        if let Some(genre) = &fields.genre {
            tag.set_genre(genre.clone());
        }
    }

    async fn fetch_cover_art(&self, url: &str) -> Result<Option<CoverArt>, TagError> {
        self.cover_client.download(url).await
    }

    fn attach_image(&self, container: &mut LoftyContainer, role: ImageRole, art: &CoverArt) {
        let pic_type = picture_type(role);

        container.tag.remove_picture_type(pic_type);
        container.tag.push_picture(Picture::new_unchecked(
            pic_type,
            Some(MimeType::from_str(&art.mime_type)),
            Some(format!("{} ({})", role.label(), art.url)),
            art.data.clone(),
        ));
    }

    fn persist(&self, container: &LoftyContainer) -> Result<(), TagError> {
        container
            .tag
            .save_to_path(&container.path, WriteOptions::default())
            .map_err(|e| TagError::save(&container.path, e.to_string()))
    }
}
