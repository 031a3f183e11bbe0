//! Audio file metadata: extraction from recognition results and tag writing.
//!
//! Uses the lofty crate for format-independent tag access.
//!
//! # Features
//! - Project recognition JSON onto [`TagFields`] ([`extract`])
//! - Write fields and cover art through the [`TagWriter`] seam
//! - Read back what a file currently carries ([`read`])

pub mod extract;
mod lofty_writer;
pub mod traits;

use anyhow::{Context, Result};
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::Accessor;
use std::fmt;
use std::path::{Path, PathBuf};

pub use lofty_writer::LoftyTagWriter;
pub use traits::TagWriter;

/// Fields recognized for a track, ready to be written.
///
/// Every field is independent: any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFields {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    /// Where to download cover art from (not written as a tag itself)
    pub cover_art_url: Option<String>,
}

impl TagFields {
    /// True when nothing at all was extracted.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.genre.is_none()
            && self.cover_art_url.is_none()
    }
}

/// Role an embedded image plays in the tag container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageRole {
    FrontCover,
    BackCover,
    Leaflet,
    Media,
}

impl ImageRole {
    /// Every role cover art is attached under.
    pub const ALL: [ImageRole; 4] = [
        ImageRole::FrontCover,
        ImageRole::BackCover,
        ImageRole::Leaflet,
        ImageRole::Media,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            ImageRole::FrontCover => "Front Cover",
            ImageRole::BackCover => "Back Cover",
            ImageRole::Leaflet => "Leaflet",
            ImageRole::Media => "Media",
        }
    }
}

impl fmt::Display for ImageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors from loading, converting or saving a tag container
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No taggable container in {0} even after transcoding")]
    Untaggable(PathBuf),

    #[error("Failed to transcode {path}: {message}")]
    Transcode { path: PathBuf, message: String },

    #[error("Failed to save tags to {path}: {message}")]
    Save { path: PathBuf, message: String },

    #[error("Cover art download failed: {0}")]
    Network(String),

    #[error("Tag I/O task did not finish: {0}")]
    Interrupted(String),
}

impl TagError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn untaggable(path: impl Into<PathBuf>) -> Self {
        Self::Untaggable(path.into())
    }

    pub fn transcode(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Transcode {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn save(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Save {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Tags currently stored in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub picture_count: usize,
    pub duration: u64,
}

pub fn read(path: &Path) -> Result<TrackMetadata> {
    // Probe the file to determine format and read tags
    let tagged_file = Probe::open(path)
        .context("Failed to open file for probing")?
        .guess_file_type()
        .context("Failed to detect file type")?
        .read()
        .context("Failed to read file metadata")?;

    // Get the primary tag, or fall back to the first available tag
    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag());

    let title = tag.and_then(|t| t.title().map(|s| s.to_string()));
    let artist = tag.and_then(|t| t.artist().map(|s| s.to_string()));
    let album = tag.and_then(|t| t.album().map(|s| s.to_string()));
    let genre = tag.and_then(|t| t.genre().map(|s| s.to_string()));
    let picture_count = tag.map(|t| t.pictures().len()).unwrap_or(0);

    let duration = tagged_file.properties().duration().as_secs();

    Ok(TrackMetadata {
        title,
        artist,
        album,
        genre,
        picture_count,
        duration,
    })
}
