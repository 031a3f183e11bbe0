//! In-place audio transcoding using ffmpeg
//!
//! Some discovered files carry the right extension but the wrong content
//! (a WAV or M4A stream renamed to `.mp3`). Tags cannot be attached until the
//! file is a real MPEG audio stream, so this module shells out to `ffmpeg`
//! to rewrite it.
//!
//! Install ffmpeg:
//! - Windows: `winget install Gyan.FFmpeg`
//! - macOS: `brew install ffmpeg`
//! - Linux: `apt install ffmpeg` or equivalent

use std::path::Path;
use std::process::Command;

use tempfile::TempPath;

use crate::metadata::TagError;

/// Common installation paths for ffmpeg on Windows
#[cfg(windows)]
const FFMPEG_PATHS: &[&str] = &[
    "ffmpeg", // In PATH
    r"C:\Program Files\ffmpeg\bin\ffmpeg.exe",
    r"C:\ffmpeg\bin\ffmpeg.exe",
];

#[cfg(not(windows))]
const FFMPEG_PATHS: &[&str] = &[
    "ffmpeg", // In PATH
    "/usr/bin/ffmpeg",
    "/usr/local/bin/ffmpeg",
    "/opt/homebrew/bin/ffmpeg",
];

/// Find the ffmpeg executable, checking common installation paths
fn find_ffmpeg() -> Option<&'static str> {
    FFMPEG_PATHS
        .iter()
        .find(|&path| {
            Command::new(path)
                .arg("-version")
                .output()
                .map(|o| o.status.success())
                .unwrap_or(false)
        })
        .map(|v| v as _)
}

/// Rewrite `path` as an MP3 stream, keeping its name.
///
/// Output goes to a uniquely named sibling temp file first and is renamed
/// over the original only once ffmpeg succeeds, so a failed conversion leaves
/// the file intact and concurrent conversions of the same path never share
/// an output file.
pub fn transcode_to_mp3(path: &Path) -> Result<(), TagError> {
    let ffmpeg = find_ffmpeg().ok_or_else(|| {
        TagError::transcode(path, "ffmpeg not found. Please install ffmpeg: https://ffmpeg.org")
    })?;

    let temp_path = temp_path_for(path)?;

    let output = Command::new(ffmpeg)
        .args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
        .arg(path)
        .args(["-vn", "-f", "mp3"])
        .arg(&*temp_path)
        .output()
        .map_err(|e| TagError::transcode(path, format!("Failed to run ffmpeg: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TagError::transcode(
            path,
            format!("ffmpeg failed: {}", stderr.trim()),
        ));
    }

    temp_path
        .persist(path)
        .map_err(|e| TagError::transcode(path, format!("Failed to replace original: {}", e.error)))?;

    tracing::debug!(path = %path.display(), "Transcoded to MP3");
    Ok(())
}

/// Fresh temp file next to `path`, e.g. `song.mp3` → `.song.mp3.Xa3k9Q.transcode`.
///
/// Removed on drop unless persisted.
fn temp_path_for(path: &Path) -> Result<TempPath, TagError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "track".to_string());
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    tempfile::Builder::new()
        .prefix(&format!(".{}.", name))
        .suffix(".transcode")
        .tempfile_in(dir)
        .map(|file| file.into_temp_path())
        .map_err(|e| TagError::transcode(path, format!("Failed to create temp file: {}", e)))
}

/// Check if ffmpeg is available on the system
pub fn is_ffmpeg_available() -> bool {
    find_ffmpeg().is_some()
}

/// Get ffmpeg version string (for diagnostics)
pub fn get_ffmpeg_version() -> Option<String> {
    let ffmpeg = find_ffmpeg()?;
    Command::new(ffmpeg)
        .arg("-version")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| {
            String::from_utf8_lossy(&o.stdout)
                .lines()
                .next()
                .map(|l| l.trim().to_string())
        })
}
