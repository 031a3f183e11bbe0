//! Track discovery.
//!
//! Lists candidate audio files directly inside each input directory
//! (no recursion). Extensions are matched case-insensitively.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Errors while listing a directory
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to list {path}: {message}")]
    Walk { path: PathBuf, message: String },
}

/// Files found across all input directories, plus the directories that
/// could not be listed.
#[derive(Debug, Default)]
pub struct Discovery {
    pub files: Vec<PathBuf>,
    pub errors: Vec<ScanError>,
}

/// List files directly under `dir` whose extension is in `extensions`.
///
/// `extensions` are lowercase without the leading dot. Results are sorted.
pub fn discover(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| ScanError::Walk {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;

        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Run [`discover`] over every directory, collecting failures instead of
/// stopping at the first one.
pub fn discover_all(dirs: &[PathBuf], extensions: &[String]) -> Discovery {
    let mut discovery = Discovery::default();

    for dir in dirs {
        match discover(dir, extensions) {
            Ok(files) => {
                tracing::info!(dir = %dir.display(), count = files.len(), "Found tracks");
                discovery.files.extend(files);
            }
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Skipping directory");
                discovery.errors.push(e);
            }
        }
    }

    discovery
}

/// Check if a path has one of the given extensions
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    fn mp3_only() -> Vec<String> {
        vec!["mp3".to_string()]
    }

    #[test]
    fn test_discover_is_non_recursive() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        File::create(root.join("song.mp3")).unwrap();
        File::create(root.join("UPPERCASE.MP3")).unwrap(); // case-insensitive
        File::create(root.join("music.flac")).unwrap(); // wrong extension
        File::create(root.join("notes.txt")).unwrap();

        let subdir = root.join("subdir");
        std::fs::create_dir(&subdir).unwrap();
        File::create(subdir.join("nested.mp3")).unwrap(); // not at top level

        let files = discover(root, &mp3_only()).unwrap();
        let names: Vec<String> = files
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
            .collect();

        assert_eq!(names, vec!["UPPERCASE.MP3".to_string(), "song.mp3".to_string()]);
    }

    #[test]
    fn test_directory_named_like_track_is_ignored() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("album.mp3")).unwrap();

        let files = discover(dir.path(), &mp3_only()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_missing_directory_is_error() {
        let result = discover(Path::new("/nonexistent/music"), &mp3_only());
        assert!(matches!(result, Err(ScanError::NotADirectory(_))));
    }

    #[test]
    fn test_discover_all_keeps_going_past_bad_dirs() {
        let a = tempdir().unwrap();
        let b = tempdir().unwrap();
        File::create(a.path().join("one.mp3")).unwrap();
        File::create(b.path().join("two.mp3")).unwrap();

        let dirs = vec![
            a.path().to_path_buf(),
            PathBuf::from("/nonexistent/music"),
            b.path().to_path_buf(),
        ];
        let discovery = discover_all(&dirs, &mp3_only());

        assert_eq!(discovery.files.len(), 2);
        assert_eq!(discovery.errors.len(), 1);
    }

    #[test]
    fn test_same_dir_twice_yields_duplicates() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("one.mp3")).unwrap();

        let dirs = vec![dir.path().to_path_buf(), dir.path().to_path_buf()];
        let discovery = discover_all(&dirs, &mp3_only());
        assert_eq!(discovery.files.len(), 2);
    }

    #[test]
    fn test_has_extension() {
        let exts = vec!["mp3".to_string(), "m4a".to_string()];
        assert!(has_extension(Path::new("a.MP3"), &exts));
        assert!(has_extension(Path::new("b.m4a"), &exts));
        assert!(!has_extension(Path::new("c.wav"), &exts));
        assert!(!has_extension(Path::new("noext"), &exts));
    }
}
