use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::cleaner::MediaKind;

/// Extensions classified as audio; every other match is video
const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "m4a", "aac", "ogg", "oga", "opus", "wav", "wma", "alac", "aiff",
];

/// File name matcher built from the configured media patterns
#[derive(Debug, Clone)]
pub struct MediaMatcher {
    globs: GlobSet,
}

impl MediaMatcher {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = GlobBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .with_context(|| format!("Invalid media pattern: {}", pattern))?;
            builder.add(glob);
        }

        Ok(Self {
            globs: builder.build().context("Failed to build media pattern set")?,
        })
    }

    /// Media kind of `path`, or `None` when its file name matches no pattern
    pub fn classify(&self, path: &Path) -> Option<MediaKind> {
        let file_name = path.file_name()?;
        if !self.globs.is_match(file_name) {
            return None;
        }

        let is_audio = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));

        Some(if is_audio { MediaKind::Audio } else { MediaKind::Video })
    }
}

/// A media file found under the library root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredMedia {
    pub path: PathBuf,
    pub kind: MediaKind,
}

/// Walk `root` and collect every file the matcher accepts, in path order
pub fn discover_media(root: &Path, matcher: &MediaMatcher) -> Result<Vec<DiscoveredMedia>> {
    if !root.is_dir() {
        anyhow::bail!("Library root is not a directory: {}", root.display());
    }

    let walker = WalkBuilder::new(root)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut found = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) => {
                if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                    continue;
                }
                if let Some(kind) = matcher.classify(entry.path()) {
                    found.push(DiscoveredMedia {
                        path: entry.into_path(),
                        kind,
                    });
                }
            }
            Err(e) => tracing::warn!("Walk error under {}: {}", root.display(), e),
        }
    }

    tracing::debug!("Discovered {} media files under {}", found.len(), root.display());
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn matcher() -> MediaMatcher {
        MediaMatcher::new(&["*.mkv".to_string(), "*.flac".to_string()]).unwrap()
    }

    #[test]
    fn test_classify_by_pattern_and_extension() {
        let matcher = matcher();
        assert_eq!(matcher.classify(Path::new("/m/a.mkv")), Some(MediaKind::Video));
        assert_eq!(matcher.classify(Path::new("/m/A.MKV")), Some(MediaKind::Video));
        assert_eq!(matcher.classify(Path::new("/m/song.flac")), Some(MediaKind::Audio));
        assert_eq!(matcher.classify(Path::new("/m/cover.jpg")), None);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(MediaMatcher::new(&["[*.mkv".to_string()]).is_err());
    }

    #[test]
    fn test_discover_media_walks_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("Show/Season 1")).unwrap();
        fs::write(root.join("Show/Season 1/e01.mkv"), "video").unwrap();
        fs::write(root.join("Show/Season 1/e01.nfo"), "meta").unwrap();
        fs::write(root.join("album.flac"), "audio").unwrap();

        let found = discover_media(root, &matcher()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|m| m.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["e01.mkv", "album.flac"]);
        assert_eq!(found[0].kind, MediaKind::Video);
        assert_eq!(found[1].kind, MediaKind::Audio);
    }

    #[test]
    fn test_discover_media_requires_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(discover_media(&temp_dir.path().join("missing"), &matcher()).is_err());
    }
}
