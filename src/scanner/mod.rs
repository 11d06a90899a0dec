use crate::models::{MediaEntry, MediaKind};
use crate::ops::paths::simplified;
use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

static IMAGE_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["jpg", "jpeg", "png", "gif", "bmp", "webp", "svg"]
        .into_iter()
        .collect()
});

static VIDEO_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["mp4", "webm", "mov", "mkv", "avi", "m4v", "ogv"]
        .into_iter()
        .collect()
});

/// Classifies a lowercase extension, `None` if it is not a supported media type.
pub fn media_kind(extension: &str) -> Option<MediaKind> {
    if IMAGE_EXTENSIONS.contains(extension) {
        Some(MediaKind::Image)
    } else if VIDEO_EXTENSIONS.contains(extension) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

pub fn is_media_extension(extension: &str) -> bool {
    media_kind(&extension.to_lowercase()).is_some()
}

/// Lists the media files directly inside one folder.
///
/// Entries come back in whatever order the filesystem yields them; the
/// review session depends on that order staying untouched.
pub struct MediaScanner {
    skip_files: HashSet<String>,
}

impl MediaScanner {
    pub fn new() -> Self {
        let mut skip_files = HashSet::new();
        skip_files.insert(".DS_Store".to_string());
        skip_files.insert("Thumbs.db".to_string());

        Self { skip_files }
    }

    pub fn should_skip_file(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|name| self.skip_files.contains(name))
            .unwrap_or(false)
    }

    pub fn list(&self, folder: &Path) -> Result<Vec<MediaEntry>> {
        if !folder.is_dir() {
            bail!("Not a folder: {}", folder.display());
        }
        let folder = simplified(
            &folder
                .canonicalize()
                .with_context(|| format!("Failed to resolve {}", folder.display()))?,
        );

        let mut entries = Vec::new();
        let walker = WalkDir::new(&folder)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true);

        for item in walker {
            let item = match item {
                Ok(item) => item,
                Err(err) => {
                    tracing::warn!(folder = %folder.display(), error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if !item.file_type().is_file() || self.should_skip_file(item.path()) {
                continue;
            }
            let Some(entry) = MediaEntry::from_path(item.path()) else {
                continue;
            };
            if media_kind(&entry.extension).is_some() {
                entries.push(entry);
            }
        }

        tracing::debug!(folder = %folder.display(), count = entries.len(), "listed media folder");
        Ok(entries)
    }
}

impl Default for MediaScanner {
    fn default() -> Self {
        Self::new()
    }
}
