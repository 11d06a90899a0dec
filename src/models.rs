use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaEntry {
    pub name: String,
    pub path: String,
    /// Lowercase, without the leading dot.
    pub extension: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaEntry {
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_string();
        let extension = path.extension()?.to_string_lossy().to_lowercase();
        Some(Self {
            name,
            path: path.to_string_lossy().to_string(),
            extension,
        })
    }

    pub fn kind(&self) -> MediaKind {
        crate::scanner::media_kind(&self.extension).unwrap_or(MediaKind::Image)
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemovalManifest {
    pub folder: String,
    pub timestamp: String,
    pub removed_files: Vec<String>,
    pub total_files: usize,
    pub removed_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeletionResult {
    pub path: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Name of the strategy that removed the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
}

impl DeletionResult {
    pub fn succeeded(path: &str, strategy: &str) -> Self {
        Self {
            path: path.to_string(),
            success: true,
            error: None,
            strategy: Some(strategy.to_string()),
        }
    }

    pub fn failed(path: &str, error: String) -> Self {
        Self {
            path: path.to_string(),
            success: false,
            error: Some(error),
            strategy: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct JobSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl JobSummary {
    pub fn from_results(results: &[DeletionResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
        }
    }
}

impl std::fmt::Display for JobSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} succeeded, {} failed", self.succeeded, self.failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobReport {
    pub results: Vec<DeletionResult>,
    pub summary: JobSummary,
}

impl JobReport {
    pub fn new(results: Vec<DeletionResult>) -> Self {
        let summary = JobSummary::from_results(&results);
        Self { results, summary }
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeletionResult> {
        self.results.iter().filter(|r| !r.success)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AboutInfo {
    pub app_name: String,
    pub version: String,
    pub description: String,
    pub website: String,
    pub license: String,
}

impl Default for AboutInfo {
    fn default() -> Self {
        Self {
            app_name: "Media Sorter".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Quickly review and sort media files with keyboard shortcuts."
                .to_string(),
            website: "https://github.com/m4tice/media-sorter".to_string(),
            license: "MIT License".to_string(),
        }
    }
}
