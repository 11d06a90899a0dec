use crate::models::RemovalManifest;
use crate::ops::error::{validation_error, OpsError, OpsResult};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::path::PathBuf;

/// Persistence for exported manifests.
pub trait ManifestStore {
    /// Writes the manifest and returns where it landed.
    fn persist(&self, manifest: &RemovalManifest) -> OpsResult<PathBuf>;
}

/// ISO-8601 in UTC with millisecond precision, e.g. `2026-10-18T09:30:00.000Z`.
pub fn manifest_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `<folderName>_<timestamp>.json`, with `:` and `.` in the timestamp made file-safe.
pub fn manifest_file_name(folder: &str, timestamp: &str) -> String {
    let folder_name = folder
        .split(['/', '\\'])
        .filter(|part| !part.is_empty())
        .last()
        .unwrap_or("folder");
    let stamp: String = timestamp
        .chars()
        .map(|c| if c == ':' || c == '.' { '-' } else { c })
        .collect();
    format!("{}_{}.json", folder_name, stamp)
}

/// Pulls `removedFiles` out of manifest text. Only the shape of that one
/// field is checked, so hand-edited manifests still run.
pub fn parse_removed_files(text: &str) -> OpsResult<Vec<String>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| OpsError::Validation(format!("not valid JSON ({})", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| validation_error("expected a JSON object"))?;
    let removed = object
        .get("removedFiles")
        .ok_or_else(|| validation_error("missing \"removedFiles\""))?
        .as_array()
        .ok_or_else(|| validation_error("\"removedFiles\" must be a list"))?;

    let mut paths = Vec::with_capacity(removed.len());
    for (index, item) in removed.iter().enumerate() {
        let path = item.as_str().ok_or_else(|| {
            OpsError::Validation(format!("\"removedFiles\"[{}] is not a string", index))
        })?;
        paths.push(path.to_string());
    }

    if paths.is_empty() {
        return Err(OpsError::EmptyJob);
    }
    Ok(paths)
}

impl RemovalManifest {
    pub fn from_json(text: &str) -> OpsResult<Self> {
        let manifest: RemovalManifest = serde_json::from_str(text)
            .map_err(|e| OpsError::Validation(format!("unexpected manifest layout ({})", e)))?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> OpsResult<()> {
        if self.removed_count != self.removed_files.len() {
            return Err(OpsError::Validation(format!(
                "removedCount is {} but {} files are listed",
                self.removed_count,
                self.removed_files.len()
            )));
        }
        Ok(())
    }

    pub fn to_pretty_json(&self) -> OpsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
