use crate::config::AppConfig;
use crate::models::RemovalManifest;
use crate::ops::error::OpsResult;
use crate::ops::manifest::{manifest_file_name, ManifestStore};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

/// The fixed folder manifests and debug logs are written to.
#[derive(Debug, Clone)]
pub struct ExportDir {
    root: PathBuf,
}

impl ExportDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        if let Some(root) = &config.export_root {
            return Self::new(root);
        }
        let downloads = dirs::download_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
            .unwrap_or_else(std::env::temp_dir);
        Self::new(downloads.join(&config.export_subfolder))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure(&self) -> OpsResult<&Path> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
        }
        Ok(&self.root)
    }

    /// Picks a free path for `file_name`, appending " (n)" before the
    /// extension when the name is taken.
    pub fn unique_path(&self, file_name: &str) -> PathBuf {
        let candidate = self.root.join(file_name);
        if !candidate.exists() {
            return candidate;
        }

        let (stem, extension) = match file_name.rfind('.') {
            Some(dot) if dot > 0 => (&file_name[..dot], &file_name[dot..]),
            _ => (file_name, ""),
        };
        let mut counter = 1;
        loop {
            let candidate = self.root.join(format!("{} ({}){}", stem, counter, extension));
            if !candidate.exists() {
                return candidate;
            }
            counter += 1;
        }
    }

    pub fn write_text(&self, file_name: &str, contents: &str) -> OpsResult<PathBuf> {
        self.ensure()?;
        let path = self.unique_path(file_name);
        fs::write(&path, contents)?;
        Ok(path)
    }
}

/// `<app>_log_<action>_<DD-MM-YYYY>.txt`
pub fn log_file_name(app_name: &str, action: &str, date: DateTime<Local>) -> String {
    format!("{}_log_{}_{}.txt", app_name, action, date.format("%d-%m-%Y"))
}

impl ManifestStore for ExportDir {
    fn persist(&self, manifest: &RemovalManifest) -> OpsResult<PathBuf> {
        manifest.validate()?;
        let file_name = manifest_file_name(&manifest.folder, &manifest.timestamp);
        self.write_text(&file_name, &manifest.to_pretty_json()?)
    }
}
