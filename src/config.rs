use crate::ops::error::{OpsError, OpsResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_DIR_NAME: &str = "media-sorter";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Prefix for debug log file names.
    pub app_name: String,
    /// Folder under Downloads that receives manifests and logs.
    pub export_subfolder: String,
    /// Overrides the Downloads-based export folder.
    pub export_root: Option<PathBuf>,
    pub debug_enabled: bool,
    pub debug_log_capacity: usize,
    pub missing_sample_size: usize,
    /// Allow the shell-command strategies after the trash APIs fail.
    pub shell_fallbacks: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: APP_DIR_NAME.to_string(),
            export_subfolder: "MediaSorter".to_string(),
            export_root: None,
            debug_enabled: false,
            debug_log_capacity: crate::audit::DEFAULT_CAPACITY,
            missing_sample_size: 5,
            shell_fallbacks: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialAppConfig {
    pub app_name: Option<String>,
    pub export_subfolder: Option<String>,
    pub export_root: Option<PathBuf>,
    pub debug_enabled: Option<bool>,
    pub debug_log_capacity: Option<usize>,
    pub missing_sample_size: Option<usize>,
    pub shell_fallbacks: Option<bool>,
}

fn validate_file_name_part(field: &str, value: &str) -> OpsResult<()> {
    if value.trim().is_empty() {
        return Err(OpsError::Config(format!("{} must not be empty", field)));
    }
    if value.len() > 64 {
        return Err(OpsError::Config(format!("{} must be at most 64 characters", field)));
    }
    if value
        .chars()
        .any(|c| c.is_control() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
    {
        return Err(OpsError::Config(format!(
            "{} contains characters not allowed in file names",
            field
        )));
    }
    Ok(())
}

impl AppConfig {
    pub fn validate(&self) -> OpsResult<()> {
        validate_file_name_part("app_name", &self.app_name)?;
        validate_file_name_part("export_subfolder", &self.export_subfolder)?;
        if self.debug_log_capacity == 0 || self.debug_log_capacity > 100_000 {
            return Err(OpsError::Config(
                "debug_log_capacity must be 1-100000".to_string(),
            ));
        }
        if self.missing_sample_size == 0 || self.missing_sample_size > 100 {
            return Err(OpsError::Config(
                "missing_sample_size must be 1-100".to_string(),
            ));
        }
        if let Some(root) = &self.export_root {
            if !root.is_absolute() {
                return Err(OpsError::Config(
                    "export_root must be an absolute path".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Applies the fields that are set, keeping `self` unchanged if the
    /// result would be invalid.
    pub fn apply(&mut self, update: PartialAppConfig) -> OpsResult<()> {
        let mut next = self.clone();
        if let Some(app_name) = update.app_name {
            next.app_name = app_name;
        }
        if let Some(export_subfolder) = update.export_subfolder {
            next.export_subfolder = export_subfolder;
        }
        if let Some(export_root) = update.export_root {
            next.export_root = Some(export_root);
        }
        if let Some(debug_enabled) = update.debug_enabled {
            next.debug_enabled = debug_enabled;
        }
        if let Some(debug_log_capacity) = update.debug_log_capacity {
            next.debug_log_capacity = debug_log_capacity;
        }
        if let Some(missing_sample_size) = update.missing_sample_size {
            next.missing_sample_size = missing_sample_size;
        }
        if let Some(shell_fallbacks) = update.shell_fallbacks {
            next.shell_fallbacks = shell_fallbacks;
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn load_from(path: &Path) -> OpsResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&text)
            .map_err(|e| OpsError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> OpsResult<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Settings from the default location, falling back to defaults when
    /// the file is unreadable.
    pub fn load_or_default() -> Self {
        let Some(path) = settings_path() else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "using default settings");
                Self::default()
            }
        }
    }
}

/// `<config_dir>/media-sorter/settings.json`
pub fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("settings.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_apply_rejects_out_of_range_and_keeps_old_values() {
        let mut config = AppConfig::default();
        let result = config.apply(PartialAppConfig {
            debug_enabled: Some(true),
            missing_sample_size: Some(0),
            ..Default::default()
        });
        assert!(matches!(result, Err(OpsError::Config(_))));
        assert!(!config.debug_enabled);
        assert_eq!(config.missing_sample_size, 5);
    }

    #[test]
    fn test_apply_sets_given_fields() {
        let mut config = AppConfig::default();
        config
            .apply(PartialAppConfig {
                debug_log_capacity: Some(50),
                shell_fallbacks: Some(false),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.debug_log_capacity, 50);
        assert!(!config.shell_fallbacks);
        assert_eq!(config.export_subfolder, "MediaSorter");
    }

    #[test]
    fn test_rejects_path_separators_in_names() {
        let config = AppConfig {
            export_subfolder: "../escape".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_relative_export_root() {
        let config = AppConfig {
            export_root: Some(PathBuf::from("relative/dir")),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("settings.json");
        let config = AppConfig {
            debug_enabled: true,
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, r#"{ "debug_enabled": true }"#).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert!(loaded.debug_enabled);
        assert_eq!(loaded.debug_log_capacity, crate::audit::DEFAULT_CAPACITY);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = AppConfig::load_from(&temp_dir.path().join("none.json")).unwrap();
        assert_eq!(loaded, AppConfig::default());
    }
}
