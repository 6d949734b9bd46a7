//! Settings file handling.
//!
//! Settings live in `settings.json` under the platform config directory. A
//! missing or unreadable file falls back to defaults.

use shared::settings::AppSettings;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Get the config file path
pub fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com.local", "Midoffice", "Midoffice")
        .map(|proj| proj.config_dir().join("settings.json"))
}

pub fn load_settings(path: &Path) -> Result<AppSettings, SettingsError> {
    let bytes = fs::read(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<(), SettingsError> {
    let json = serde_json::to_string_pretty(settings)?;
    let write = |p: &Path| -> io::Result<()> {
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(p, json.as_bytes())
    };
    write(path).map_err(|source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Load settings from `path`, or return defaults.
///
/// The flag is true when the settings came from disk. A fresh install writes the
/// defaults so they can be edited.
pub fn load_or_default(path: Option<&Path>) -> (AppSettings, bool) {
    let Some(path) = path else {
        return (AppSettings::default(), false);
    };
    if path.exists() {
        match load_settings(path) {
            Ok(settings) => return (settings, true),
            Err(e) => {
                tracing::warn!("{}; using default settings", e);
                return (AppSettings::default(), false);
            }
        }
    }

    let defaults = AppSettings::default();
    match save_settings(path, &defaults) {
        Ok(()) => tracing::info!(path = %path.display(), "wrote default settings"),
        Err(e) => tracing::error!("{}", e),
    }
    (defaults, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::category::Category;

    #[test]
    fn test_first_run_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let (settings, from_disk) = load_or_default(Some(&path));

        assert!(!from_disk);
        assert!(path.exists());
        assert_eq!(settings.model.gemini_model, "gemini-3-flash-preview");
        assert_eq!(load_settings(&path).unwrap().default_category, Category::DataInquiry);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"model":{"gemini_model":"gemini-2.5-flash"},"default_category":"office_assistant"}"#,
        )
        .unwrap();

        let (settings, from_disk) = load_or_default(Some(&path));

        assert!(from_disk);
        assert_eq!(settings.model.gemini_model, "gemini-2.5-flash");
        assert_eq!(settings.model.timeout_secs, 120);
        assert_eq!(settings.default_category, Category::OfficeAssistant);
        assert!(settings.confirm_clear);
        assert!(settings.model.gemini_auth.api_key.is_none());
    }

    #[test]
    fn test_invalid_file_falls_back_without_overwriting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let (settings, from_disk) = load_or_default(Some(&path));

        assert!(!from_disk);
        assert!(settings.system_instruction.is_none());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
        assert!(matches!(
            load_settings(&path),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn test_save_roundtrip_keeps_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = AppSettings::default();
        settings.model.gemini_auth.api_key = Some("secret".into());

        save_settings(&path, &settings).unwrap();

        let loaded = load_settings(&path).unwrap();
        assert_eq!(loaded.model.gemini_auth.api_key.as_deref(), Some("secret"));
    }
}
