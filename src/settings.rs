use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{DisputeError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the disputed-transactions spreadsheet (.xlsx or .csv).
    #[serde(default = "default_source_file")]
    pub source_file: String,
    /// Directory scanned for per-day PDF attachments.
    #[serde(default = "default_attachments_dir")]
    pub attachments_dir: String,
}

fn default_source_file() -> String {
    "disputed.xlsx".to_string()
}

fn default_attachments_dir() -> String {
    "data".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_file: default_source_file(),
            attachments_dir: default_attachments_dir(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("disputes")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| DisputeError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            source_file: "/tmp/disputed.xlsx".to_string(),
            attachments_dir: "/tmp/pdfs".to_string(),
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.source_file, "/tmp/disputed.xlsx");
        assert_eq!(loaded.attachments_dir, "/tmp/pdfs");
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.source_file, "disputed.xlsx");
        assert_eq!(s.attachments_dir, "data");
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"source_file": "q1.xlsx"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.source_file, "q1.xlsx");
        assert_eq!(s.attachments_dir, "data");
    }
}
