use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::clusterer::DEFAULT_AMOUNT_RATIO;
use crate::error::{PennyError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default = "default_amount_ratio")]
    pub amount_ratio: f64,
    #[serde(default)]
    pub llm: LlmSettings,
}

/// Endpoint and model for the categorization collaborator. The API key is
/// deliberately not stored here; it comes from `OPENAI_API_KEY`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_amount_ratio() -> f64 {
    DEFAULT_AMOUNT_RATIO
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            amount_ratio: default_amount_ratio(),
            llm: LlmSettings::default(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("penny")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("penny")
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
        .map_err(|e| PennyError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

/// Resolved data directory. `PENNY_DATA_DIR` overrides the settings file,
/// which keeps integration tests away from the real one.
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PENNY_DATA_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    PathBuf::from(&load_settings().data_dir)
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
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.amount_ratio, 3.0);
        assert_eq!(s.llm.model, "gpt-4o");
        assert!(s.llm.base_url.starts_with("https://"));
        assert!(!s.data_dir.is_empty());
    }

    #[test]
    fn test_partial_settings_merge_with_defaults() {
        let json = r#"{"data_dir": "/tmp/penny-test"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.data_dir, "/tmp/penny-test");
        assert_eq!(s.amount_ratio, 3.0);
        assert_eq!(s.llm.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = Settings::default();
        settings.data_dir = "/tmp/penny-data".to_string();
        settings.amount_ratio = 2.5;
        settings.llm.model = "gpt-4o-mini".to_string();
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let loaded: Settings =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.amount_ratio, 2.5);
        assert_eq!(loaded.llm.model, "gpt-4o-mini");
    }
}
