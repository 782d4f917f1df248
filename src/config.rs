use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/app.json";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Shipped in sample configs; treated as "no key".
pub const API_KEY_PLACEHOLDER: &str = "your_openai_api_key_here";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage_path: String,
    pub responder: ResponderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_path: "data/chat.db".to_string(),
            responder: ResponderConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub request_timeout_secs: u64,
    pub mock_delay_min_ms: u64,
    pub mock_delay_max_ms: u64,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            request_timeout_secs: 30,
            mock_delay_min_ms: 1000,
            mock_delay_max_ms: 3000,
        }
    }
}

impl ResponderConfig {
    /// The API key, unless it is missing, blank or the placeholder.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != API_KEY_PLACEHOLDER)
    }
}

impl AppConfig {
    /// A key from the environment wins over the file.
    pub fn with_api_key_override(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|key| !key.trim().is_empty()) {
            self.responder.api_key = Some(key);
        }
        self
    }
}

pub fn load_config(path: &str) -> AppConfig {
    load_config_file(path).with_api_key_override(env::var(API_KEY_ENV).ok())
}

fn load_config_file(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");
        fs::write(&path, r#"{"responder":{"model":"gpt-4o-mini"}}"#).unwrap();

        let config = load_config_file(path.to_str().unwrap());
        assert_eq!(config.responder.model, "gpt-4o-mini");
        assert_eq!(config.responder.base_url, "https://api.openai.com/v1");
        assert_eq!(config.storage_path, "data/chat.db");
    }

    #[test]
    fn malformed_or_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{").unwrap();

        assert_eq!(load_config_file(path.to_str().unwrap()).responder.mock_delay_max_ms, 3000);
        let missing = dir.path().join("missing.json");
        assert!(load_config_file(missing.to_str().unwrap()).responder.api_key.is_none());
    }

    #[test]
    fn placeholder_key_is_no_credential() {
        let mut config = ResponderConfig::default();
        assert_eq!(config.credential(), None);

        config.api_key = Some(API_KEY_PLACEHOLDER.to_string());
        assert_eq!(config.credential(), None);

        config.api_key = Some(" sk-abc ".to_string());
        assert_eq!(config.credential(), Some("sk-abc"));
    }

    #[test]
    fn environment_key_overrides_file() {
        let config = AppConfig::default().with_api_key_override(Some("sk-env".to_string()));
        assert_eq!(config.responder.credential(), Some("sk-env"));

        let kept = config.with_api_key_override(Some("  ".to_string()));
        assert_eq!(kept.responder.credential(), Some("sk-env"));
    }
}
