//! Persistent CLI configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "cli-config.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    /// Remote sync endpoint base URL
    #[serde(default)]
    pub remote_url: Option<String>,
    /// Bearer token for the remote endpoint
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Employee ID new records are created under
    #[serde(default)]
    pub employee_id: Option<String>,
}

const fn default_config_version() -> u32 {
    1
}

pub fn default_config_path() -> Result<PathBuf, String> {
    dirs::config_dir()
        .map(|dir| dir.join("odo").join(CONFIG_FILE_NAME))
        .ok_or_else(|| "Failed to resolve CLI config directory".to_string())
}

pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn is_http_url(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("https://") || value.starts_with("http://")
}

impl CliConfig {
    pub fn load() -> Result<Self, String> {
        Self::load_from_path(&default_config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let mut config = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        config.normalize();
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, String> {
        let path = default_config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    fn normalize(&mut self) {
        if self.version == 0 {
            self.version = default_config_version();
        }
        self.remote_url = normalize_text_option(self.remote_url.take());
        self.auth_token = normalize_text_option(self.auth_token.take());
        self.employee_id = normalize_text_option(self.employee_id.take());
    }

    /// Remote URL with the `ODO_REMOTE_URL` environment override applied
    #[must_use]
    pub fn resolved_remote_url(&self) -> Option<String> {
        normalize_text_option(std::env::var("ODO_REMOTE_URL").ok())
            .or_else(|| self.remote_url.clone())
    }

    /// Auth token with the `ODO_AUTH_TOKEN` environment override applied
    #[must_use]
    pub fn resolved_auth_token(&self) -> Option<String> {
        normalize_text_option(std::env::var("ODO_AUTH_TOKEN").ok())
            .or_else(|| self.auth_token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_load_missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load_from_path(&dir.path().join("missing.json")).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cli-config.json");

        let config = CliConfig {
            version: 1,
            remote_url: Some("https://sync.example.com".to_string()),
            auth_token: Some("secret".to_string()),
            employee_id: Some("abc".to_string()),
        };
        config.save_to_path(&path).unwrap();

        let loaded = CliConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_normalize_drops_blank_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli-config.json");
        std::fs::write(
            &path,
            r#"{"version": 1, "remote_url": "  ", "auth_token": "token"}"#,
        )
        .unwrap();

        let loaded = CliConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded.remote_url, None);
        assert_eq!(loaded.auth_token, Some("token".to_string()));
    }

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("https://sync.example.com"));
        assert!(is_http_url("  http://localhost:8080"));
        assert!(!is_http_url("ftp://example.com"));
        assert!(!is_http_url("sync.example.com"));
    }
}
