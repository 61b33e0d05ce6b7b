//! Application settings stored in settings.toml.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use aps_chat::HttpGateway;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the assistant backend.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    /// Bearer credential supplied by the surrounding application's auth
    /// layer, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            backend_url: default_backend_url(),
            bearer_token: None,
        }
    }
}

impl Settings {
    /// Load settings from the settings file, falling back to defaults on
    /// any problem. A `BACKEND_URL` environment variable overrides the
    /// configured backend.
    pub fn load() -> Self {
        let mut settings = settings_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default();
        apply_backend_override(&mut settings, std::env::var("BACKEND_URL").ok());
        settings
    }

    fn load_from(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        toml::from_str(&content).unwrap_or_default()
    }

    /// Save settings to the settings file.
    pub fn save(&self) -> Result<()> {
        let path = settings_path().context("could not determine settings path")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config dir {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize settings")?;
        fs::write(&path, content)
            .with_context(|| format!("failed to write settings file {}", path.display()))
    }

    /// Build a gateway for the configured backend.
    pub fn gateway(&self) -> HttpGateway {
        let gateway = HttpGateway::new(&self.backend_url);
        match &self.bearer_token {
            Some(token) => gateway.with_bearer(token),
            None => gateway,
        }
    }
}

fn apply_backend_override(settings: &mut Settings, backend_url: Option<String>) {
    if let Some(url) = backend_url {
        if !url.is_empty() {
            settings.backend_url = url;
        }
    }
}

fn settings_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.config_dir().join("aps-assistant").join("settings.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_backend() {
        let settings = Settings::default();
        assert_eq!(settings.backend_url, "http://localhost:8000");
        assert!(settings.bearer_token.is_none());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let settings: Settings = toml::from_str("bearer_token = \"t0ken\"").unwrap();
        assert_eq!(settings.backend_url, "http://localhost:8000");
        assert_eq!(settings.bearer_token.as_deref(), Some("t0ken"));
    }

    #[test]
    fn unreadable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("missing.toml"));
        assert_eq!(settings.backend_url, "http://localhost:8000");
    }

    #[test]
    fn env_override_replaces_backend_url() {
        let mut settings = Settings::default();
        apply_backend_override(&mut settings, Some("http://backend:9000".to_string()));
        assert_eq!(settings.backend_url, "http://backend:9000");

        apply_backend_override(&mut settings, Some(String::new()));
        assert_eq!(settings.backend_url, "http://backend:9000");

        apply_backend_override(&mut settings, None);
        assert_eq!(settings.backend_url, "http://backend:9000");
    }
}
