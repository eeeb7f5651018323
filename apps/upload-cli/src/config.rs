//! CLI configuration management.
//!
//! A single JSON file at `<config dir>/videohub/config.json`, where the
//! config dir is `$XDG_CONFIG_HOME`, `~/.config`, or `%APPDATA%` on Windows.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use videohub_protocol::Privacy;
use videohub_uploader::UploaderConfig;

/// Persisted CLI settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CliConfig {
    /// Transfer settings handed to the uploader.
    pub uploader: UploaderConfig,

    /// OAuth access token. Prefer `VIDEOHUB_ACCESS_TOKEN` over storing it.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub access_token: String,

    /// Privacy used when `--privacy` is not given.
    pub default_privacy: Privacy,

    /// Category used when `--category` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_category: Option<String>,
}

impl CliConfig {
    /// Loads the configuration at `path`, or defaults if it does not exist.
    ///
    /// A file that fails to parse is logged and replaced by defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<CliConfig>(&content) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "configuration loaded");
                Ok(config)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config, using defaults"
                );
                Ok(Self::default())
            }
        }
    }

    /// Writes the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        set_permissions_0600(path);

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }
}

fn set_permissions_0600(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    config_base_dir().join("videohub").join("config.json")
}

fn config_base_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata)
    }

    #[cfg(not(target_os = "windows"))]
    {
        base_dir_from(
            std::env::var("XDG_CONFIG_HOME").ok(),
            std::env::var("HOME").ok(),
        )
    }
}

#[cfg_attr(target_os = "windows", allow(dead_code))]
fn base_dir_from(xdg_config_home: Option<String>, home: Option<String>) -> PathBuf {
    match xdg_config_home.filter(|dir| !dir.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(home.unwrap_or_else(|| "/tmp".into())).join(".config"),
    }
}
