//! CLI configuration (`~/.config/dirscope/dirscope.toml`).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "dirscope.toml";

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Override for the cache directory; defaults to the data dir.
    #[serde(default)]
    pub root: Option<String>,
    /// Reject cache blobs larger than this many bytes.
    #[serde(default)]
    pub max_blob_bytes: Option<usize>,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn home_dir() -> Result<PathBuf> {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .context("Could not determine home directory")
}

/// Config directory path (`~/.config/dirscope/`).
pub fn config_dir() -> Result<PathBuf> {
    Ok(home_dir()?.join(".config").join("dirscope"))
}

/// Canonical config file path.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Default root for the file-backed session store
/// (`~/.local/share/dirscope/sessions`).
pub fn default_store_root() -> Result<PathBuf> {
    Ok(home_dir()?
        .join(".local")
        .join("share")
        .join("dirscope")
        .join("sessions"))
}

/// Load the config, falling back to defaults when the file is absent.
pub fn load_config() -> Result<CliConfig> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(CliConfig::default());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config at {}", path.display()))
}
