/// Configuration management for hubctl
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
const CONFIG_DIR: &str = ".hubctl";
const CONFIG_FILE: &str = "config.yaml";
const MASK: &str = "******";

/// Main client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend connection and credentials
    #[serde(default)]
    pub system: SystemConfig,

    /// Logged-in user
    #[serde(default)]
    pub user: UserConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Base URL of the management backend (can also be set via HUBCTL_BASE_URL env var)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Auth token written by `login` (can also be set via HUBCTL_TOKEN env var)
    #[serde(default)]
    pub token: String,

    /// API key for the backend's open API
    #[serde(default)]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Stored user identity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub name: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: String::new(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    /// Default config file location: ~/.hubctl/config.yaml
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load configuration from a YAML file, falling back to defaults when it does not exist
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            ClientConfig::default()
        };
        Ok(config)
    }

    /// Load configuration and apply environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply HUBCTL_* overrides from the given lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("HUBCTL_BASE_URL").filter(|v| !v.is_empty()) {
            self.system.base_url = url;
        }
        if let Some(token) = lookup("HUBCTL_TOKEN").filter(|v| !v.is_empty()) {
            self.system.token = token;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;

        if self.system.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// Parsed base URL, always ending in '/' so relative paths join under it
    pub fn base_url(&self) -> Result<Url> {
        let raw = self.system.base_url.trim();
        let with_slash = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{}/", raw)
        };

        let url = Url::parse(&with_slash)
            .with_context(|| format!("Invalid base_url: {}", self.system.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("base_url must use http or https: {}", self.system.base_url);
        }
        Ok(url)
    }

    /// Persist configuration to a YAML file, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Copy of the configuration with secrets replaced, for display
    pub fn masked(&self) -> Self {
        let mut config = self.clone();
        if !config.system.token.is_empty() {
            config.system.token = MASK.to_string();
        }
        if !config.system.api_key.is_empty() {
            config.system.api_key = MASK.to_string();
        }
        config
    }

    /// Record a successful login
    pub fn set_login(&mut self, username: &str, token: &str) {
        self.system.token = token.to_string();
        self.user.name = username.to_string();
    }

    /// Forget the stored credentials
    pub fn clear_login(&mut self) {
        self.system.token.clear();
        self.user.name.clear();
    }
}
