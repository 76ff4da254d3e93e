use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use crate::{client::DEFAULT_BASE_URL, dashboard::Tab};

/// Environment variable that takes precedence over the stored access key.
pub const ACCESS_KEY_ENV: &str = "WEATHERSTACK_ACCESS_KEY";

/// Provider access key. Shared read-only by all units; never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// access_key = "..."
/// base_url = "https://api.weatherstack.com"
/// default_tab = "marine"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub access_key: Option<String>,

    /// Provider host; defaults to the public weatherstack endpoint.
    pub base_url: Option<String>,

    /// Tab opened first by the interactive dashboard: "current", "historical" or "marine".
    pub default_tab: Option<String>,
}

impl Config {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn default_tab(&self) -> Result<Tab> {
        match &self.default_tab {
            Some(s) => Tab::try_from(s.as_str()),
            None => Ok(Tab::default()),
        }
    }

    /// Credential from the process environment, falling back to the config file.
    pub fn credential(&self) -> Result<Credential> {
        self.credential_with_env(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::credential`] with an explicit environment lookup.
    pub fn credential_with_env(&self, env: impl Fn(&str) -> Option<String>) -> Result<Credential> {
        env(ACCESS_KEY_ENV)
            .or_else(|| self.access_key.clone())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .map(Credential::new)
            .ok_or_else(|| {
                anyhow!(
                    "No access key configured.\n\
                     Hint: run `weather-dash configure` or set {ACCESS_KEY_ENV}."
                )
            })
    }

    pub fn set_access_key(&mut self, key: String) {
        self.access_key = Some(key);
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dash", "weather-dash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
