use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::persona::DEFAULT_MODEL;

/// Environment variables checked for the API credential, in order.
pub const API_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load from an explicit path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// API key from the environment first, then the config file.
    pub fn resolve_api_key(&self) -> Result<String> {
        Self::api_key_with(|name| std::env::var(name).ok(), self.api_key.as_deref())
    }

    fn api_key_with(
        lookup: impl Fn(&str) -> Option<String>,
        fallback: Option<&str>,
    ) -> Result<String> {
        API_KEY_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .chain(fallback.map(str::to_string))
            .find(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured. Set {} (or add \"api_key\" to {})",
                    API_KEY_VARS[0],
                    Self::get_config_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|_| "the config file".to_string())
                )
            })
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("knowyourbody").join("config.json"))
    }
}
