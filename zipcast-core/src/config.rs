use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::model::Units;

/// Backend used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Base URL of the weather backend, e.g. "http://localhost:5000".
    pub base_url: Option<String>,

    /// Units preselected in the search form, "metric" or "imperial".
    pub default_units: Option<String>,
}

impl Config {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn set_base_url(&mut self, url: String) {
        self.base_url = Some(url);
    }

    /// Units for a fresh form; imperial when unset.
    pub fn default_units(&self) -> Result<Units> {
        match self.default_units.as_deref() {
            Some(s) => Units::try_from(s),
            None => Ok(Units::default()),
        }
    }

    pub fn set_default_units(&mut self, units: Units) {
        self.default_units = Some(units.as_str().to_string());
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "zipcast", "zipcast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the key-value store holding search history.
    pub fn store_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().join("store.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        let cfg = Config::default();
        assert_eq!(cfg.base_url(), DEFAULT_BASE_URL);
        assert_eq!(cfg.default_units().unwrap(), Units::Imperial);
    }

    #[test]
    fn set_values_override_defaults() {
        let mut cfg = Config::default();
        cfg.set_base_url("https://weather.example".into());
        cfg.set_default_units(Units::Metric);

        assert_eq!(cfg.base_url(), "https://weather.example");
        assert_eq!(cfg.default_units().unwrap(), Units::Metric);
    }

    #[test]
    fn invalid_units_in_file_are_reported() {
        let cfg: Config = toml::from_str(r#"default_units = "rankine""#).unwrap();
        let err = cfg.default_units().unwrap_err();
        assert!(err.to_string().contains("Unknown units"));
    }

    #[test]
    fn toml_roundtrip() {
        let mut cfg = Config::default();
        cfg.set_base_url("http://127.0.0.1:5000".into());
        cfg.set_default_units(Units::Metric);

        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.base_url(), "http://127.0.0.1:5000");
        assert_eq!(back.default_units().unwrap(), Units::Metric);
    }
}
