//! User configuration.
//!
//! Config file: `<config_dir>/codegpt-medic/config.toml`. Every section is
//! optional; missing file or missing keys fall back to defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Service domains that must resolve and answer for the extension to work
pub const SERVICE_DOMAINS: &[&str] = &[
    "api.codegpt.co",
    "storage.codegpt.co",
    "api.github.com",
    "github.com",
];

/// Well-known landmarks used to tell a service outage from no internet at all
pub const REFERENCE_DOMAINS: &[&str] = &["google.com", "microsoft.com"];

/// HTTPS reachability timeout
pub const HTTP_TIMEOUT_SECS: u64 = 5;

/// Network check configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Domains the extension needs
    #[serde(default = "default_service_domains")]
    pub service_domains: Vec<String>,

    /// Reference landmarks for the general-connectivity check
    #[serde(default = "default_reference_domains")]
    pub reference_domains: Vec<String>,

    /// Per-request HTTPS timeout in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_service_domains() -> Vec<String> {
    SERVICE_DOMAINS.iter().map(|d| d.to_string()).collect()
}

fn default_reference_domains() -> Vec<String> {
    REFERENCE_DOMAINS.iter().map(|d| d.to_string()).collect()
}

fn default_http_timeout_secs() -> u64 {
    HTTP_TIMEOUT_SECS
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            service_domains: default_service_domains(),
            reference_domains: default_reference_domains(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl NetworkConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicConfig {
    #[serde(default)]
    pub network: NetworkConfig,
}

impl MedicConfig {
    /// Default user config path: `<config_dir>/codegpt-medic/config.toml`
    pub fn user_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Cannot determine config directory")?;
        Ok(config_dir.join("codegpt-medic").join("config.toml"))
    }

    /// Load configuration from the user config file, falling back to defaults
    pub fn load() -> Result<Self> {
        if let Ok(path) = Self::user_config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: MedicConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to the user config file
    pub fn save(&self) -> Result<()> {
        let path = Self::user_config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let toml_string = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(&path, toml_string).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_fixed_registry() {
        let config = MedicConfig::default();
        assert_eq!(config.network.service_domains.len(), 4);
        assert!(config
            .network
            .service_domains
            .iter()
            .any(|d| d == "api.codegpt.co"));
        assert_eq!(config.network.reference_domains.len(), 2);
        assert_eq!(config.network.http_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_file_fills_missing_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[network]\nhttp_timeout_secs = 10\n",
        )
        .unwrap();

        let config = MedicConfig::load_from(&path).unwrap();
        assert_eq!(config.network.http_timeout_secs, 10);
        assert_eq!(config.network.service_domains.len(), 4);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = MedicConfig::default();
        config.network.reference_domains = vec!["example.com".to_string()];

        let text = toml::to_string_pretty(&config).unwrap();
        let back: MedicConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.network.reference_domains, vec!["example.com"]);
    }
}
