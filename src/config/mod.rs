//! Configuration module
//!
//! Handles loading and saving ScrollRelay configuration.

mod relay;

pub use relay::{
    RelayConfig, DEFAULT_OVERLAP_HEIGHT, DEFAULT_SCROLL_TRIGGER_THRESHOLD, DEFAULT_SPLIT_RATIO,
};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::policy::{AppCategory, ApplicationPolicy, ApplicationPolicyStore};
use crate::screen::{DisplayTopology, RawDisplayDescriptor, Rect, RegionSettings, SplitType};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Relay tunables
    #[serde(default)]
    pub relay: RelayConfig,

    /// Displays for the simulated host
    #[serde(default)]
    pub displays: Vec<RawDisplayDescriptor>,

    /// Per-display or per-region overrides
    #[serde(default)]
    pub regions: HashMap<String, RegionSettings>,

    /// Application policies (merged over the built-in ones)
    #[serde(default)]
    pub applications: Vec<ApplicationPolicy>,
}

/// General configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging
    #[serde(default)]
    pub verbose: bool,
    /// Skip the built-in application policies
    #[serde(default)]
    pub no_builtin_policies: bool,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.relay = config.relay.sanitized();
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration from the default location
    pub fn load_default() -> ConfigResult<Self> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("scrollrelay/config.toml")),
            Some(PathBuf::from("./scrollrelay.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                return Self::load(path);
            }
        }

        // Return default config if no file found
        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Build the policy store this configuration describes
    pub fn policy_store(&self) -> ApplicationPolicyStore {
        let mut store = if self.general.no_builtin_policies {
            ApplicationPolicyStore::new()
        } else {
            ApplicationPolicyStore::with_builtin_policies()
        };

        for policy in &self.applications {
            store.upsert(policy.clone());
        }
        store
    }

    /// Build an empty topology carrying this configuration's region settings.
    ///
    /// Regions appear once the host reports its displays.
    pub fn topology(&self) -> DisplayTopology {
        let mut topology =
            DisplayTopology::new(self.relay.default_split_type, self.relay.default_split_ratio);
        for (id, settings) in &self.regions {
            topology.configure(id, settings.clone());
        }
        topology
    }
}

/// Generate a sample configuration file
pub fn generate_sample_config() -> ConfigResult<String> {
    let config = Config {
        displays: vec![
            RawDisplayDescriptor::new("DISPLAY1", Rect::new(0, 0, 1920, 1080)),
            RawDisplayDescriptor::new("DISPLAY2", Rect::new(1920, 0, 1080, 1920)),
        ],
        regions: {
            let mut m = HashMap::new();
            m.insert(
                "DISPLAY2".to_string(),
                RegionSettings {
                    split_type: Some(SplitType::TopBottom),
                    split_ratio: Some(0.5),
                    overlap_height: Some(40),
                    ..Default::default()
                },
            );
            m
        },
        applications: vec![ApplicationPolicy {
            title_pattern: Some("*.pdf*".to_string()),
            app_category: AppCategory::Document,
            ..ApplicationPolicy::new("sumatrapdf")
        }],
        ..Default::default()
    };

    Ok(toml::to_string_pretty(&config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.relay, RelayConfig::default());
        assert!(config.displays.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let mut config = Config::default();
        config.relay.scroll_trigger_threshold = 20;
        config.relay.deny("Games");
        let file = NamedTempFile::new().unwrap();

        config.save(file.path()).unwrap();

        let loaded = Config::load(file.path()).unwrap();
        assert_eq!(loaded.relay.scroll_trigger_threshold, 20);
        assert!(loaded.relay.deny_list.contains("games"));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_sample_config() {
        let sample = generate_sample_config().unwrap();
        let parsed: Config = toml::from_str(&sample).unwrap();

        assert_eq!(parsed.displays.len(), 2);
        assert_eq!(
            parsed.regions.get("DISPLAY2").and_then(|s| s.split_type),
            Some(SplitType::TopBottom)
        );
        assert_eq!(parsed.applications[0].match_key, "sumatrapdf");
    }

    #[test]
    fn test_policy_store_merges_builtins() {
        let mut config = Config::default();
        let mut chrome = ApplicationPolicy::new("chrome");
        chrome.relay_enabled = false;
        config.applications.push(chrome);

        let store = config.policy_store();
        assert!(!store.policy_for("chrome", "x - Google Chrome").relay_enabled);
        assert!(store.policy_for("code", "main.rs - Visual Studio Code").relay_enabled);
    }
}
