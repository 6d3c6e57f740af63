//! Configuration management for Cytoscan.
//!
//! Loads settings from `$CYTOSCAN_CONFIG`, /etc/cytoscan/config.toml or
//! /var/lib/cytoscan/config.toml, in that order, or uses defaults.

use crate::error::ConfigError;
use crate::wizard::MissingPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "CYTOSCAN_CONFIG";

/// Config file path
pub const CONFIG_PATH: &str = "/etc/cytoscan/config.toml";

/// Default config file path for fallback
pub const DEFAULT_CONFIG_PATH: &str = "/var/lib/cytoscan/config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:7870".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Locations of the pre-fit inference artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    #[serde(default = "default_scaler_path")]
    pub scaler_path: PathBuf,

    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
}

fn default_scaler_path() -> PathBuf {
    PathBuf::from("/var/lib/cytoscan/scaler.json")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("/var/lib/cytoscan/model.json")
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            scaler_path: default_scaler_path(),
            model_path: default_model_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Idle time after which a session is discarded
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// How often expired sessions are swept
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_cookie_name() -> String {
    "cytoscan_session".to_string()
}

fn default_ttl() -> u64 {
    1_800 // 30 minutes
}

fn default_sweep_interval() -> u64 {
    60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_secs: default_ttl(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Substitute 0.0 for missing features instead of rejecting the summary
    #[serde(default)]
    pub zero_fill_missing: bool,
}

impl WizardConfig {
    pub fn missing_policy(&self) -> MissingPolicy {
        if self.zero_fill_missing {
            MissingPolicy::ZeroFill
        } else {
            MissingPolicy::Reject
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub artifacts: ArtifactConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub wizard: WizardConfig,
}

impl Config {
    /// Load config from the standard locations, falling back to defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            match Self::load_from_path(Path::new(&path)) {
                Ok(config) => return config,
                Err(e) => warn!("Ignoring {}: {}", CONFIG_ENV, e),
            }
        }

        Self::load_from_path(Path::new(CONFIG_PATH))
            .or_else(|_| Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH)))
            .unwrap_or_else(|e| {
                warn!("Config not found, using defaults: {}", e);
                Config::default()
            })
    }

    /// Load config from specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
