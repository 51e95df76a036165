//! plotmap configuration
//!
//! Built-in defaults, overlaid by `~/.config/plotmap/config.yaml` (or an
//! explicit file), overlaid by `PLOTMAP_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_BIND: &str = "PLOTMAP_BIND";
pub const ENV_API_BASE: &str = "PLOTMAP_API_BASE";
pub const ENV_API_TOKEN: &str = "PLOTMAP_API_TOKEN";
pub const ENV_RELAY_MAX_AGE: &str = "PLOTMAP_RELAY_MAX_AGE";
pub const ENV_VIEW_IDLE: &str = "PLOTMAP_VIEW_IDLE";
pub const ENV_MAX_VIEWS: &str = "PLOTMAP_MAX_VIEWS";

fn parse_env<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key,
        value: raw.to_string(),
    })
}

/// Result type for configuration loading
pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Address the web service binds to
    pub bind: String,
    /// Base URL of the listing REST API
    pub api_base_url: String,
    /// Bearer token for the listing API
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    /// `Cache-Control: max-age` sent with relayed SVGs, in seconds
    pub relay_cache_max_age: u32,
    pub user_agent: String,
    /// Open views untouched for this many seconds are dropped
    pub view_idle_secs: u64,
    /// Open views kept at most; the least recently used goes first
    pub max_views: usize,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            api_base_url: "http://127.0.0.1:8080/api".to_string(),
            api_token: None,
            relay_cache_max_age: 3600,
            user_agent: concat!("plotmap/", env!("CARGO_PKG_VERSION")).to_string(),
            view_idle_secs: 1800,
            max_views: 1000,
        }
    }
}

impl PlotConfig {
    /// `~/.config/plotmap/config.yaml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("plotmap")
            .join("config.yaml")
    }

    /// Load the full stack. An explicit `path` must exist; the default one may not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::from_file(&default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Overlay environment values. `lookup` is injected so tests need not touch the process env.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup(ENV_BIND) {
            self.bind = bind;
        }
        if let Some(base) = lookup(ENV_API_BASE) {
            self.api_base_url = base;
        }
        if let Some(token) = lookup(ENV_API_TOKEN).filter(|t| !t.is_empty()) {
            self.api_token = Some(token);
        }
        if let Some(raw) = lookup(ENV_RELAY_MAX_AGE) {
            self.relay_cache_max_age = parse_env(ENV_RELAY_MAX_AGE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_VIEW_IDLE) {
            self.view_idle_secs = parse_env(ENV_VIEW_IDLE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_VIEWS) {
            self.max_views = parse_env(ENV_MAX_VIEWS, &raw)?;
        }
        Ok(())
    }

    /// `Cache-Control` header value for relayed SVGs
    pub fn relay_cache_control(&self) -> String {
        format!("public, max-age={}", self.relay_cache_max_age)
    }
}
