//! Engine configuration.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use shop_commerce::cart::PricingRules;
use shop_commerce::money::Currency;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Backend used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Environment variable overriding [`StorefrontConfig::api_base_url`].
pub const ENV_API_URL: &str = "SHOP_API_URL";
/// Environment variable overriding [`StorefrontConfig::data_dir`].
pub const ENV_DATA_DIR: &str = "SHOP_DATA_DIR";
/// Environment variable overriding [`StorefrontConfig::request_timeout_secs`].
pub const ENV_REQUEST_TIMEOUT: &str = "SHOP_REQUEST_TIMEOUT_SECS";

/// Storefront configuration file (`shop.toml` or `shop.json`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorefrontConfig {
    /// Base URL of the backend API.
    pub api_base_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Where the identity and guest cart are stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Currency prices are quoted in.
    pub currency: Currency,

    /// Shipping and tax rates for the cart summary.
    pub pricing: PricingRules,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 30,
            data_dir: None,
            currency: Currency::default(),
            pricing: PricingRules::default(),
        }
    }
}

impl StorefrontConfig {
    /// Load config from a file; `.json` files are JSON, anything else TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let parsed = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            toml::from_str(&content).map_err(|e| e.to_string())
        };
        parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Apply `SHOP_*` environment overrides.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from any variable lookup.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(value) = lookup(ENV_REQUEST_TIMEOUT) {
            self.request_timeout_secs = value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidEnv {
                    var: ENV_REQUEST_TIMEOUT.to_string(),
                    value,
                })?;
        }
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The configured data directory, or `~/.local/share/shop`.
    pub fn data_dir_or_default(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".local").join("share").join("shop"),
        None => std::env::temp_dir().join("shop"),
    }
}
