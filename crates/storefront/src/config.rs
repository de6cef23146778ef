//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `SAVAT_API_BASE_URL` - Backend REST API (default: `https://fakestoreapi.com`)
//! - `SAVAT_STORAGE_PATH` - Local storage file (default: `<data dir>/savat/storage.json`)
//! - `SAVAT_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 15)
//! - `SAVAT_CACHE_TTL_SECS` - Product cache time-to-live (default: 300)
//! - `SAVAT_CACHE_CAPACITY` - Product cache entries (default: 1000)
//! - `SAVAT_QUANTITY_CEILING` - Maximum units per cart line (default: 99)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::cart::DEFAULT_QUANTITY_CEILING;

const DEFAULT_API_BASE_URL: &str = "https://fakestoreapi.com";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_CACHE_CAPACITY: u64 = 1000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend REST API settings
    pub api: ApiConfig,
    /// File backing local storage
    pub storage_path: PathBuf,
    /// Maximum units allowed on one cart line
    pub quantity_ceiling: u32,
}

/// Backend REST API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, always ending in `/` so relative joins append
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long product lookups stay cached
    pub cache_ttl: Duration,
    /// Maximum cached product lookups
    pub cache_capacity: u64,
}

impl ApiConfig {
    /// Configuration for `base_url` with default timeouts and cache sizing.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url: with_trailing_slash(base_url),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("SAVAT_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("SAVAT_API_BASE_URL".to_string(), e.to_string())
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "SAVAT_API_BASE_URL".to_string(),
                format!("unsupported scheme '{}'", base_url.scheme()),
            ));
        }

        let mut api = ApiConfig::new(base_url);
        api.timeout = Duration::from_secs(parse_or_default(
            &lookup,
            "SAVAT_HTTP_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?);
        api.cache_ttl = Duration::from_secs(parse_or_default(
            &lookup,
            "SAVAT_CACHE_TTL_SECS",
            DEFAULT_CACHE_TTL_SECS,
        )?);
        api.cache_capacity =
            parse_or_default(&lookup, "SAVAT_CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?;

        let storage_path = lookup("SAVAT_STORAGE_PATH")
            .filter(|path| !path.trim().is_empty())
            .map_or_else(default_storage_path, PathBuf::from);

        let quantity_ceiling =
            parse_or_default(&lookup, "SAVAT_QUANTITY_CEILING", DEFAULT_QUANTITY_CEILING)?;
        if quantity_ceiling == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SAVAT_QUANTITY_CEILING".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            api,
            storage_path,
            quantity_ceiling,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Per-user data directory, or a dot directory under the working directory.
fn default_storage_path() -> PathBuf {
    dirs::data_dir().map_or_else(
        || PathBuf::from(".savat").join("storage.json"),
        |dir| dir.join("savat").join("storage.json"),
    )
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "https://fakestoreapi.com/");
        assert_eq!(config.api.timeout, Duration::from_secs(15));
        assert_eq!(config.api.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.api.cache_capacity, 1000);
        assert_eq!(config.quantity_ceiling, 99);
        assert!(config.storage_path.ends_with("storage.json"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SAVAT_API_BASE_URL", "http://localhost:8080/api"),
            ("SAVAT_STORAGE_PATH", "/tmp/savat.json"),
            ("SAVAT_QUANTITY_CEILING", "10"),
            ("SAVAT_CACHE_TTL_SECS", "0"),
        ])
        .unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:8080/api/");
        assert_eq!(config.storage_path, PathBuf::from("/tmp/savat.json"));
        assert_eq!(config.quantity_ceiling, 10);
        assert_eq!(config.api.cache_ttl, Duration::ZERO);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("SAVAT_API_BASE_URL", "not a url")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "SAVAT_API_BASE_URL"
        ));
        assert!(load(&[("SAVAT_API_BASE_URL", "ftp://files.example.com")]).is_err());
        assert!(load(&[("SAVAT_QUANTITY_CEILING", "0")]).is_err());
        assert!(load(&[("SAVAT_HTTP_TIMEOUT_SECS", "soon")]).is_err());
    }
}
