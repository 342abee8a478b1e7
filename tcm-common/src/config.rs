//! Configuration loading and catalog endpoint resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable TOML file is never fatal: resolution logs a warning
//! and continues with the remaining sources.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Compiled default for the catalog API base URL
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Compiled default for per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "TCM_API_URL";

/// Environment variable overriding the request timeout (seconds)
pub const TIMEOUT_ENV: &str = "TCM_TIMEOUT_SECS";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Catalog API base URL, e.g. `https://catalog.example.org/api`
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }
}

/// Values supplied on the command line; `None` defers to lower-priority sources
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Explicit config file; replaces the platform search when set
    pub config_path: Option<PathBuf>,
}

/// Fully resolved client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL without trailing slash
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_level: default_log_level(),
        }
    }
}

/// Resolve client configuration from all sources
pub fn resolve_client_config(overrides: &ConfigOverrides) -> Result<ClientConfig> {
    let toml_config = load_toml_config(overrides.config_path.as_deref());

    // Priority 1: Command-line argument
    // Priority 2: Environment variable
    // Priority 3: TOML config file
    // Priority 4: Compiled default
    let (api_base_url, url_source) = if let Some(url) = &overrides.api_url {
        (url.clone(), "command line")
    } else if let Ok(url) = std::env::var(API_URL_ENV) {
        (url, "environment")
    } else if let Some(url) = toml_config.api_base_url.clone() {
        (url, "TOML")
    } else {
        (DEFAULT_API_BASE_URL.to_string(), "default")
    };

    let timeout_secs = if let Some(secs) = overrides.timeout_secs {
        secs
    } else if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
        raw.trim().parse::<u64>().map_err(|_| {
            Error::Config(format!(
                "{} must be a whole number of seconds, got {:?}",
                TIMEOUT_ENV, raw
            ))
        })?
    } else {
        toml_config
            .request_timeout_secs
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
    };

    if timeout_secs == 0 {
        return Err(Error::Config("Request timeout must be greater than zero".to_string()));
    }

    let api_base_url = normalize_base_url(&api_base_url)?;
    info!(url = %api_base_url, source = url_source, "Catalog API base URL resolved");

    Ok(ClientConfig {
        api_base_url,
        request_timeout: Duration::from_secs(timeout_secs),
        log_level: toml_config.logging.level,
    })
}

/// Validate scheme and strip trailing slashes
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"));
    match host {
        Some(host) if !host.is_empty() => Ok(trimmed.to_string()),
        Some(_) => Err(Error::Config(format!("API base URL has no host: {:?}", raw))),
        None => Err(Error::Config(format!(
            "API base URL must start with http:// or https://, got {:?}",
            raw
        ))),
    }
}

/// Load the TOML config, degrading to defaults on any problem
fn load_toml_config(explicit: Option<&Path>) -> TomlConfig {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) => path,
            None => {
                debug!("No TOML config file found, using defaults");
                return TomlConfig::default();
            }
        },
    };

    match TomlConfig::load(&path) {
        Ok(config) => {
            debug!(path = %path.display(), "Loaded TOML config");
            config
        }
        Err(e) => {
            warn!("{}; continuing with defaults", e);
            TomlConfig::default()
        }
    }
}

/// Locate the platform config file, if one exists
///
/// Linux checks `~/.config/tcm/config.toml` then `/etc/tcm/config.toml`;
/// other platforms check the user config directory only.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("tcm").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/tcm/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_trailing_slash() {
        assert_eq!(
            normalize_base_url("http://localhost:8000/api/").unwrap(),
            "http://localhost:8000/api"
        );
        assert_eq!(
            normalize_base_url("  https://catalog.example.org//  ").unwrap(),
            "https://catalog.example.org"
        );
    }

    #[test]
    fn test_normalize_rejects_missing_scheme() {
        assert!(matches!(
            normalize_base_url("localhost:8000/api"),
            Err(Error::Config(_))
        ));
        assert!(normalize_base_url("ftp://example.org").is_err());
    }

    #[test]
    fn test_normalize_rejects_empty_host() {
        assert!(normalize_base_url("http://").is_err());
    }

    #[test]
    fn test_logging_default_level() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert!(config.api_base_url.is_none());
    }
}
