//! Client configuration
//!
//! ## Configuration Resolution
//!
//! 1. Embedded defaults (`config/client.toml`, compiled into the binary)
//! 2. Override file, replacing the defaults when it exists
//!    (~/.local/share/coach/config/client.toml or an explicit path)
//! 3. Environment: `COACH_API_URL`, `COACH_TIMEOUT_SECS`
//!
//! Command-line flags are applied on top by the CLI.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/client.toml");

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "COACH_API_URL";

/// Environment variable overriding the request timeout (seconds)
pub const TIMEOUT_ENV: &str = "COACH_TIMEOUT_SECS";

/// How the insights store resolves two refreshes that are in flight together
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshOrdering {
    /// Whichever response is handled last becomes current
    #[default]
    LastProcessed,
    /// Responses older than one already applied are dropped
    LatestIssued,
}

impl RefreshOrdering {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LastProcessed => "last_processed",
            Self::LatestIssued => "latest_issued",
        }
    }
}

impl fmt::Display for RefreshOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RefreshOrdering {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "last_processed" => Ok(Self::LastProcessed),
            "latest_issued" => Ok(Self::LatestIssued),
            _ => Err(format!("Unknown refresh ordering: {}", s)),
        }
    }
}

/// Resolved client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Origin every API call targets (no trailing slash)
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Concurrent refresh policy
    pub refresh_ordering: RefreshOrdering,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: Duration::from_secs(20),
            refresh_ordering: RefreshOrdering::LastProcessed,
        }
    }
}

/// On-disk layout of client.toml
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    api: ApiSection,
    #[serde(default)]
    insights: InsightsSection,
}

#[derive(Debug, Default, Deserialize)]
struct ApiSection {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct InsightsSection {
    refresh_ordering: Option<RefreshOrdering>,
}

impl ClientConfig {
    /// Config pointing at an explicit base URL, everything else default
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            ..Self::default()
        }
    }

    /// Load with the full resolution order (files, then environment)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::from_files(override_path)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Load the embedded defaults, replaced by the override file if present
    pub fn from_files(override_path: Option<&Path>) -> Result<Self> {
        let path = match override_path {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path(),
        };

        let content = match path {
            Some(ref path) if path.exists() => {
                debug!("Loading client config from {}", path.display());
                fs::read_to_string(path)
                    .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
            }
            _ => DEFAULT_CONFIG.to_string(),
        };

        Self::parse(&content)
    }

    /// Parse a client.toml document; missing keys fall back to defaults
    pub fn parse(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        let defaults = Self::default();
        Ok(Self {
            base_url: file
                .api
                .base_url
                .map(|url| normalize_base_url(&url))
                .unwrap_or(defaults.base_url),
            timeout: match file.api.timeout_secs {
                Some(secs) => timeout_from_secs(secs, "api.timeout_secs")?,
                None => defaults.timeout,
            },
            refresh_ordering: file
                .insights
                .refresh_ordering
                .unwrap_or(defaults.refresh_ordering),
        })
    }

    /// Apply `COACH_API_URL` / `COACH_TIMEOUT_SECS` when set
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.base_url = normalize_base_url(&url);
            }
        }
        if let Ok(secs) = std::env::var(TIMEOUT_ENV) {
            self.timeout = parse_timeout(&secs, TIMEOUT_ENV)?;
        }
        Ok(())
    }

    /// Point at a different origin (e.g. from a command-line flag)
    pub fn set_base_url(&mut self, url: &str) {
        self.base_url = normalize_base_url(url);
    }

    /// Full URL for an API path such as `/api/insights`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Request timeout from whole seconds; zero would fail every call
fn timeout_from_secs(secs: u64, source: &str) -> Result<Duration> {
    if secs == 0 {
        return Err(Error::Config(format!("{} must be at least 1 second", source)));
    }
    Ok(Duration::from_secs(secs))
}

fn parse_timeout(raw: &str, source: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} must be whole seconds", source)))?;
    timeout_from_secs(secs, source)
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("coach").join("config").join("client.toml"))
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
