//! Configuration management for CekBpom.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use crate::types::{FieldCodes, SearchField};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main application configuration.
///
/// This is loaded from `~/.config/cekbpom/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Upstream HTTP settings
    pub http: HttpConfig,
    /// Search and pagination behavior
    pub search: SearchConfig,
    /// Per-field numeric code overrides, keyed by field name
    pub fields: BTreeMap<String, u8>,
    /// Result dump settings
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from the default location, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path.
    ///
    /// Unlike [`AppConfig::load`], a missing file is an error here.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `CEKBPOM_BASE_URL`: Override upstream base URL
    /// - `CEKBPOM_TIMEOUT_SECS`: Override HTTP client timeout
    /// - `CEKBPOM_ENRICH`: Override default detail enrichment (true/false)
    /// - `CEKBPOM_SHORTFALL_POLICY`: Override row shortfall policy (warn/abort)
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("CEKBPOM_BASE_URL") {
            if !val.trim().is_empty() {
                tracing::debug!("Override http.base_url from env: {}", val);
                self.http.base_url = val;
            }
        }

        if let Ok(val) = std::env::var("CEKBPOM_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.http.timeout_secs = secs;
                tracing::debug!("Override http.timeout_secs from env: {}", secs);
            }
        }

        if let Ok(val) = std::env::var("CEKBPOM_ENRICH") {
            if let Ok(enrich) = val.parse() {
                self.search.enrich = enrich;
                tracing::debug!("Override search.enrich from env: {}", enrich);
            }
        }

        if let Ok(val) = std::env::var("CEKBPOM_SHORTFALL_POLICY") {
            if let Ok(policy) = val.parse() {
                self.search.shortfall_policy = policy;
                tracing::debug!("Override search.shortfall_policy from env: {}", policy);
            }
        }

        self
    }

    /// Check value constraints that TOML parsing alone cannot enforce.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.search.initial_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.initial_page_size".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.search.page_size_ceiling < self.search.initial_page_size {
            return Err(ConfigError::InvalidValue {
                field: "search.page_size_ceiling".to_string(),
                reason: format!(
                    "must be at least initial_page_size ({})",
                    self.search.initial_page_size
                ),
            });
        }

        self.field_codes().map(|_| ())
    }

    /// Build the immutable field code lookup from the `[fields]` overrides.
    pub fn field_codes(&self) -> ConfigResult<FieldCodes> {
        let mut overrides = HashMap::new();
        for (name, code) in &self.fields {
            let field = name
                .parse::<SearchField>()
                .map_err(|e| ConfigError::InvalidValue {
                    field: format!("fields.{name}"),
                    reason: e.to_string(),
                })?;
            overrides.insert(field, *code);
        }
        Ok(FieldCodes::with_overrides(&overrides))
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/cekbpom/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("id", "cekbpom", "cekbpom").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Upstream HTTP settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Base URL of the registry service
    pub base_url: String,
    /// User agent string
    pub user_agent: String,
    /// Request timeout in seconds, enforced by the HTTP client
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "https://cekbpom.pom.go.id".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) CekBpom/0.1.0".to_string(),
            timeout_secs: 60,
        }
    }
}

/// What to do when fewer rows are parsed than the result banner declares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortfallPolicy {
    /// Log a warning and keep going
    #[default]
    Warn,
    /// Abort the run with a protocol error
    Abort,
}

impl fmt::Display for ShortfallPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warn => f.write_str("warn"),
            Self::Abort => f.write_str("abort"),
        }
    }
}

impl FromStr for ShortfallPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warn" => Ok(Self::Warn),
            "abort" => Ok(Self::Abort),
            other => Err(ConfigError::InvalidValue {
                field: "search.shortfall_policy".to_string(),
                reason: format!("expected 'warn' or 'abort', got '{other}'"),
            }),
        }
    }
}

/// Search and pagination behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Page size of the first convergence round
    pub initial_page_size: u32,
    /// Declared totals at or above this are never re-fetched in one page
    pub page_size_ceiling: u32,
    /// Row shortfall handling
    pub shortfall_policy: ShortfallPolicy,
    /// Fields searched when none are given on the command line
    pub default_fields: Vec<SearchField>,
    /// Whether detail enrichment runs by default
    pub enrich: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            initial_page_size: 100,
            page_size_ceiling: 5000,
            shortfall_policy: ShortfallPolicy::Warn,
            default_fields: vec![SearchField::ProductName],
            enrich: false,
        }
    }
}

/// Result dump settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for JSON result dumps (disabled when unset)
    pub dump_dir: Option<PathBuf>,
}
