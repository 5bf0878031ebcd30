//! Configuration system for toolscout.
//!
//! Configuration is read from a TOML file and then overlaid with environment
//! variables. Every section has defaults, so an empty file (or no file at all)
//! yields a usable configuration.
//!
//! # Configuration Location
//!
//! The file is looked up at `TOOLSCOUT_CONFIG` if set, otherwise at
//! `~/.toolscout/config.toml`. A missing default file is not an error.
//!
//! # Example
//!
//! ```toml
//! [general]
//! log_level = "debug"
//!
//! [scan]
//! root = "./tools"
//! extensions = ["py"]
//! exclude = ["**/tests/**"]
//!
//! [recommend]
//! model = "gemini-2.5-flash"
//!
//! [server]
//! bind = "127.0.0.1:8000"
//! ```

use crate::error::{Result, ToolscoutError};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The current configuration version
pub const CONFIG_VERSION: &str = "0.1.0";

// Environment variable names
pub const ENV_CONFIG_PATH: &str = "TOOLSCOUT_CONFIG";
pub const ENV_LOG_LEVEL: &str = "TOOLSCOUT_LOG_LEVEL";
pub const ENV_SCAN_DIRECTORY: &str = "SCAN_DIRECTORY";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_COMPOSIO_API_KEY: &str = "COMPOSIO_API_KEY";
pub const ENV_SERVER_BIND: &str = "TOOLSCOUT_BIND";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolscoutConfig {
    general: GeneralConfig,
    scan: ScanConfig,
    recommend: RecommendConfig,
    catalog: CatalogConfig,
    server: ServerConfig,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// General configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Configuration version
    pub version: String,
    /// Log level: trace, debug, info, warn, error
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
}

/// Directory scan configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory scanned at startup, if any
    pub root: Option<PathBuf>,
    /// File suffixes (without the dot) that are parsed
    pub extensions: Vec<String>,
    /// Skip files and directories whose name starts with a dot
    pub skip_hidden: bool,
    /// Glob patterns, relative to the root, that are never visited
    pub exclude: Vec<String>,
    /// Follow symbolic links while walking
    pub follow_links: bool,
    /// Parse files on the rayon pool
    pub parallel: bool,
}

/// Recommendation (LLM) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    /// Gemini API key (override with GEMINI_API_KEY)
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// API base endpoint
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// External tool catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Load the catalog at all
    pub enabled: bool,
    /// Composio API key (override with COMPOSIO_API_KEY)
    pub api_key: Option<String>,
    /// REST API base URL
    pub base_url: String,
    /// Maximum number of tools requested
    pub tool_limit: u32,
    /// Maximum number of toolkits requested
    pub toolkit_limit: u32,
    /// Load the catalog from a JSON file instead of the API
    pub static_path: Option<PathBuf>,
}

/// MCP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP bind address
    pub bind: String,
    /// HTTP endpoint path
    pub path: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: None,
            extensions: vec!["py".to_string()],
            skip_hidden: false,
            exclude: Vec::new(),
            follow_links: false,
            parallel: true,
        }
    }
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: "https://backend.composio.dev/api/v3".to_string(),
            tool_limit: 15000,
            toolkit_limit: 1000,
            static_path: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            path: "/mcp".to_string(),
        }
    }
}

impl ToolscoutConfig {
    pub fn general(&self) -> &GeneralConfig {
        &self.general
    }

    pub fn general_mut(&mut self) -> &mut GeneralConfig {
        &mut self.general
    }

    pub fn scan(&self) -> &ScanConfig {
        &self.scan
    }

    pub fn scan_mut(&mut self) -> &mut ScanConfig {
        &mut self.scan
    }

    pub fn recommend(&self) -> &RecommendConfig {
        &self.recommend
    }

    pub fn recommend_mut(&mut self) -> &mut RecommendConfig {
        &mut self.recommend
    }

    pub fn catalog(&self) -> &CatalogConfig {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut CatalogConfig {
        &mut self.catalog
    }

    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    pub fn server_mut(&mut self) -> &mut ServerConfig {
        &mut self.server
    }
}

impl ToolscoutConfig {
    /// Load configuration from the default location, falling back to defaults
    /// when no file exists. Environment overrides are always applied.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed, or if
    /// the merged configuration is invalid
    pub async fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from_path(&path).await,
            Some(path) if std::env::var_os(ENV_CONFIG_PATH).is_some() => Err(
                ToolscoutError::Config(format!("Config file not found: {}", path.display())),
            ),
            _ => {
                debug!("No configuration file found, using defaults");
                let mut config = Self::default();
                config.merge_env_vars()?;
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub async fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ToolscoutError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config = Self::from_toml_str(&content)?;
        config.merge_env_vars()?;
        config.validate()?;

        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text without applying overrides.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ToolscoutError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Path of the configuration file: `TOOLSCOUT_CONFIG` or `~/.toolscout/config.toml`.
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(ENV_CONFIG_PATH) {
            return Some(PathBuf::from(path));
        }
        dirs::home_dir().map(|home| home.join(".toolscout").join("config.toml"))
    }

    /// Merge environment variable overrides into the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    pub fn merge_env_vars(&mut self) -> Result<()> {
        self.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Merge overrides supplied by `lookup` (keyed by environment variable name).
    pub fn merge_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        debug!("Merging environment variable overrides");

        if let Some(log_level) = lookup(ENV_LOG_LEVEL) {
            debug!("Overriding log_level from environment: {}", log_level);
            self.general.log_level = log_level;
        }

        if let Some(root) = lookup(ENV_SCAN_DIRECTORY).filter(|v| !v.is_empty()) {
            debug!("Overriding scan root from environment: {}", root);
            self.scan.root = Some(PathBuf::from(root));
        }

        if let Some(api_key) = lookup(ENV_GEMINI_API_KEY).filter(|v| !v.is_empty()) {
            debug!("Overriding Gemini API key from environment");
            self.recommend.api_key = Some(api_key);
        }

        if let Some(api_key) = lookup(ENV_COMPOSIO_API_KEY).filter(|v| !v.is_empty()) {
            debug!("Overriding Composio API key from environment");
            self.catalog.api_key = Some(api_key);
        }

        if let Some(bind) = lookup(ENV_SERVER_BIND) {
            debug!("Overriding server bind from environment: {}", bind);
            self.server.bind = bind;
        }

        Ok(())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<()> {
        if !VALID_LOG_LEVELS.contains(&self.general.log_level.as_str()) {
            return Err(ToolscoutError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.general.log_level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        if self.scan.extensions.is_empty() {
            return Err(ToolscoutError::Config(
                "scan.extensions must list at least one suffix".to_string(),
            ));
        }

        if let Some(ext) = self.scan.extensions.iter().find(|e| e.is_empty() || e.starts_with('.')) {
            return Err(ToolscoutError::Config(format!(
                "Invalid scan extension '{}'. Use bare suffixes such as \"py\"",
                ext
            )));
        }

        if self.recommend.timeout_secs == 0 {
            return Err(ToolscoutError::Config(
                "recommend.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(ToolscoutError::Config(format!(
                "Invalid server bind address '{}'",
                self.server.bind
            )));
        }

        if !self.server.path.starts_with('/') {
            return Err(ToolscoutError::Config(format!(
                "Server path '{}' must start with '/'",
                self.server.path
            )));
        }

        debug!("Configuration validation passed");
        Ok(())
    }
}
