//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable pointing at an explicit config file
pub const CONFIG_PATH_ENV: &str = "COHORT_PULSE_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sheet: SheetConfig,

    #[serde(default)]
    pub refresh: RefreshConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub websocket: WebSocketConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Spreadsheet source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SheetConfig {
    /// Spreadsheet ID (from the sheet URL)
    #[serde(default)]
    pub spreadsheet_id: String,

    /// A1-notation range to read
    #[serde(default = "default_range")]
    pub range: String,

    /// Sheets API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Credentials JSON file, used when GOOGLE_CREDENTIALS is unset
    #[serde(default = "default_credentials_file")]
    pub credentials_file: PathBuf,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_range() -> String {
    "Sheet1".to_string()
}

fn default_base_url() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_credentials_file() -> PathBuf {
    PathBuf::from("service-account.json")
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            range: default_range(),
            base_url: default_base_url(),
            credentials_file: default_credentials_file(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Cache refresh configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_refresh_interval")]
    pub interval_secs: u64,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_refresh_interval() -> u64 {
    crate::cache::DEFAULT_REFRESH_INTERVAL.as_secs()
}

fn default_fetch_timeout() -> u64 {
    45
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_refresh_interval(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// WebSocket notification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketConfig {
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_max_connections() -> usize {
    1000
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from an explicit path, `COHORT_PULSE_CONFIG`, or default locations
    ///
    /// An explicitly named file must load; default locations that fail to
    /// parse are skipped with a warning.
    pub fn load_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        if let Some(path) = explicit.map(Path::to_path_buf).or(from_env) {
            tracing::info!("Loading config from {:?}", path);
            return Self::load_with_env(&path);
        }

        let config_paths = [
            dirs::config_dir().map(|p| p.join("cohort-pulse").join("config.toml")),
            Some(PathBuf::from("/etc/cohort-pulse/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Ok(Self::from_env())
    }

    /// Check settings that have no usable default
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sheet.spreadsheet_id.trim().is_empty() {
            return Err(ConfigError::Missing(
                "sheet.spreadsheet_id (or SPREADSHEET_ID)".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Sheet overrides
        if let Ok(id) = std::env::var("SPREADSHEET_ID") {
            self.sheet.spreadsheet_id = id;
        }
        if let Ok(range) = std::env::var("SHEET_RANGE") {
            self.sheet.range = range;
        }

        // Refresh overrides
        if let Ok(secs) = std::env::var("COHORT_PULSE_REFRESH_SECS") {
            if let Ok(s) = secs.parse() {
                self.refresh.interval_secs = s;
            }
        }

        // API overrides
        if let Ok(host) = std::env::var("COHORT_PULSE_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("COHORT_PULSE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("COHORT_PULSE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Missing required setting: {0}")]
    Missing(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Cohort Pulse Configuration
#
# Environment variables override these settings:
# - SPREADSHEET_ID
# - SHEET_RANGE
# - PORT
# - COHORT_PULSE_HOST
# - COHORT_PULSE_REFRESH_SECS
# - COHORT_PULSE_LOG_LEVEL
# - COHORT_PULSE_LOG_FORMAT
#
# Credentials are read from GOOGLE_CREDENTIALS (inline JSON) when set,
# otherwise from sheet.credentials_file. Either must contain an "api_key"
# or an "access_token".

[sheet]
# Spreadsheet ID (the long token in the sheet URL)
spreadsheet_id = ""

# Range to read, in A1 notation
range = "Sheet1"

# Sheets API base URL
base_url = "https://sheets.googleapis.com"

# Credentials file
credentials_file = "service-account.json"

# HTTP request timeout in seconds
request_timeout_secs = 30

[refresh]
# How often to re-read the sheet (seconds)
interval_secs = 60

# Upper bound on a single fetch (seconds)
fetch_timeout_secs = 45

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 3000

# Allowed CORS origins (empty allows any origin)
cors_origins = []

[websocket]
# Maximum concurrent dashboard connections
max_connections = 1000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

/// Serializes tests that read or write process environment variables
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
