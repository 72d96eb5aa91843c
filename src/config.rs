//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::dialect::Dialect;
use crate::resolution::{ConfigurationError, WeekStart};
use crate::schema::DataSource;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,

    /// Table and dimension catalogue
    pub source: Option<DataSource>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Query engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Epi-week start day, 0 = Sunday .. 6 = Saturday
    #[serde(default)]
    pub week_start_day: u8,

    #[serde(default = "default_dialect")]
    pub default_dialect: Dialect,

    /// Empty means no conversion
    #[serde(default)]
    pub default_timezone: String,
}

fn default_dialect() -> Dialect {
    Dialect::Pgsql
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            week_start_day: 0,
            default_dialect: default_dialect(),
            default_timezone: String::new(),
        }
    }
}

impl EngineConfig {
    /// Configured week start
    pub fn week_start(&self) -> Result<WeekStart, ConfigurationError> {
        WeekStart::new(self.week_start_day).ok_or(ConfigurationError::InvalidWeekStart {
            day: self.week_start_day,
        })
    }

    /// Default timezone, if set
    pub fn timezone(&self) -> Option<&str> {
        let tz = self.default_timezone.trim();
        (!tz.is_empty()).then_some(tz)
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

impl LoggingConfig {
    /// Whether JSON output was requested
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })?;
        config.engine.week_start()?;
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

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("seriesql").join("config.toml")),
            Some(PathBuf::from("/etc/seriesql/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// The configured data source, validated
    pub fn data_source(&self) -> Result<DataSource, ConfigError> {
        let source = self.source.clone().ok_or(ConfigError::MissingSource)?;
        source.validate()?;
        Ok(source)
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(day) = std::env::var("SERIESQL_WEEK_START") {
            match day.trim().parse::<u8>().ok().and_then(WeekStart::new) {
                Some(ws) => self.engine.week_start_day = ws.day(),
                None => tracing::warn!("Ignoring invalid SERIESQL_WEEK_START={:?}", day),
            }
        }
        if let Ok(dialect) = std::env::var("SERIESQL_DIALECT") {
            match Dialect::from_token(&dialect) {
                Some(d) => self.engine.default_dialect = d,
                None => tracing::warn!("Ignoring invalid SERIESQL_DIALECT={:?}", dialect),
            }
        }
        if let Ok(tz) = std::env::var("SERIESQL_TIMEZONE") {
            self.engine.default_timezone = tz;
        }

        if let Ok(level) = std::env::var("SERIESQL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("SERIESQL_LOG_FORMAT") {
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

    #[error("No [source] section configured")]
    MissingSource,

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ConfigurationError),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# seriesql configuration
#
# Environment variables override these settings:
# - SERIESQL_WEEK_START
# - SERIESQL_DIALECT
# - SERIESQL_TIMEZONE
# - SERIESQL_LOG_LEVEL
# - SERIESQL_LOG_FORMAT

[engine]
# First day of the epidemiological week: 0 = Sunday .. 6 = Saturday
week_start_day = 0

# Dialect used when a request does not name one: mysql or pgsql
default_dialect = "pgsql"

# Timezone applied before bucketing (IANA name or +HH:MM); empty for none
default_timezone = ""

[source]
# Table queried (may be schema-qualified)
table = "visits"

# Dimension bucketed by resolution and bounded by the date range
date_dimension = "visit_date"

[[source.dimensions]]
id = "visit_date"
column = "visit_date"
type = "date"
roles = ["result", "filter"]
relations = ["gte", "lte", "between"]

[[source.dimensions]]
id = "region"
column = "region"
type = "text"
roles = ["result", "filter", "grouping"]
relations = ["eq", "ne", "in", "like", "asc", "desc"]

[[source.dimensions]]
id = "cases"
column = "case_count"
type = "integer"
roles = ["result", "accumulation"]

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
