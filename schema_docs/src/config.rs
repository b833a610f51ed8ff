//! Configuration handling for schema_docs

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Environment variable holding the database service credential
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Configuration file consulted when no explicit path is given
pub const DEFAULT_CONFIG_PATH: &str = "schema_docs.toml";

/// Load configuration from an explicit path, from the default file when it
/// exists, or from built-in defaults. The database URL always comes from the
/// environment and its absence is a fatal startup error.
pub fn load(path: Option<&str>) -> Result<Config> {
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => parse_file(DEFAULT_CONFIG_PATH)?,
        None => Config::default(),
    };

    config.database.url = env::var(DATABASE_URL_VAR)
        .map_err(|_| Error::MissingCredential(DATABASE_URL_VAR.to_string()))?;

    Ok(config)
}

/// Load configuration from a TOML file
fn parse_file(path: &str) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("Failed to read config file: {}", e)))?;

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?;

    Ok(config)
}

/// Represents the complete schema_docs configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub logging: Option<LoggingConfig>,
}

/// Database connection configuration; the URL is injected from the environment
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    #[serde(skip)]
    pub url: String,
    pub pool_size: Option<u32>,
    pub timeout_seconds: Option<u64>,
    pub schema: Option<String>,
}

impl DatabaseConfig {
    /// Schema that gets documented when none is configured
    pub fn schema_name(&self) -> &str {
        self.schema.as_deref().unwrap_or("public")
    }
}

/// Output directory configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_docs_dir")]
    pub docs_dir: String,
    #[serde(default = "default_sql_dir")]
    pub sql_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            docs_dir: default_docs_dir(),
            sql_dir: default_sql_dir(),
        }
    }
}

fn default_docs_dir() -> String {
    "docs/tables".to_string()
}

fn default_sql_dir() -> String {
    "docs/sql".to_string()
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub format: String,
    pub stdout: bool,
}
