//! Error types for schema_docs

use thiserror::Error;

/// Result type for schema_docs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for schema_docs
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Missing environment variable: {0}")]
    MissingCredential(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),
}

/// Convert TOML deserialization errors to configuration errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}
