//! # Eventtree Configuration Errors
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error during '{operation}' on path '{}': {source}", path.display())]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
        operation: String,
    },

    #[error("Unknown or unsupported config format for path: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to deserialize dispatch config from {format}: {message}")]
    Parse { format: String, message: String },

    #[error("Failed to serialize dispatch config to {format}: {message}")]
    Serialize { format: String, message: String },
}
