use std::path::PathBuf;
use thiserror::Error;

/// The main error type for langharvest operations.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("git was not found on PATH; install git and try again")]
    GitNotFound,

    #[error("Failed to clone {url}: {message}")]
    CloneFailed { url: String, message: String },

    #[error("Cloning {url} timed out after {timeout_secs}s")]
    CloneTimedOut { url: String, timeout_secs: u64 },

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Unknown language '{name}' (configured: {known})")]
    UnknownLanguage { name: String, known: String },

    #[error("Failed to serialize report: {0}")]
    ReportSerialize(#[from] serde_json::Error),
}
