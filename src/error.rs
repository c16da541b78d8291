use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UnipkgError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error at '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    StdIoError(#[from] std::io::Error),

    #[error("Parsing error in '{file}': {message}")]
    ParseError { file: String, message: String },

    #[error("KDL parse error: {0}")]
    KdlError(#[from] kdl::KdlError),

    #[error("Package manager error: {0}")]
    PackageManagerError(String),

    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    #[error("Operation interrupted by user")]
    Interrupted,

    /// Backend executable is not on PATH
    #[error("Executable not found: {0}")]
    ExecutableMissing(String),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error("System command '{command}' failed: {reason}")]
    SystemCommandFailed { command: String, reason: String },

    /// Lock acquisition failed (e.g., mutex poisoned, cache lock held)
    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error("Path error: {0}")]
    PathError(String),

    /// Remote resource fetch error (HTTP, network, etc.)
    #[error("Failed to fetch remote resource: {0}")]
    RemoteFetchError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, UnipkgError>;
