use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathDbError {
    #[error("Invalid ID: {0}")]
    InvalidId(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Invalid callback: {0}")]
    InvalidCallback(String),

    #[error("Not found: {id}")]
    NotFound { id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to replace document file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Stable tag for each error variant, as surfaced to callers and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidId,
    InvalidValue,
    InvalidOptions,
    InvalidCallback,
    NotFound,
    Io,
    Json,
    Yaml,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidId => "invalid-id",
            ErrorKind::InvalidValue => "invalid-value",
            ErrorKind::InvalidOptions => "invalid-options",
            ErrorKind::InvalidCallback => "invalid-callback",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Io => "io",
            ErrorKind::Json => "json",
            ErrorKind::Yaml => "yaml",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PathDbError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PathDbError::InvalidId(_) => ErrorKind::InvalidId,
            PathDbError::InvalidValue(_) => ErrorKind::InvalidValue,
            PathDbError::InvalidOptions(_) => ErrorKind::InvalidOptions,
            PathDbError::InvalidCallback(_) => ErrorKind::InvalidCallback,
            PathDbError::NotFound { .. } => ErrorKind::NotFound,
            PathDbError::Io(_) | PathDbError::Persist(_) => ErrorKind::Io,
            PathDbError::Json(_) => ErrorKind::Json,
            PathDbError::Yaml(_) => ErrorKind::Yaml,
        }
    }

    /// True for the validation taxonomy (everything except raw I/O and decode failures).
    pub fn is_validation(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::Io | ErrorKind::Json | ErrorKind::Yaml
        )
    }
}

pub type Result<T> = std::result::Result<T, PathDbError>;
