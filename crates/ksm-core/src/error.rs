//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{message}")]
    Format { message: String },

    #[error("entry list mismatch: {keys} key(s) but {values} value(s)")]
    LengthMismatch { keys: usize, values: usize },

    #[error("empty key at index {index}")]
    EmptyKey { index: usize },

    #[error("entry {key:?} already exists")]
    DuplicateKey { key: String },

    #[error("index {index} out of range [0, {len}]")]
    IndexOutOfRange { index: isize, len: usize },

    #[error("{what} {name:?} not found")]
    NotFound { what: String, name: String },

    #[error(
        "data key {key:?} contains invalid characters (allowed: alphanumeric, '-', '_', '.')"
    )]
    InvalidDataKey { key: String },

    #[error("{flag}: path {path:?} escapes current directory")]
    PathEscape { flag: String, path: String },

    #[error("acquire lock on {path:?}: {source}")]
    Lock {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} not found at {path:?}; {hint}")]
    SubprocessNotFound {
        program: String,
        path: String,
        hint: String,
    },

    #[error("{program} failed: {message}")]
    SubprocessFailed { program: String, message: String },

    #[error("read file {path:?}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse secret YAML: {message}")]
    Parse { message: String },

    #[error("length {length} exceeds maximum of {max}")]
    InvalidLength { length: usize, max: usize },

    #[error("unknown charset {name:?}: use alphanumeric, hex, or base64url")]
    UnknownCharset { name: String },

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Shorthand for a malformed-input error
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            what: what.into(),
            name: name.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
