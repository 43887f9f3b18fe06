//! Error types shared across SkiCam crates.
//!
//! The per-frame control path never returns errors; these cover the
//! boundaries (config files, observation streams, CLI input).

use std::path::PathBuf;

/// Top-level error type for SkiCam operations.
#[derive(Debug, thiserror::Error)]
pub enum SkicamError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using SkicamError.
pub type SkicamResult<T> = Result<T, SkicamError>;

impl SkicamError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }
}
