//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// One or more page definitions failed validation
    #[error("{failed} of {total} page definitions invalid")]
    Validation {
        /// Files that failed
        failed: usize,
        /// Files checked
        total: usize,
    },

    /// Pagewait library error
    #[error("{0}")]
    Pagewait(#[from] pagewait::PagewaitError),

    /// JSON rendering error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
