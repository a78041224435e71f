//! Error handling for the TUI application

use thiserror::Error;

/// Errors that can occur in the TUI shell
#[derive(Debug, Error)]
pub enum TuiError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for TUI operations
pub type TuiResult<T> = Result<T, TuiError>;
