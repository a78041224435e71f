//! Error types for contract validation and parsing

use thiserror::Error;

/// Errors that can occur while validating or parsing contract data
#[derive(Debug, Error)]
pub enum ContractError {
    /// An identifier failed the client-side pattern check. The payload is
    /// the user-facing message.
    #[error("{0}")]
    InvalidIdentifier(String),

    #[error("Unknown subproblem type: {0}")]
    UnknownBlockKind(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),
}
