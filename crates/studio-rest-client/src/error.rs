//! Error types for the REST client

use studio_client_api::ServiceError;
use thiserror::Error;

/// Errors that can occur when talking to the editing service
#[derive(Debug, Error)]
pub enum RestClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Authentication error: {0}")]
    Auth(String),

    /// The file service answered with its `{error}` shape
    #[error("File service error: {0}")]
    FileService(String),

    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),
}

/// Result type alias for REST client operations
pub type RestClientResult<T> = Result<T, RestClientError>;

impl From<RestClientError> for ServiceError {
    fn from(err: RestClientError) -> Self {
        match err {
            RestClientError::FileService(message) => ServiceError::Server(message),
            other => ServiceError::Transport(other.to_string()),
        }
    }
}
