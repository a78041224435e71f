//! Core error types for the session controller.

/// Error type for session operations.
///
/// Validation errors carry the exact message shown to the author; nothing
/// in this crate panics on bad input.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// User input rejected before any request was issued.
    #[error("{message}")]
    Validation { message: String },

    /// An operation referenced session state that does not exist.
    #[error("Session error: {message}")]
    Session { message: String },
}

impl Error {
    /// Create a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new session-state error.
    pub fn session<S: Into<String>>(message: S) -> Self {
        Self::Session {
            message: message.into(),
        }
    }
}
