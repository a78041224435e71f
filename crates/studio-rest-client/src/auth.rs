//! Authentication for the editing service
//!
//! Browser sessions ride on cookies; headless use authenticates with an
//! API key or bearer token header instead.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Authentication methods supported by the editing service
#[derive(Debug, Clone, Default)]
pub enum AuthMethod {
    /// API key authentication (`Authorization: ApiKey <token>`)
    ApiKey(String),
    /// Bearer token (`Authorization: Bearer <jwt>`)
    Bearer(String),
    /// No authentication (cookie-based sessions)
    #[default]
    None,
}

impl AuthMethod {
    /// Apply authentication headers to a request
    pub fn apply_to_headers(
        &self,
        headers: &mut HeaderMap,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match self {
            AuthMethod::ApiKey(token) => {
                let value = format!("ApiKey {}", token);
                headers.insert(
                    HeaderName::from_static("authorization"),
                    HeaderValue::from_str(&value)?,
                );
            }
            AuthMethod::Bearer(token) => {
                let value = format!("Bearer {}", token);
                headers.insert(
                    HeaderName::from_static("authorization"),
                    HeaderValue::from_str(&value)?,
                );
            }
            AuthMethod::None => {
                // No headers to add
            }
        }
        Ok(())
    }
}

/// Authentication configuration for the client
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub method: AuthMethod,
}

impl AuthConfig {
    /// Create a new auth config with API key authentication
    pub fn with_api_key(token: impl Into<String>) -> Self {
        Self {
            method: AuthMethod::ApiKey(token.into()),
        }
    }

    /// Create a new auth config with bearer token authentication
    pub fn with_bearer(token: impl Into<String>) -> Self {
        Self {
            method: AuthMethod::Bearer(token.into()),
        }
    }

    /// Get headers for this authentication configuration
    pub fn headers(&self) -> Result<HeaderMap, Box<dyn std::error::Error + Send + Sync>> {
        let mut headers = HeaderMap::new();
        self.method.apply_to_headers(&mut headers)?;
        Ok(headers)
    }
}
