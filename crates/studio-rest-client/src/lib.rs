//! REST client for the task-studio editing service
//!
//! Implements [`studio_client_api::TaskService`] against the task's editing
//! URL: file actions go to `<task>/files`, the structural form to the task
//! URL itself, and submission feedback to `<task>/<sid>`.

pub mod auth;
pub mod client;
pub mod error;

pub use auth::{AuthConfig, AuthMethod};
pub use client::StudioRestClient;
pub use error::{RestClientError, RestClientResult};
