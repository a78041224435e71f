//! task-studio editing service contract types and validation
//!
//! This crate defines the request/response shapes exchanged with the task
//! file service and the task-persistence endpoint. The types are shared
//! between the REST client, the mock client used in tests, and the session
//! controller.

pub mod error;
pub mod types;
pub mod validation;

pub use error::*;
pub use types::*;
pub use validation::*;
