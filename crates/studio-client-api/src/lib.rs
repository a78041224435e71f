//! Service trait the studio session controller talks to
//!
//! Everything the controller knows about the remote side is this trait; the
//! REST client implements it for production and the mock client implements
//! it for tests.

use async_trait::async_trait;
use studio_api_contract::{FeedbackResponse, FileListing, TaskFormData, TaskSaveResponse};
use thiserror::Error;

/// Failures a service call can report back to the controller
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// The server processed the request and reported a failure
    #[error("{0}")]
    Server(String),
    /// The request never produced a usable response
    #[error("transport error: {0}")]
    Transport(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// The remote task-editing service, at its interface boundary.
///
/// Mutating file actions return the re-rendered file-listing fragment the
/// shell displays in place of the old one.
#[async_trait]
pub trait TaskService: Send + Sync {
    /// `{action: "edit"}`: fetch a file's content for a new tab
    async fn fetch_file(&self, path: &str) -> ServiceResult<String>;

    /// `{action: "edit_save"}`: persist one open editor's content
    async fn save_file(&self, path: &str, content: &str) -> ServiceResult<()>;

    /// `{action: "delete"}`
    async fn delete_file(&self, path: &str) -> ServiceResult<FileListing>;

    /// `{action: "rename"}`
    async fn rename_file(&self, path: &str, new_path: &str) -> ServiceResult<FileListing>;

    /// `{action: "create"}`
    async fn create_file(&self, path: &str) -> ServiceResult<FileListing>;

    /// `{action: "upload"}`: multipart upload of one file
    async fn upload_file(&self, path: &str, content: Vec<u8>) -> ServiceResult<FileListing>;

    /// Plain refresh of the file-listing fragment
    async fn list_files(&self) -> ServiceResult<FileListing>;

    /// Submit the structural form.
    ///
    /// A server-reported failure still resolves to `Ok`: the response body
    /// carries the failure and the caller inspects it. `Err` means the
    /// request itself did not go through.
    async fn submit_task(&self, form: &TaskFormData) -> ServiceResult<TaskSaveResponse>;

    /// Fetch the graded feedback for an old submission
    async fn fetch_feedback(&self, submission_id: &str) -> ServiceResult<FeedbackResponse>;
}
