//! Mock task service backed by scripted responses
//!
//! Besides serving canned file contents, the mock records every request it
//! receives in arrival order, so tests can assert sequencing properties
//! (saves before submit, no duplicate requests from a guarded re-entry).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;
use studio_api_contract::{
    FeedbackResponse, FileListing, TaskFormData, TaskSaveResponse,
};
use studio_client_api::{ServiceError, ServiceResult, TaskService};

/// One request as observed by the mock, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedRequest {
    FetchFile { path: String },
    SaveFile { path: String, content: String },
    DeleteFile { path: String },
    RenameFile { path: String, new_path: String },
    CreateFile { path: String },
    UploadFile { path: String },
    ListFiles,
    SubmitTask { form: TaskFormData },
    FetchFeedback { submission_id: String },
}

#[derive(Default)]
struct MockState {
    files: BTreeMap<String, String>,
    unreadable: BTreeSet<String>,
    failing_saves: BTreeMap<String, String>,
    submit_response: Option<TaskSaveResponse>,
    submit_transport_error: Option<String>,
    feedback: BTreeMap<String, FeedbackResponse>,
    requests: Vec<RecordedRequest>,
}

/// Scripted [`TaskService`] implementation
#[derive(Default)]
pub struct MockService {
    state: Mutex<MockState>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `content` for `path`
    pub fn with_file(self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.state.lock().unwrap().files.insert(path.into(), content.into());
        self
    }

    /// Answer `{error}` when `path` is fetched for editing
    pub fn with_unreadable_file(self, path: impl Into<String>) -> Self {
        self.state.lock().unwrap().unreadable.insert(path.into());
        self
    }

    /// Fail every save of `path` with the given server message
    pub fn with_failing_save(self, path: impl Into<String>, message: impl Into<String>) -> Self {
        self.state.lock().unwrap().failing_saves.insert(path.into(), message.into());
        self
    }

    /// Answer the form submission with `response` instead of the default ok
    pub fn with_submit_response(self, response: TaskSaveResponse) -> Self {
        self.state.lock().unwrap().submit_response = Some(response);
        self
    }

    /// Fail the form submission at the transport level
    pub fn with_submit_transport_error(self, message: impl Into<String>) -> Self {
        self.state.lock().unwrap().submit_transport_error = Some(message.into());
        self
    }

    /// Serve canned feedback for a submission id
    pub fn with_feedback(self, submission_id: impl Into<String>, response: FeedbackResponse) -> Self {
        self.state.lock().unwrap().feedback.insert(submission_id.into(), response);
        self
    }

    /// Everything the mock has been asked so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    /// The last content saved for `path`, if any save went through
    pub fn saved_content(&self, path: &str) -> Option<String> {
        self.state.lock().unwrap().files.get(path).cloned()
    }

    fn record(&self, request: RecordedRequest) {
        self.state.lock().unwrap().requests.push(request);
    }

    fn listing(&self) -> FileListing {
        let state = self.state.lock().unwrap();
        FileListing(state.files.keys().cloned().collect::<Vec<_>>().join("\n"))
    }
}

#[async_trait]
impl TaskService for MockService {
    async fn fetch_file(&self, path: &str) -> ServiceResult<String> {
        self.record(RecordedRequest::FetchFile { path: path.to_string() });
        let state = self.state.lock().unwrap();
        if state.unreadable.contains(path) {
            return Err(ServiceError::Server("cannot read file".to_string()));
        }
        state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| ServiceError::Server(format!("no such file: {path}")))
    }

    async fn save_file(&self, path: &str, content: &str) -> ServiceResult<()> {
        self.record(RecordedRequest::SaveFile {
            path: path.to_string(),
            content: content.to_string(),
        });
        let mut state = self.state.lock().unwrap();
        if let Some(message) = state.failing_saves.get(path) {
            return Err(ServiceError::Server(message.clone()));
        }
        state.files.insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn delete_file(&self, path: &str) -> ServiceResult<FileListing> {
        self.record(RecordedRequest::DeleteFile { path: path.to_string() });
        self.state.lock().unwrap().files.remove(path);
        Ok(self.listing())
    }

    async fn rename_file(&self, path: &str, new_path: &str) -> ServiceResult<FileListing> {
        self.record(RecordedRequest::RenameFile {
            path: path.to_string(),
            new_path: new_path.to_string(),
        });
        let mut state = self.state.lock().unwrap();
        if let Some(content) = state.files.remove(path) {
            state.files.insert(new_path.to_string(), content);
        }
        drop(state);
        Ok(self.listing())
    }

    async fn create_file(&self, path: &str) -> ServiceResult<FileListing> {
        self.record(RecordedRequest::CreateFile { path: path.to_string() });
        self.state
            .lock()
            .unwrap()
            .files
            .entry(path.to_string())
            .or_default();
        Ok(self.listing())
    }

    async fn upload_file(&self, path: &str, content: Vec<u8>) -> ServiceResult<FileListing> {
        self.record(RecordedRequest::UploadFile { path: path.to_string() });
        let text = String::from_utf8_lossy(&content).into_owned();
        self.state.lock().unwrap().files.insert(path.to_string(), text);
        Ok(self.listing())
    }

    async fn list_files(&self) -> ServiceResult<FileListing> {
        self.record(RecordedRequest::ListFiles);
        Ok(self.listing())
    }

    async fn submit_task(&self, form: &TaskFormData) -> ServiceResult<TaskSaveResponse> {
        self.record(RecordedRequest::SubmitTask { form: form.clone() });
        let state = self.state.lock().unwrap();
        if let Some(message) = &state.submit_transport_error {
            return Err(ServiceError::Transport(message.clone()));
        }
        Ok(state.submit_response.clone().unwrap_or_else(TaskSaveResponse::ok))
    }

    async fn fetch_feedback(&self, submission_id: &str) -> ServiceResult<FeedbackResponse> {
        self.record(RecordedRequest::FetchFeedback {
            submission_id: submission_id.to_string(),
        });
        self.state
            .lock()
            .unwrap()
            .feedback
            .get(submission_id)
            .cloned()
            .ok_or_else(|| ServiceError::Server(format!("no such submission: {submission_id}")))
    }
}
