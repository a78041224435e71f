//! Main REST client implementation

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use studio_api_contract::{
    FeedbackResponse, FileActionRequest, FileEditResponse, FileListing, FileSaveResponse,
    TaskFormData, TaskSaveResponse,
};
use studio_client_api::{ServiceResult, TaskService};
use url::Url;

use crate::auth::AuthConfig;
use crate::error::{RestClientError, RestClientResult};

/// REST client bound to one task's editing URL
#[derive(Debug, Clone)]
pub struct StudioRestClient {
    http_client: HttpClient,
    task_url: Url,
    auth: AuthConfig,
}

impl StudioRestClient {
    /// Create a new client for the given task-editing URL
    pub fn new(task_url: Url, auth: AuthConfig) -> Self {
        let http_client = HttpClient::builder()
            .user_agent("studio-tui/0.1")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            task_url,
            auth,
        }
    }

    /// Create a client from a task-editing URL string
    pub fn from_url(task_url: &str, auth: AuthConfig) -> RestClientResult<Self> {
        let task_url = Url::parse(task_url)?;
        Ok(Self::new(task_url, auth))
    }

    /// Get the task-editing URL
    pub fn task_url(&self) -> &Url {
        &self.task_url
    }

    /// URL of a sub-resource of the task (`files`, a submission id, ...)
    fn subpath(&self, segment: &str) -> RestClientResult<Url> {
        let mut url = self.task_url.clone();
        url.path_segments_mut()
            .map_err(|_| RestClientError::UnexpectedResponse("task URL cannot carry segments".to_string()))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    fn auth_headers(&self) -> RestClientResult<reqwest::header::HeaderMap> {
        self.auth.headers().map_err(|e| RestClientError::Auth(e.to_string()))
    }

    /// GET `{action: "edit"}` for one path
    pub async fn fetch_file_content(&self, path: &str) -> RestClientResult<String> {
        let url = self.subpath("files")?;
        let response = self
            .http_client
            .get(url)
            .headers(self.auth_headers()?)
            .query(&FileActionRequest::edit(path))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RestClientError::UnexpectedResponse(format!(
                "file service answered {status} for {path}"
            )));
        }

        let body: FileEditResponse = response.json().await?;
        if let Some(error) = body.error {
            return Err(RestClientError::FileService(error));
        }
        body.content
            .ok_or_else(|| RestClientError::UnexpectedResponse("neither content nor error in edit response".to_string()))
    }

    /// POST `{action: "edit_save"}` for one path
    pub async fn save_file_content(&self, path: &str, content: &str) -> RestClientResult<()> {
        let url = self.subpath("files")?;
        let request = FileActionRequest::edit_save(path, content);
        let response = self
            .http_client
            .post(url)
            .headers(self.auth_headers()?)
            .form(&request)
            .send()
            .await?;

        let body: FileSaveResponse = response.json().await?;
        match body.error {
            Some(error) => Err(RestClientError::FileService(error)),
            None => Ok(()),
        }
    }

    /// POST a mutating file action; the response body is the re-rendered
    /// file-listing fragment.
    async fn file_action(&self, request: &FileActionRequest) -> RestClientResult<FileListing> {
        let url = self.subpath("files")?;
        let response = self
            .http_client
            .post(url)
            .headers(self.auth_headers()?)
            .form(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RestClientError::UnexpectedResponse(format!(
                "file service answered {status}"
            )));
        }
        Ok(FileListing(response.text().await?))
    }

    /// GET the current file-listing fragment
    pub async fn fetch_file_listing(&self) -> RestClientResult<FileListing> {
        let url = self.subpath("files")?;
        let response = self
            .http_client
            .get(url)
            .headers(self.auth_headers()?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RestClientError::UnexpectedResponse(format!(
                "file service answered {status}"
            )));
        }
        Ok(FileListing(response.text().await?))
    }

    /// Multipart upload of one file
    pub async fn upload(&self, path: &str, content: Vec<u8>) -> RestClientResult<FileListing> {
        let url = self.subpath("files")?;
        let form = reqwest::multipart::Form::new()
            .text("action", "upload")
            .text("path", path.to_string())
            .part(
                "file",
                reqwest::multipart::Part::bytes(content).file_name(path.to_string()),
            );

        let response = self
            .http_client
            .post(url)
            .headers(self.auth_headers()?)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RestClientError::UnexpectedResponse(format!(
                "file service answered {status}"
            )));
        }
        Ok(FileListing(response.text().await?))
    }

    /// POST the structural form to the task-editing endpoint
    pub async fn submit_form(&self, form: &TaskFormData) -> RestClientResult<TaskSaveResponse> {
        let response = self
            .http_client
            .post(self.task_url.clone())
            .headers(self.auth_headers()?)
            .json(form)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        match serde_json::from_str::<TaskSaveResponse>(&text) {
            Ok(body) => Ok(body),
            Err(_) if status.is_success() => Err(RestClientError::UnexpectedResponse(text)),
            Err(_) => Err(RestClientError::UnexpectedResponse(format!(
                "task endpoint answered {status}"
            ))),
        }
    }

    /// GET the feedback of an old submission
    pub async fn fetch_submission(&self, submission_id: &str) -> RestClientResult<FeedbackResponse> {
        let url = self.subpath(submission_id)?;
        let response = self
            .http_client
            .get(url)
            .headers(self.auth_headers()?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RestClientError::UnexpectedResponse(format!(
                "submission endpoint answered {status}"
            )));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl TaskService for StudioRestClient {
    async fn fetch_file(&self, path: &str) -> ServiceResult<String> {
        Ok(self.fetch_file_content(path).await?)
    }

    async fn save_file(&self, path: &str, content: &str) -> ServiceResult<()> {
        Ok(self.save_file_content(path, content).await?)
    }

    async fn delete_file(&self, path: &str) -> ServiceResult<FileListing> {
        Ok(self.file_action(&FileActionRequest::delete(path)).await?)
    }

    async fn rename_file(&self, path: &str, new_path: &str) -> ServiceResult<FileListing> {
        Ok(self.file_action(&FileActionRequest::rename(path, new_path)).await?)
    }

    async fn create_file(&self, path: &str) -> ServiceResult<FileListing> {
        Ok(self.file_action(&FileActionRequest::create(path)).await?)
    }

    async fn upload_file(&self, path: &str, content: Vec<u8>) -> ServiceResult<FileListing> {
        Ok(self.upload(path, content).await?)
    }

    async fn list_files(&self) -> ServiceResult<FileListing> {
        Ok(self.fetch_file_listing().await?)
    }

    async fn submit_task(&self, form: &TaskFormData) -> ServiceResult<TaskSaveResponse> {
        Ok(self.submit_form(form).await?)
    }

    async fn fetch_feedback(&self, submission_id: &str) -> ServiceResult<FeedbackResponse> {
        Ok(self.fetch_submission(submission_id).await?)
    }
}
