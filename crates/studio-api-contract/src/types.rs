//! API contract types for the task-studio editing service

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ContractError;

/// Actions understood by the `<task>/files` endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAction {
    Edit,
    EditSave,
    Delete,
    Rename,
    Create,
    Upload,
}

/// Request body for the `<task>/files` endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileActionRequest {
    pub action: FileAction,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl FileActionRequest {
    /// Request the contents of a file for editing
    pub fn edit(path: impl Into<String>) -> Self {
        Self {
            action: FileAction::Edit,
            path: path.into(),
            new_path: None,
            content: None,
        }
    }

    /// Persist an open editor's content
    pub fn edit_save(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            action: FileAction::EditSave,
            path: path.into(),
            new_path: None,
            content: Some(content.into()),
        }
    }

    /// Delete a file
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            action: FileAction::Delete,
            path: path.into(),
            new_path: None,
            content: None,
        }
    }

    /// Rename/move a file
    pub fn rename(path: impl Into<String>, new_path: impl Into<String>) -> Self {
        Self {
            action: FileAction::Rename,
            path: path.into(),
            new_path: Some(new_path.into()),
            content: None,
        }
    }

    /// Create an empty file
    pub fn create(path: impl Into<String>) -> Self {
        Self {
            action: FileAction::Create,
            path: path.into(),
            new_path: None,
            content: None,
        }
    }
}

/// Response of `{action: "edit"}`; exactly one of the fields is set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEditResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of `{action: "edit_save"}`; an empty object on success
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSaveResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Re-rendered file-listing fragment returned by the mutating file actions
/// and the plain listing refresh. Opaque to the controller; the shell
/// renders it as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileListing(pub String);

/// Response of the task-persistence form submission.
///
/// `status == "ok"` is the only success indicator; anything else is a
/// failure, with `message` carrying the server's explanation when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSaveResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TaskSaveResponse {
    pub fn ok() -> Self {
        Self {
            status: Some("ok".to_string()),
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some("ok")
    }
}

/// Subproblem type tags, matching the template names of the editing form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Code,
    CodeSingleLine,
    CodeFile,
    Custom,
    Match,
    MultipleChoice,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Code => "code",
            BlockKind::CodeSingleLine => "code_single_line",
            BlockKind::CodeFile => "code_file",
            BlockKind::Custom => "custom",
            BlockKind::Match => "match",
            BlockKind::MultipleChoice => "multiple_choice",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "code" => Ok(BlockKind::Code),
            "code_single_line" => Ok(BlockKind::CodeSingleLine),
            "code_file" => Ok(BlockKind::CodeFile),
            "custom" => Ok(BlockKind::Custom),
            "match" => Ok(BlockKind::Match),
            "multiple_choice" => Ok(BlockKind::MultipleChoice),
            other => Err(ContractError::UnknownBlockKind(other.to_string())),
        }
    }
}

/// One selectable option of a loaded multiple-choice subproblem
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub valid: bool,
}

/// A subproblem record as delivered with the editing page and as submitted
/// back inside the structural form.
///
/// Only the fields relevant to the record's `kind` are populated; the
/// type-specific initializers ignore the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemData {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_exts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub multiple: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub centralize: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<ChoiceData>,
}

impl ProblemData {
    /// Empty record for a freshly created subproblem of the given kind
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            name: None,
            header: None,
            language: None,
            optional: false,
            max_size: None,
            allowed_exts: Vec::new(),
            custom: None,
            answer: None,
            limit: None,
            multiple: false,
            centralize: false,
            success_message: None,
            error_message: None,
            choices: Vec::new(),
        }
    }
}

/// A subproblem record paired with its id, as loaded at session start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedProblem {
    pub id: String,
    #[serde(flatten)]
    pub data: ProblemData,
}

/// One serialized subproblem inside the structural form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemForm {
    pub id: String,
    /// Visual position at submit time, 0-based and contiguous
    pub order: usize,
    #[serde(flatten)]
    pub data: ProblemData,
}

/// The structural form submitted to the task-persistence endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFormData {
    pub task_id: String,
    pub problems: Vec<ProblemForm>,
}

/// Submission feedback payload (`GET <submission>/<sid>`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<FeedbackData>,
}

/// The feedback body for one graded submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackData {
    pub result: String,
    pub grade: f64,
    pub text: String,
    #[serde(default)]
    pub problems: Vec<String>,
}
