//! ViewModel layer - derived presentation state shaped for rendering
//!
//! The ViewModel transforms session state into presentation-ready data
//! (strings, selection flags, focus indicators) that the view consumes.
//! Pure data, no business logic.

use studio_api_contract::BlockKind;
use studio_client_api::TaskService;
use studio_core::TabContent;

use crate::model::{Focus, Model, Status};

/// One rendered tab label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabView {
    pub label: String,
    pub active: bool,
}

/// One rendered subproblem row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockView {
    pub line: String,
    pub selected: bool,
}

/// Status area contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub lines: Vec<String>,
    pub error: bool,
}

/// Modal overlay contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalView {
    Confirm { message: String },
    NewBlock { pid: String, kind: String },
}

/// Presentation state derived from the Model
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub task_id: String,
    pub tabs: Vec<TabView>,
    pub editor_title: String,
    pub editor_body: String,
    pub files: Vec<String>,
    pub file_index: usize,
    pub blocks: Vec<BlockView>,
    pub focus: Focus,
    pub status: Option<StatusView>,
    pub modal: Option<ModalView>,
    pub saving: bool,
}

impl ViewModel {
    /// Create a ViewModel from the current model state
    pub fn from_model<C: TaskService + 'static>(model: &Model<C>) -> Self {
        let session = &model.session;

        let tabs = session
            .tabs()
            .iter()
            .map(|tab| {
                let dirty =
                    session.registry().contains(tab.path()) && !session.registry().is_clean(tab.path());
                TabView {
                    label: if dirty {
                        format!("{} *", tab.path())
                    } else {
                        tab.path().to_string()
                    },
                    active: session.tabs().active().map(|a| a.id()) == Some(tab.id()),
                }
            })
            .collect();

        let (editor_title, editor_body) = match session.tabs().active() {
            Some(tab) => {
                let body = match tab.content() {
                    TabContent::Loading => "Loading...".to_string(),
                    TabContent::Failed(message) => message.clone(),
                    TabContent::Ready => session.registry().content(tab.path()).unwrap_or_default(),
                };
                (tab.path().to_string(), body)
            }
            None => ("No file open".to_string(), String::new()),
        };

        let blocks = session
            .blocks()
            .iter()
            .enumerate()
            .map(|(position, block)| {
                let mut line = format!("{}. {} [{}]", position + 1, block.pid(), block.kind());
                if block.kind() == BlockKind::MultipleChoice {
                    line.push_str(&format!(" ({} choices)", block.choices().count()));
                }
                BlockView {
                    line,
                    selected: position == model.block_index,
                }
            })
            .collect();

        let status = model.status.as_ref().map(|status| match status {
            Status::Info(message) => StatusView {
                lines: message.lines().map(str::to_string).collect(),
                error: false,
            },
            Status::Success(message) => StatusView {
                lines: vec![message.clone()],
                error: false,
            },
            Status::Error(errors) => {
                let mut lines =
                    vec!["Some error(s) occurred when saving the task:".to_string()];
                lines.extend(errors.iter().map(|e| format!("- {e}")));
                StatusView { lines, error: true }
            }
        });

        let modal = if let Some(pending) = &model.pending_confirm {
            Some(ModalView::Confirm {
                message: format!("{} [y/n]", pending.message),
            })
        } else {
            model.new_block.as_ref().map(|prompt| ModalView::NewBlock {
                pid: prompt.pid.clone(),
                kind: prompt.kind.to_string(),
            })
        };

        Self {
            task_id: session.task_id().to_string(),
            tabs,
            editor_title,
            editor_body,
            files: model.visible_files(),
            file_index: model.file_index,
            blocks,
            focus: model.focus,
            status,
            modal,
            saving: session.is_saving(),
        }
    }
}
