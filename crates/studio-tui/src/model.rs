//! The Model layer - session state plus view state, no Ratatui
//!
//! This is the state machine core: it processes messages and mutates the
//! studio session deterministically. All I/O goes through the injected
//! [`TaskService`]; tab-content fetches are spawned and come back as
//! [`NetMsg`] values.

use std::cell::RefCell;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use studio_api_contract::{BlockKind, LoadedProblem};
use studio_client_api::TaskService;
use studio_core::{
    load_feedback, submit, AlwaysConfirm, BufferEditorFactory, ConfirmGuard, SaveOutcome,
    StudioSession, TabOpened,
};
use tokio::sync::mpsc;

use crate::msg::{Msg, NetMsg};

/// Which pane currently receives input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Files,
    Editor,
    Blocks,
}

/// Transient status line contents
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    Success(String),
    Error(Vec<String>),
}

/// Action waiting on the author's yes/no answer
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    CloseTab { path: String },
    DeleteBlock { pid: String },
}

/// A confirmation modal the shell still has to resolve
#[derive(Debug, Clone, PartialEq)]
pub struct PendingConfirm {
    pub message: String,
    pub action: PendingAction,
}

/// Input state of the new-subproblem prompt
#[derive(Debug, Clone, PartialEq)]
pub struct NewBlockPrompt {
    pub pid: String,
    pub kind: BlockKind,
}

const BLOCK_KINDS: &[BlockKind] = &[
    BlockKind::Code,
    BlockKind::CodeSingleLine,
    BlockKind::CodeFile,
    BlockKind::Custom,
    BlockKind::Match,
    BlockKind::MultipleChoice,
];

// Ticks arrive every 250ms; the success notice survives for three seconds.
const SUCCESS_TICKS: u16 = 12;

/// Guard that declines and records the question, so the shell can raise a
/// modal and retry with [`AlwaysConfirm`] once the author agrees.
struct CaptureGuard {
    question: RefCell<Option<String>>,
}

impl CaptureGuard {
    fn new() -> Self {
        Self {
            question: RefCell::new(None),
        }
    }

    fn take(self) -> Option<String> {
        self.question.into_inner()
    }
}

impl ConfirmGuard for CaptureGuard {
    fn confirm(&self, message: &str) -> bool {
        *self.question.borrow_mut() = Some(message.to_string());
        false
    }
}

/// The Model processes messages and updates state deterministically
pub struct Model<C: TaskService> {
    pub session: StudioSession,
    client: Arc<C>,
    net_tx: mpsc::UnboundedSender<NetMsg>,
    pub focus: Focus,
    pub file_index: usize,
    pub block_index: usize,
    pub status: Option<Status>,
    status_ticks: u16,
    pub pending_confirm: Option<PendingConfirm>,
    pub new_block: Option<NewBlockPrompt>,
    pub should_quit: bool,
}

impl<C: TaskService + 'static> Model<C> {
    /// Create a new model with an empty session
    pub fn new(client: Arc<C>, task_id: &str, net_tx: mpsc::UnboundedSender<NetMsg>) -> Self {
        Self {
            session: StudioSession::new(task_id, Box::new(BufferEditorFactory)),
            client,
            net_tx,
            focus: Focus::Blocks,
            file_index: 0,
            block_index: 0,
            status: None,
            status_ticks: 0,
            pending_confirm: None,
            new_block: None,
            should_quit: false,
        }
    }

    /// Load the subproblems delivered with the editing page and fetch the
    /// initial file listing.
    pub async fn load_initial_data(&mut self, problems: &[LoadedProblem]) -> Result<(), String> {
        self.session.load(problems).map_err(|e| e.to_string())?;
        if let Err(e) = self.session.refresh_file_list(self.client.as_ref()).await {
            self.status = Some(Status::Error(vec![format!(
                "Could not load the file list: {e}"
            )]));
        }
        Ok(())
    }

    /// Process a single message and update state
    pub async fn update(&mut self, msg: Msg) {
        match msg {
            Msg::Key(key) => self.handle_key(key).await,
            Msg::Tick => self.handle_tick(),
            Msg::Net(net) => self.handle_net(net),
            Msg::Quit => self.should_quit = true,
        }
    }

    /// File names derived from the current listing fragment
    pub fn visible_files(&self) -> Vec<String> {
        self.session
            .file_listing()
            .0
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn handle_tick(&mut self) {
        // Success notices auto-dismiss; errors stay until replaced
        if matches!(self.status, Some(Status::Success(_))) {
            self.status_ticks = self.status_ticks.saturating_sub(1);
            if self.status_ticks == 0 {
                self.status = None;
            }
        }
    }

    fn handle_net(&mut self, net: NetMsg) {
        match net {
            NetMsg::FileLoaded { tab_id, result } => self.session.file_loaded(tab_id, result),
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        if self.pending_confirm.is_some() {
            self.handle_confirm_key(key);
            return;
        }
        if self.new_block.is_some() {
            self.handle_new_block_key(key);
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') => self.save().await,
                KeyCode::Char('n') => {
                    self.new_block = Some(NewBlockPrompt {
                        pid: String::new(),
                        kind: BlockKind::Code,
                    });
                }
                KeyCode::Char('w') => self.request_close_active_tab(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Files => Focus::Editor,
                    Focus::Editor => Focus::Blocks,
                    Focus::Blocks => Focus::Files,
                };
            }
            KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Files => Focus::Blocks,
                    Focus::Editor => Focus::Files,
                    Focus::Blocks => Focus::Editor,
                };
            }
            _ => match self.focus {
                Focus::Files => self.handle_files_key(key),
                Focus::Editor => self.handle_editor_key(key),
                Focus::Blocks => self.handle_blocks_key(key),
            },
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Some(pending) = self.pending_confirm.take() {
                    match pending.action {
                        PendingAction::CloseTab { path } => {
                            self.session.close_tab(&path, &AlwaysConfirm);
                        }
                        PendingAction::DeleteBlock { pid } => {
                            self.session.delete_block(&pid, &AlwaysConfirm);
                            self.clamp_block_index();
                        }
                    }
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.pending_confirm = None;
            }
            _ => {}
        }
    }

    fn handle_new_block_key(&mut self, key: KeyEvent) {
        let Some(prompt) = self.new_block.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Char(c) => prompt.pid.push(c),
            KeyCode::Backspace => {
                prompt.pid.pop();
            }
            KeyCode::Tab => {
                let current = BLOCK_KINDS.iter().position(|k| *k == prompt.kind).unwrap_or(0);
                prompt.kind = BLOCK_KINDS[(current + 1) % BLOCK_KINDS.len()];
            }
            KeyCode::Enter => self.create_block_from_prompt(),
            KeyCode::Esc => self.new_block = None,
            _ => {}
        }
    }

    fn create_block_from_prompt(&mut self) {
        let Some(prompt) = self.new_block.take() else {
            return;
        };
        match self.session.create_block(&prompt.pid, prompt.kind, None) {
            Ok(()) => {
                self.block_index = self.session.blocks().len().saturating_sub(1);
                self.focus = Focus::Blocks;
            }
            Err(err) => {
                // Validation failures are blocking messages; the prompt
                // stays open so the author can fix the id.
                self.status = Some(Status::Error(vec![err.to_string()]));
                self.new_block = Some(prompt);
            }
        }
    }

    fn handle_files_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => {
                self.file_index = self.file_index.saturating_sub(1);
            }
            KeyCode::Down => {
                let max = self.visible_files().len().saturating_sub(1);
                if self.file_index < max {
                    self.file_index += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(path) = self.visible_files().get(self.file_index).cloned() {
                    self.open_file(path);
                }
            }
            _ => {}
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let Some(path) = self.session.tabs().active().map(|t| t.path().to_string()) else {
            return;
        };
        match key.code {
            KeyCode::Char(c) => self.edit_active(&path, |content| content.push(c)),
            KeyCode::Enter => self.edit_active(&path, |content| content.push('\n')),
            KeyCode::Backspace => self.edit_active(&path, |content| {
                content.pop();
            }),
            _ => {}
        }
    }

    fn handle_blocks_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => {
                self.block_index = self.block_index.saturating_sub(1);
            }
            KeyCode::Down => {
                let max = self.session.blocks().len().saturating_sub(1);
                if self.block_index < max {
                    self.block_index += 1;
                }
            }
            KeyCode::Char('k') => {
                if let Some(pid) = self.selected_pid() {
                    self.session.move_block_up(&pid);
                    self.block_index = self.block_index.saturating_sub(1);
                }
            }
            KeyCode::Char('j') => {
                if let Some(pid) = self.selected_pid() {
                    let max = self.session.blocks().len().saturating_sub(1);
                    self.session.move_block_down(&pid);
                    if self.block_index < max {
                        self.block_index += 1;
                    }
                }
            }
            KeyCode::Char('d') => self.request_delete_selected_block(),
            KeyCode::Char('c') => {
                if let Some(pid) = self.selected_pid() {
                    if let Err(err) = self.session.add_choice(&pid, None) {
                        self.status = Some(Status::Error(vec![err.to_string()]));
                    }
                }
            }
            _ => {}
        }
    }

    fn selected_pid(&self) -> Option<String> {
        self.session
            .blocks()
            .iter()
            .nth(self.block_index)
            .map(|b| b.pid().to_string())
    }

    fn clamp_block_index(&mut self) {
        let max = self.session.blocks().len().saturating_sub(1);
        if self.block_index > max {
            self.block_index = max;
        }
    }

    fn edit_active(&mut self, path: &str, edit: impl FnOnce(&mut String)) {
        if let Some(mut content) = self.session.registry().content(path) {
            edit(&mut content);
            self.session.registry_mut().set_content(path, &content);
        }
    }

    fn open_file(&mut self, path: String) {
        match self.session.open_tab(&path) {
            TabOpened::Activated => {}
            TabOpened::Opened { tab_id } => self.spawn_fetch(tab_id, path),
        }
        self.focus = Focus::Editor;
    }

    fn spawn_fetch(&self, tab_id: u64, path: String) {
        let client = Arc::clone(&self.client);
        let net_tx = self.net_tx.clone();
        tokio::spawn(async move {
            let result = client.fetch_file(&path).await;
            // The receiver may be gone during shutdown; nothing to do then
            let _ = net_tx.send(NetMsg::FileLoaded { tab_id, result });
        });
    }

    fn request_close_active_tab(&mut self) {
        let Some(path) = self.session.tabs().active().map(|t| t.path().to_string()) else {
            return;
        };
        let guard = CaptureGuard::new();
        if !self.session.close_tab(&path, &guard) {
            if let Some(message) = guard.take() {
                self.pending_confirm = Some(PendingConfirm {
                    message,
                    action: PendingAction::CloseTab { path },
                });
            }
        }
    }

    fn request_delete_selected_block(&mut self) {
        let Some(pid) = self.selected_pid() else {
            return;
        };
        let guard = CaptureGuard::new();
        if !self.session.delete_block(&pid, &guard) {
            if let Some(message) = guard.take() {
                self.pending_confirm = Some(PendingConfirm {
                    message,
                    action: PendingAction::DeleteBlock { pid },
                });
            }
        }
        self.clamp_block_index();
    }

    async fn save(&mut self) {
        self.status = Some(Status::Info("Saving...".to_string()));
        if let Some(outcome) = submit(&mut self.session, self.client.as_ref()).await {
            self.status = Some(match outcome {
                SaveOutcome::Success => {
                    self.status_ticks = SUCCESS_TICKS;
                    Status::Success("Task saved.".to_string())
                }
                SaveOutcome::Failed(errors) => Status::Error(errors),
            });
        }
    }

    /// Show the feedback for an old submission in the status area.
    pub async fn show_feedback(&mut self, submission_id: &str) {
        if let Some(report) =
            load_feedback(&mut self.session, self.client.as_ref(), submission_id).await
        {
            self.status = Some(Status::Info(report));
        }
    }
}
