//! One authoring session: the registries, the guards, and the operations
//! the shell invokes.
//!
//! All mutable state of the editing page lives here; the shell constructs
//! one `StudioSession` when editing starts and drops it on navigation.

use studio_api_contract::{BlockKind, ChoiceData, FileListing, LoadedProblem, ProblemData, TaskFormData};
use studio_client_api::{ServiceResult, TaskService};

use crate::blocks::BlockManager;
use crate::editor::{detect_mode, EditorFactory};
use crate::form::serialize_task_form;
use crate::registry::EditorRegistry;
use crate::tabs::{TabContent, TabManager};
use crate::Result;

/// Decides yes/no questions the controller cannot answer on its own
/// (discard unsaved changes, delete a subproblem).
pub trait ConfirmGuard {
    fn confirm(&self, message: &str) -> bool;
}

/// Guard that always answers yes; used where the shell has already asked.
pub struct AlwaysConfirm;

impl ConfirmGuard for AlwaysConfirm {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

/// Guard that always declines.
pub struct NeverConfirm;

impl ConfirmGuard for NeverConfirm {
    fn confirm(&self, _message: &str) -> bool {
        false
    }
}

/// Outcome of [`StudioSession::open_tab`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabOpened {
    /// A tab for the path already existed and is now active.
    Activated,
    /// A new tab was inserted; the caller must fetch the file content and
    /// deliver it through [`StudioSession::file_loaded`] under this id.
    Opened { tab_id: u64 },
}

/// Session state for one task being edited.
pub struct StudioSession {
    task_id: String,
    registry: EditorRegistry,
    tabs: TabManager,
    blocks: BlockManager,
    file_listing: FileListing,
    saving: bool,
    loading_feedback: bool,
}

impl StudioSession {
    pub fn new(task_id: impl Into<String>, factory: Box<dyn EditorFactory>) -> Self {
        Self {
            task_id: task_id.into(),
            registry: EditorRegistry::new(factory),
            tabs: TabManager::new(),
            blocks: BlockManager::new(),
            file_listing: FileListing::default(),
            saving: false,
            loading_feedback: false,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn registry(&self) -> &EditorRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EditorRegistry {
        &mut self.registry
    }

    pub fn tabs(&self) -> &TabManager {
        &self.tabs
    }

    pub fn blocks(&self) -> &BlockManager {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut BlockManager {
        &mut self.blocks
    }

    pub fn file_listing(&self) -> &FileListing {
        &self.file_listing
    }

    /// Whether a save transaction is currently in flight.
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub(crate) fn set_saving(&mut self, saving: bool) {
        self.saving = saving;
    }

    pub(crate) fn is_loading_feedback(&self) -> bool {
        self.loading_feedback
    }

    pub(crate) fn set_loading_feedback(&mut self, loading: bool) {
        self.loading_feedback = loading;
    }

    // ---- blocks ----------------------------------------------------------

    /// Build blocks for the subproblems delivered with the editing page.
    pub fn load(&mut self, problems: &[LoadedProblem]) -> Result<()> {
        self.blocks.load(problems, &mut self.registry)
    }

    pub fn create_block(
        &mut self,
        pid: &str,
        kind: BlockKind,
        data: Option<&ProblemData>,
    ) -> Result<()> {
        self.blocks.create(pid, kind, data, &mut self.registry)
    }

    /// Delete a subproblem after user confirmation. Returns whether the
    /// block was removed.
    pub fn delete_block(&mut self, pid: &str, guard: &dyn ConfirmGuard) -> bool {
        if self.blocks.get(pid).is_none() {
            return false;
        }
        if !guard.confirm("Are you sure that you want to delete this subproblem?") {
            return false;
        }
        self.blocks.delete(pid, &mut self.registry)
    }

    pub fn move_block_up(&mut self, pid: &str) {
        self.blocks.move_up(pid);
    }

    pub fn move_block_down(&mut self, pid: &str) {
        self.blocks.move_down(pid);
    }

    pub fn add_choice(&mut self, pid: &str, data: Option<&ChoiceData>) -> Result<usize> {
        self.blocks.add_choice(pid, data, &mut self.registry)
    }

    pub fn delete_choice(&mut self, pid: &str, index: usize) {
        self.blocks.delete_choice(pid, index, &mut self.registry);
    }

    // ---- tabs ------------------------------------------------------------

    /// Open (or re-activate) the tab for `path`.
    pub fn open_tab(&mut self, path: &str) -> TabOpened {
        if self.tabs.contains(path) {
            self.tabs.activate(path);
            return TabOpened::Activated;
        }
        let tab_id = self.tabs.insert(path);
        TabOpened::Opened { tab_id }
    }

    /// Deliver a content-fetch result. Results for tab ids that no longer
    /// exist are dropped: the tab was closed while the fetch was in flight.
    pub fn file_loaded(&mut self, tab_id: u64, result: ServiceResult<String>) {
        let Some(tab) = self.tabs.by_id(tab_id) else {
            tracing::debug!(tab_id, "dropping stale file fetch result");
            return;
        };
        let path = tab.path().to_string();
        match result {
            Ok(content) => {
                let mode = detect_mode(&path, &content);
                self.registry.open(&path, mode, 20, &content);
                self.tabs.set_content(tab_id, TabContent::Ready);
            }
            Err(err) => {
                tracing::warn!(path = %path, error = %err, "file content fetch failed");
                self.tabs
                    .set_content(tab_id, TabContent::Failed("The file could not be read.".to_string()));
            }
        }
    }

    /// Close the tab for `path`, releasing its editor. Unsaved changes
    /// consult `guard`; declining aborts and leaves everything intact.
    /// Returns whether the close proceeded (trivially true with no tab).
    pub fn close_tab(&mut self, path: &str, guard: &dyn ConfirmGuard) -> bool {
        if !self.tabs.contains(path) {
            return true;
        }
        if self.registry.contains(path) {
            if !self.registry.is_clean(path)
                && !guard.confirm(
                    "You have unsaved changes to this file. Do you really want to close it?",
                )
            {
                return false;
            }
            self.registry.release(path);
        }
        self.tabs.remove(path);
        true
    }

    // ---- file service actions --------------------------------------------

    /// Delete a file: confirmation first, then the open tab (if any) must
    /// close, then the service action runs and the listing refreshes.
    /// `Ok(false)` means the user backed out.
    pub async fn delete_file<C: TaskService>(
        &mut self,
        client: &C,
        path: &str,
        guard: &dyn ConfirmGuard,
    ) -> ServiceResult<bool> {
        if !guard.confirm("Are you sure you want to delete this?") {
            return Ok(false);
        }
        if !self.close_tab(path, guard) {
            return Ok(false);
        }
        self.file_listing = client.delete_file(path).await?;
        Ok(true)
    }

    /// Rename a file; the open tab must close first.
    pub async fn rename_file<C: TaskService>(
        &mut self,
        client: &C,
        path: &str,
        new_path: &str,
        guard: &dyn ConfirmGuard,
    ) -> ServiceResult<bool> {
        if !self.close_tab(path, guard) {
            return Ok(false);
        }
        self.file_listing = client.rename_file(path, new_path).await?;
        Ok(true)
    }

    /// Create an empty file. A stale tab under the same path must close
    /// first, following the same close-then-notify pattern.
    pub async fn create_file<C: TaskService>(
        &mut self,
        client: &C,
        path: &str,
        guard: &dyn ConfirmGuard,
    ) -> ServiceResult<bool> {
        if !self.close_tab(path, guard) {
            return Ok(false);
        }
        self.file_listing = client.create_file(path).await?;
        Ok(true)
    }

    /// Upload one file and refresh the listing.
    pub async fn upload_file<C: TaskService>(
        &mut self,
        client: &C,
        path: &str,
        content: Vec<u8>,
    ) -> ServiceResult<()> {
        self.file_listing = client.upload_file(path, content).await?;
        Ok(())
    }

    /// Plain refresh of the file listing.
    pub async fn refresh_file_list<C: TaskService>(&mut self, client: &C) -> ServiceResult<()> {
        self.file_listing = client.list_files().await?;
        Ok(())
    }

    // ---- form ------------------------------------------------------------

    /// Snapshot of the structural form, order derived from position.
    pub fn task_form(&self) -> TaskFormData {
        serialize_task_form(&self.task_id, &self.blocks, &self.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::BufferEditorFactory;
    use studio_client_api::ServiceError;

    fn session() -> StudioSession {
        StudioSession::new("task1", Box::new(BufferEditorFactory))
    }

    #[test]
    fn test_open_tab_twice_activates_instead_of_duplicating() {
        let mut session = session();

        let TabOpened::Opened { tab_id } = session.open_tab("run.sh") else {
            panic!("first open must insert a tab");
        };
        session.file_loaded(tab_id, Ok("#!/bin/bash\n".to_string()));

        session.open_tab("task.yaml");
        assert_eq!(session.tabs().active().unwrap().path(), "task.yaml");

        // Second open of run.sh only re-activates it
        assert_eq!(session.open_tab("run.sh"), TabOpened::Activated);
        assert_eq!(session.tabs().len(), 2);
        assert_eq!(session.registry().len(), 1);
        assert_eq!(session.tabs().active().unwrap().path(), "run.sh");
    }

    #[test]
    fn test_stale_fetch_result_is_dropped() {
        let mut session = session();

        let TabOpened::Opened { tab_id } = session.open_tab("slow.txt") else {
            panic!("expected a new tab");
        };
        session.close_tab("slow.txt", &NeverConfirm);
        assert!(session.tabs().is_empty());

        // The fetch completes after the tab is gone: nothing must change
        session.file_loaded(tab_id, Ok("late".to_string()));
        assert!(session.tabs().is_empty());
        assert!(session.registry().is_empty());
    }

    #[test]
    fn test_failed_fetch_leaves_no_editor_and_close_is_trivial() {
        let mut session = session();

        let TabOpened::Opened { tab_id } = session.open_tab("gone.txt") else {
            panic!("expected a new tab");
        };
        session.file_loaded(tab_id, Err(ServiceError::Server("nope".to_string())));

        assert!(matches!(
            session.tabs().get("gone.txt").unwrap().content(),
            TabContent::Failed(_)
        ));
        assert!(!session.registry().contains("gone.txt"));

        // No editor means no unsaved-changes prompt, even with a declining guard
        assert!(session.close_tab("gone.txt", &NeverConfirm));
        assert!(session.tabs().is_empty());
    }

    #[test]
    fn test_dirty_tab_close_respects_the_guard() {
        let mut session = session();

        let TabOpened::Opened { tab_id } = session.open_tab("run.sh") else {
            panic!("expected a new tab");
        };
        session.file_loaded(tab_id, Ok("original".to_string()));
        session.registry_mut().set_content("run.sh", "changed");

        // Declined: tab and editor stay
        assert!(!session.close_tab("run.sh", &NeverConfirm));
        assert!(session.tabs().contains("run.sh"));
        assert!(session.registry().contains("run.sh"));

        // Confirmed: both go
        assert!(session.close_tab("run.sh", &AlwaysConfirm));
        assert!(!session.tabs().contains("run.sh"));
        assert!(!session.registry().contains("run.sh"));
    }

    #[test]
    fn test_clean_tab_close_never_consults_the_guard() {
        struct PanicGuard;
        impl ConfirmGuard for PanicGuard {
            fn confirm(&self, _message: &str) -> bool {
                panic!("a clean close must not prompt");
            }
        }

        let mut session = session();
        let TabOpened::Opened { tab_id } = session.open_tab("run.sh") else {
            panic!("expected a new tab");
        };
        session.file_loaded(tab_id, Ok("content".to_string()));

        assert!(session.close_tab("run.sh", &PanicGuard));
        // And closing a path that was never opened is trivially fine
        assert!(session.close_tab("never-open.txt", &PanicGuard));
    }

    #[test]
    fn test_delete_block_asks_before_sweeping() {
        let mut session = session();
        session.create_block("q1", BlockKind::Custom, None).unwrap();
        assert_eq!(session.registry().len(), 2);

        assert!(!session.delete_block("q1", &NeverConfirm));
        assert_eq!(session.registry().len(), 2);

        assert!(session.delete_block("q1", &AlwaysConfirm));
        assert!(session.registry().is_empty());
        assert!(session.blocks().is_empty());
    }
}
