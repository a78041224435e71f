//! Editor-session controller for the task-studio authoring UI.
//!
//! This crate tracks open editors, file tabs, and subproblem blocks for one
//! authoring session, and drives the save transaction that persists every
//! open editor and the structural form through a
//! [`studio_client_api::TaskService`] implementation.

pub mod blocks;
pub mod editor;
pub mod error;
pub mod feedback;
pub mod form;
pub mod registry;
pub mod save;
pub mod session;
pub mod tabs;

/// Core result type used throughout the session controller.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for session operations.
pub use error::Error;

pub use blocks::{Block, BlockManager, Choice};
pub use feedback::load_feedback;
pub use editor::{detect_mode, BufferEditor, BufferEditorFactory, EditorFactory, EditorMode, EditorWidget};
pub use registry::{EditorHandle, EditorRegistry};
pub use save::{submit, SaveOutcome};
pub use session::{AlwaysConfirm, ConfirmGuard, NeverConfirm, StudioSession, TabOpened};
pub use tabs::{Tab, TabContent, TabManager};
