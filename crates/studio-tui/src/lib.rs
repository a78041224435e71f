//! Terminal shell for the task-studio editor session
//!
//! This crate provides a Ratatui front end over [`studio_core`]: an
//! Elm-style model processes key and network messages, a view model
//! derives presentation state, and the ui module renders it.

pub mod app;
pub mod error;
pub mod event;
pub mod model;
pub mod msg;
pub mod ui;
pub mod viewmodel;

pub use app::App;
pub use error::{TuiError, TuiResult};
pub use model::{Focus, Model, PendingAction, Status};
pub use msg::{Msg, NetMsg};
pub use viewmodel::ViewModel;

use ratatui::{backend::TestBackend, Terminal};

/// Helper for tests to render with a deterministic backend
pub fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
    let backend = TestBackend::new(width, height);
    Terminal::new(backend).expect("Failed to create test terminal")
}
