//! Messages that drive the TUI state machine
//!
//! All external stimuli are funneled into these typed messages consumed by
//! the Model's update(msg) method.

use crossterm::event::KeyEvent;
use studio_client_api::ServiceError;

/// Messages that can be sent to the TUI state machine
#[derive(Debug, Clone)]
pub enum Msg {
    /// Keyboard input event
    Key(KeyEvent),
    /// Time tick event
    Tick,
    /// Network completion
    Net(NetMsg),
    /// Quit the application
    Quit,
}

/// Network completions delivered back to the update loop
#[derive(Debug, Clone)]
pub enum NetMsg {
    /// A tab-content fetch finished. The tab may have been closed in the
    /// meantime; the session drops such results by id.
    FileLoaded {
        tab_id: u64,
        result: Result<String, ServiceError>,
    },
}
