//! Event handling for the TUI application

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Events that can occur in the TUI application
#[derive(Debug, Clone)]
pub enum Event {
    /// Terminal input event (keyboard, mouse, resize)
    Input(CrosstermEvent),
    /// Tick event for periodic updates
    Tick,
    /// Application should quit
    Quit,
    /// Error occurred while reading input
    Error(String),
}

const TICK_INTERVAL: Duration = Duration::from_millis(250);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Event handler owning the input and tick tasks
pub struct EventHandler {
    sender: mpsc::UnboundedSender<Event>,
    receiver: mpsc::UnboundedReceiver<Event>,
    cancellation_token: CancellationToken,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancellation_token = CancellationToken::new();

        Self {
            sender,
            receiver,
            cancellation_token,
        }
    }

    /// Start the input-reading and tick tasks
    pub fn run(&self) {
        let sender = self.sender.clone();
        let token = self.cancellation_token.clone();
        tokio::task::spawn_blocking(move || Self::input_loop(sender, token));

        let sender = self.sender.clone();
        let token = self.cancellation_token.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if sender.send(Event::Tick).is_err() {
                            break;
                        }
                    }
                }
            }
        });
    }

    /// Get the next event
    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Stop the background tasks
    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    fn input_loop(sender: mpsc::UnboundedSender<Event>, token: CancellationToken) {
        loop {
            if token.is_cancelled() {
                break;
            }
            match event::poll(POLL_INTERVAL) {
                Ok(false) => continue,
                Ok(true) => match event::read() {
                    Ok(evt) => {
                        if Self::should_quit(&evt) {
                            let _ = sender.send(Event::Quit);
                            break;
                        }
                        if sender.send(Event::Input(evt)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        let _ = sender.send(Event::Error(e.to_string()));
                        break;
                    }
                },
                Err(e) => {
                    let _ = sender.send(Event::Error(e.to_string()));
                    break;
                }
            }
        }
    }

    /// Ctrl+C quits unconditionally. Plain characters never do: they may be
    /// headed for an editor buffer.
    fn should_quit(event: &CrosstermEvent) -> bool {
        matches!(
            event,
            CrosstermEvent::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            })
        )
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_quit() {
        let ctrl_c = CrosstermEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(EventHandler::should_quit(&ctrl_c));

        // Plain characters and Escape go to the application
        let c = CrosstermEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE));
        assert!(!EventHandler::should_quit(&c));
        let esc = CrosstermEvent::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert!(!EventHandler::should_quit(&esc));
    }
}
