//! Main TUI application loop

use std::io::{self, stdout};
use std::sync::Arc;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use studio_api_contract::LoadedProblem;
use studio_client_api::TaskService;
use tokio::sync::mpsc;

use crate::error::TuiResult;
use crate::event::{Event, EventHandler};
use crate::model::{Model, Status};
use crate::msg::{Msg, NetMsg};
use crate::ui;
use crate::viewmodel::ViewModel;

/// Main TUI application
pub struct App<C: TaskService + 'static> {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    event_handler: EventHandler,
    net_rx: mpsc::UnboundedReceiver<NetMsg>,
    model: Model<C>,
}

impl<C: TaskService + 'static> App<C> {
    /// Create a new TUI application and take over the terminal
    pub fn new(client: Arc<C>, task_id: &str) -> TuiResult<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let (net_tx, net_rx) = mpsc::unbounded_channel();
        let model = Model::new(client, task_id, net_tx);

        Ok(Self {
            terminal,
            event_handler: EventHandler::new(),
            net_rx,
            model,
        })
    }

    /// Run the application until the author quits
    pub async fn run(&mut self, problems: &[LoadedProblem]) -> TuiResult<()> {
        tracing::info!(problems = problems.len(), "starting studio session");
        self.event_handler.run();

        if let Err(e) = self.model.load_initial_data(problems).await {
            self.model.status = Some(Status::Error(vec![format!(
                "Failed to load the task: {e}"
            )]));
        }

        loop {
            let view_model = ViewModel::from_model(&self.model);
            self.terminal.draw(|f| ui::draw(f, f.area(), &view_model))?;

            tokio::select! {
                event = self.event_handler.next() => match event {
                    Some(Event::Quit) | None => break,
                    Some(Event::Input(evt)) => {
                        if let crossterm::event::Event::Key(key) = evt {
                            self.model.update(Msg::Key(key)).await;
                        }
                    }
                    Some(Event::Tick) => self.model.update(Msg::Tick).await,
                    Some(Event::Error(e)) => {
                        self.model.status = Some(Status::Error(vec![format!("Input error: {e}")]));
                    }
                },
                net = self.net_rx.recv() => {
                    if let Some(net) = net {
                        self.model.update(Msg::Net(net)).await;
                    }
                }
            }

            if self.model.should_quit {
                break;
            }
        }

        self.event_handler.cancel();
        Ok(())
    }
}

impl<C: TaskService + 'static> Drop for App<C> {
    fn drop(&mut self) {
        // Hand the terminal back
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}
