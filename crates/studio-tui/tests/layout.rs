//! Layout rendering tests for the studio TUI

use std::sync::Arc;

use studio_api_contract::{BlockKind, LoadedProblem, ProblemData};
use studio_core::TabOpened;
use studio_rest_client_mock::MockService;
use studio_tui::{create_test_terminal, Model, NetMsg, ViewModel};
use tokio::sync::mpsc;

fn model() -> Model<MockService> {
    let (net_tx, _net_rx) = mpsc::unbounded_channel::<NetMsg>();
    Model::new(Arc::new(MockService::new()), "demo-task", net_tx)
}

fn render(model: &Model<MockService>, width: u16, height: u16) -> String {
    let mut terminal = create_test_terminal(width, height);
    let view_model = ViewModel::from_model(model);

    terminal
        .draw(|f| studio_tui::ui::draw(f, f.area(), &view_model))
        .unwrap();

    let buffer = terminal.backend().buffer();
    buffer.content().iter().map(|cell| cell.symbol()).collect()
}

#[test]
fn test_layout_names_the_task_and_panes() {
    let mut model = model();
    model
        .session
        .load(&[LoadedProblem {
            id: "warmup".to_string(),
            data: ProblemData::new(BlockKind::Match),
        }])
        .unwrap();

    let text = render(&model, 100, 30);

    assert!(text.contains("Task: demo-task"));
    assert!(text.contains("Files"));
    assert!(text.contains("Subproblems"));
    assert!(text.contains("warmup"));
    assert!(text.contains("No file open"));
}

#[test]
fn test_open_tab_content_is_rendered() {
    let mut model = model();
    let TabOpened::Opened { tab_id } = model.session.open_tab("run.sh") else {
        panic!("expected a new tab");
    };
    model.session.file_loaded(tab_id, Ok("echo hello".to_string()));

    let text = render(&model, 100, 30);

    assert!(text.contains("run.sh"));
    assert!(text.contains("echo hello"));
}

#[test]
fn test_error_status_is_listed() {
    let mut model = model();
    model.status = Some(studio_tui::Status::Error(vec![
        "An error occurred while saving the file a.sh".to_string(),
    ]));

    let text = render(&model, 100, 30);

    assert!(text.contains("Some error(s) occurred when saving the task:"));
    assert!(text.contains("a.sh"));
}

#[test]
fn test_small_terminal_still_renders() {
    let model = model();
    let text = render(&model, 60, 16);

    assert!(text.contains("Files"));
}
