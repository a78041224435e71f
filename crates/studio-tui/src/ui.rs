//! UI components for the TUI application

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};

use crate::model::Focus;
use crate::viewmodel::{ModalView, ViewModel};

/// Draw the whole studio layout
pub fn draw(f: &mut ratatui::Frame, area: Rect, view_model: &ViewModel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                              // File tabs
            Constraint::Min(8),                                 // Files + editor
            Constraint::Length(8),                              // Subproblems
            Constraint::Length(status_height(view_model)),      // Status
            Constraint::Length(1),                              // Footer
        ])
        .split(area);

    draw_tab_bar(f, chunks[0], view_model);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(20)])
        .split(chunks[1]);
    draw_file_list(f, middle[0], view_model);
    draw_editor(f, middle[1], view_model);

    draw_blocks(f, chunks[2], view_model);
    draw_status(f, chunks[3], view_model);
    draw_footer(f, chunks[4], view_model);

    if let Some(modal) = &view_model.modal {
        draw_modal(f, area, modal);
    }
}

fn status_height(view_model: &ViewModel) -> u16 {
    match &view_model.status {
        Some(status) => (status.lines.len() as u16 + 2).min(8),
        None => 0,
    }
}

fn draw_tab_bar(f: &mut ratatui::Frame, area: Rect, view_model: &ViewModel) {
    let titles: Vec<Line> = view_model
        .tabs
        .iter()
        .map(|tab| Line::from(tab.label.as_str()))
        .collect();
    let selected = view_model.tabs.iter().position(|t| t.active).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Task: {}", view_model.task_id)),
        );

    f.render_widget(tabs, area);
}

fn draw_file_list(f: &mut ratatui::Frame, area: Rect, view_model: &ViewModel) {
    let items: Vec<ListItem> = if view_model.files.is_empty() {
        vec![ListItem::new("No files")]
    } else {
        view_model
            .files
            .iter()
            .map(|path| ListItem::new(path.as_str()))
            .collect()
    };

    let mut state = ListState::default();
    if !view_model.files.is_empty() {
        state.select(Some(view_model.file_index));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .style(focus_style(view_model, Focus::Files))
                .title("Files"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    f.render_stateful_widget(list, area, &mut state);
}

fn draw_editor(f: &mut ratatui::Frame, area: Rect, view_model: &ViewModel) {
    let paragraph = Paragraph::new(view_model.editor_body.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .style(focus_style(view_model, Focus::Editor))
                .title(view_model.editor_title.as_str()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}

fn draw_blocks(f: &mut ratatui::Frame, area: Rect, view_model: &ViewModel) {
    let items: Vec<ListItem> = if view_model.blocks.is_empty() {
        vec![ListItem::new("No subproblems yet (Ctrl+N to add one)")]
    } else {
        view_model
            .blocks
            .iter()
            .map(|block| ListItem::new(block.line.as_str()))
            .collect()
    };

    let mut state = ListState::default();
    if let Some(selected) = view_model.blocks.iter().position(|b| b.selected) {
        state.select(Some(selected));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .style(focus_style(view_model, Focus::Blocks))
                .title("Subproblems"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    f.render_stateful_widget(list, area, &mut state);
}

fn draw_status(f: &mut ratatui::Frame, area: Rect, view_model: &ViewModel) {
    let Some(status) = &view_model.status else {
        return;
    };

    let style = if status.error {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    };

    let text: Vec<Line> = status.lines.iter().map(|l| Line::from(l.as_str())).collect();
    let paragraph = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, area);
}

fn draw_footer(f: &mut ratatui::Frame, area: Rect, view_model: &ViewModel) {
    let mut shortcuts = vec![
        Span::styled("Tab", Style::default().fg(Color::Cyan)),
        Span::raw(" Pane • "),
        Span::styled("Ctrl+S", Style::default().fg(Color::Green)),
        Span::raw(" Save • "),
        Span::styled("Ctrl+N", Style::default().fg(Color::Yellow)),
        Span::raw(" New subproblem • "),
        Span::styled("Ctrl+W", Style::default().fg(Color::Yellow)),
        Span::raw(" Close tab • "),
        Span::styled("Ctrl+C", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];
    if view_model.saving {
        shortcuts.push(Span::styled(
            "  [saving]",
            Style::default().fg(Color::Yellow),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(shortcuts)), area);
}

fn draw_modal(f: &mut ratatui::Frame, area: Rect, modal: &ModalView) {
    let popup_area = centered_rect(60, 20, area);
    f.render_widget(Clear, popup_area);

    let (title, body) = match modal {
        ModalView::Confirm { message } => ("Confirm", message.clone()),
        ModalView::NewBlock { pid, kind } => (
            "New subproblem",
            format!("id: {pid}_\ntype: {kind} (Tab to change)\nEnter to create, Esc to cancel"),
        ),
    };

    let paragraph = Paragraph::new(body)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

fn focus_style(view_model: &ViewModel, pane: Focus) -> Style {
    if view_model.focus == pane {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

/// Helper function to create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
