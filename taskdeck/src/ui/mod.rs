//! Terminal UI rendering.

pub mod editor;
pub mod header;
pub mod status_bar;
pub mod task_list;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::App;

/// Main draw function for the entire UI.
pub fn draw(frame: &mut Frame, app: &App) {
    let banner_height = u16::from(app.snapshot.error.is_some());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // Header
            Constraint::Length(banner_height), // Error banner
            Constraint::Min(3),                // Tasks
            Constraint::Length(1),             // Status bar
        ])
        .split(frame.area());

    header::render(frame, chunks[0], app);
    if let Some(error) = &app.snapshot.error {
        render_banner(frame, chunks[1], error);
    }
    task_list::render(frame, chunks[2], app);
    status_bar::render(frame, chunks[3], app);

    if let Some(form) = &app.form {
        editor::render(frame, frame.area(), form);
    }
}

fn render_banner(frame: &mut Frame, area: Rect, message: &str) {
    let line = Line::from(Span::raw(format!(" ⚠ {message}")));
    frame.render_widget(Paragraph::new(line).style(theme::error_banner()), area);
}
