//! Header line: application title and the active view selection.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::App;

/// Render the header.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let selection = app.snapshot.selection;
    let line = Line::from(vec![
        Span::styled(" Task Manager", theme::bold()),
        Span::raw("   "),
        Span::styled("[f] ", theme::dimmed()),
        Span::styled(selection.filter.label(), theme::highlighted()),
        Span::raw("   "),
        Span::styled("[s] ", theme::dimmed()),
        Span::styled(selection.sort_key.label(), theme::highlighted()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
