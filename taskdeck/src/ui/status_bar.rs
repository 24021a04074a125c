//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::App;

const LIST_HELP: &str =
    "n: new | e: edit | space: toggle | d: delete | f: filter | s: sort | r: refresh | q: quit";
const EDITOR_HELP: &str = "Tab: next field | ←→: change | Enter: save | Esc: cancel";

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = if app.form.is_some() {
        EDITOR_HELP
    } else {
        LIST_HELP
    };

    let (indicator, activity) = if app.snapshot.loading {
        (
            Span::styled(app.spinner_frame(), theme::normal().fg(theme::WARNING)),
            "Loading...".to_string(),
        )
    } else {
        let updated = app
            .updated_label()
            .map_or_else(|| "Not loaded".to_string(), |t| format!("Updated {t}"));
        let dot_color = if app.snapshot.error.is_some() {
            theme::ERROR
        } else {
            theme::SUCCESS
        };
        (Span::styled("●", theme::normal().fg(dot_color)), updated)
    };

    let status_line = Line::from(vec![
        Span::styled(
            concat!("Taskdeck v", env!("CARGO_PKG_VERSION")),
            theme::bold(),
        ),
        Span::raw(" | "),
        indicator,
        Span::raw(format!(" {} ({activity})", app.store_label)),
        Span::raw(" | "),
        Span::styled(help_text, theme::dimmed()),
    ]);

    let paragraph = Paragraph::new(status_line).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
