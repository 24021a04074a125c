//! Editor modal rendering.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Flex, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::theme;
use crate::app::{EditorForm, FormField};

/// Width and height of the modal, in cells.
const MODAL_SIZE: (u16, u16) = (60, 13);

/// Render the editor form as a centered modal over `area`.
pub fn render(frame: &mut Frame, area: Rect, form: &EditorForm) {
    let modal = centered(area, MODAL_SIZE.0, MODAL_SIZE.1);
    frame.render_widget(Clear, modal);

    let title = if form.submitting {
        format!(" {} (saving...) ", form.heading())
    } else {
        format!(" {} ", form.heading())
    };
    let block = Block::default()
        .title(Span::styled(title, theme::highlighted()))
        .borders(Borders::ALL)
        .border_style(theme::highlighted());
    let inner = block.inner(modal);
    frame.render_widget(block, modal);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(inner);

    render_text_field(frame, rows[0], form, FormField::Title);
    render_text_field(frame, rows[1], form, FormField::Description);

    let choices = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);
    render_choice_field(frame, choices[0], form, FormField::Priority);
    render_choice_field(frame, choices[1], form, FormField::Status);

    let hint = if form.draft.fields().has_title() {
        Span::styled("Enter to save, Esc to cancel", theme::dimmed())
    } else {
        Span::styled("A title is required", theme::normal().fg(theme::WARNING))
    };
    frame.render_widget(Paragraph::new(Line::from(hint)), rows[3]);
}

fn field_block(form: &EditorForm, field: FormField) -> Block<'static> {
    let focused = form.field == field;
    Block::default()
        .title(field.label())
        .borders(Borders::ALL)
        .border_style(if focused {
            theme::highlighted()
        } else {
            theme::normal()
        })
}

/// Text input with a block cursor when focused.
fn render_text_field(frame: &mut Frame, area: Rect, form: &EditorForm, field: FormField) {
    let mut text = form.value(field).to_string();
    if form.field == field {
        let at = text
            .char_indices()
            .nth(form.cursor)
            .map_or(text.len(), |(i, _)| i);
        text.insert(at, '█');
    }
    let paragraph = Paragraph::new(Line::from(Span::styled(text, theme::normal())))
        .block(field_block(form, field));
    frame.render_widget(paragraph, area);
}

fn render_choice_field(frame: &mut Frame, area: Rect, form: &EditorForm, field: FormField) {
    let value = form.value(field);
    let style = if field == FormField::Priority {
        theme::panel_title(theme::priority_color(form.draft.fields().priority))
    } else {
        theme::normal()
    };
    let line = Line::from(vec![
        Span::styled("◀ ", theme::dimmed()),
        Span::styled(value, style),
        Span::styled(" ▶", theme::dimmed()),
    ]);
    frame.render_widget(Paragraph::new(line).block(field_block(form, field)), area);
}

/// A `width` x `height` rectangle centered in `area`, shrunk to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}
