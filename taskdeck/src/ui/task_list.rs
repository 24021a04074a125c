//! Task list rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};
use taskdeck_proto::task::{Status, Task};

use super::theme;
use crate::app::App;

/// Render the displayed (filtered and sorted) tasks.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let view = app.snapshot.view();
    let is_focused = app.form.is_none();

    let block = Block::default()
        .title(Span::styled(
            format!("Tasks ({})", view.len()),
            theme::panel_title(theme::TASKS_TITLE),
        ))
        .borders(Borders::ALL)
        .border_style(if is_focused {
            theme::highlighted()
        } else {
            theme::normal()
        });

    if view.is_empty() {
        let hint = if app.snapshot.loading {
            "Loading tasks..."
        } else {
            "No tasks. Press n to add one."
        };
        let list = List::new([ListItem::new(Span::styled(hint, theme::dimmed()))]).block(block);
        frame.render_widget(list, area);
        return;
    }

    let items: Vec<ListItem> = view.iter().copied().map(task_item).collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(if is_focused {
            theme::selected()
        } else {
            theme::bold()
        })
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

/// One list entry: checkbox, priority badge, title and an optional
/// description line.
fn task_item(task: &Task) -> ListItem<'_> {
    let done = task.status == Status::Completed;
    let checkbox = if done { "[✓]" } else { "[ ]" };
    let title_style = if done {
        theme::completed()
    } else {
        theme::normal()
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(checkbox, title_style),
        Span::raw(" "),
        Span::styled(
            format!("{:<6}", task.priority.as_str()),
            theme::panel_title(theme::priority_color(task.priority)),
        ),
        Span::raw(" "),
        Span::styled(task.title.as_str(), title_style),
    ])];

    if !task.description.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("           {}", task.description),
            theme::dimmed(),
        )));
    }

    ListItem::new(lines)
}
