pub mod help_overlay;
pub mod prompt;
pub mod recovery_overlay;
pub mod status_bar;
pub mod task_list;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use regex::Regex;

use super::app::{App, Mode};

/// Main render function: lays out the screen and dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    let input_open = matches!(app.mode, Mode::Input(_));
    let mut constraints = vec![
        Constraint::Length(1), // title
        Constraint::Min(3),    // task list
    ];
    if app.show_key_hints {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Length(1)); // status bar
    if input_open {
        constraints.push(Constraint::Length(3));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    render_title(frame, app, chunks[0]);
    task_list::render_task_list(frame, app, chunks[1]);

    let mut next = 2;
    if app.show_key_hints {
        status_bar::render_key_hints(frame, app, chunks[next]);
        next += 1;
    }
    status_bar::render_status_bar(frame, app, chunks[next]);
    next += 1;
    if input_open {
        prompt::render_prompt(frame, app, chunks[next]);
    }

    // Overlays are drawn over everything
    if app.show_help {
        help_overlay::render_help_overlay(frame, app, area);
    }
    if app.show_recovery_log {
        recovery_overlay::render_recovery_overlay(frame, app, area);
    }
}

fn render_title(frame: &mut Frame, app: &App, area: Rect) {
    let style = Style::default()
        .fg(app.theme.text_bright)
        .bg(app.theme.background)
        .add_modifier(Modifier::BOLD);
    let title = Paragraph::new(Line::from(Span::styled(" TaskTerm", style)))
        .style(Style::default().bg(app.theme.background));
    frame.render_widget(title, area);
}

/// Push spans for text with regex match highlighting. If no regex or no matches,
/// pushes a single span with `base_style`. Otherwise splits text at match boundaries.
pub(super) fn push_highlighted_spans<'a>(
    spans: &mut Vec<Span<'a>>,
    text: &str,
    base_style: Style,
    highlight_style: Style,
    search_re: Option<&Regex>,
) {
    let Some(re) = search_re else {
        spans.push(Span::styled(text.to_string(), base_style));
        return;
    };

    let mut last_end = 0;
    for m in re.find_iter(text) {
        if m.start() > last_end {
            spans.push(Span::styled(
                text[last_end..m.start()].to_string(),
                base_style,
            ));
        }
        spans.push(Span::styled(m.as_str().to_string(), highlight_style));
        last_end = m.end();
    }
    if last_end < text.len() || text.is_empty() {
        spans.push(Span::styled(text[last_end..].to_string(), base_style));
    }
}
