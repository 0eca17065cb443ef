use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;

const BINDINGS: &[(&str, &str)] = &[
    ("a", "Add task"),
    ("e", "Edit selected task"),
    ("c", "Toggle complete"),
    ("d", "Delete task"),
    ("f", "Toggle filter (all/completed/uncompleted)"),
    ("s", "Change sort (default/priority/due-date/created)"),
    ("p", "Cycle priority (low/medium/high)"),
    ("u", "Edit due date for task"),
    ("t", "Set tags"),
    ("/", "Search tasks"),
    ("R", "Recovery log"),
    ("q", "Quit"),
];

/// Render the help overlay (toggled with h or ?)
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let overlay_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, overlay_area);

    let bg = app.theme.background;
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.text).bg(bg);
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = vec![Line::from(Span::styled("Commands:", header_style))];
    for (key, desc) in BINDINGS {
        lines.push(Line::from(vec![
            Span::styled(format!("\"{}\" - ", key), key_style),
            Span::styled(*desc, desc_style),
        ]));
    }

    let block = Block::default()
        .title(Span::styled(" Help ", header_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.cyan).bg(bg))
        .style(Style::default().bg(bg));
    frame.render_widget(Paragraph::new(lines).block(block), overlay_area);
}

/// Create a centered rectangle of the given percentage of the parent
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
