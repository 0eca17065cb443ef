use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;

pub const KEY_HINTS: &str = "Use arrow keys to select | \"a\" add | \"e\" edit | \"c\" complete | \"d\" delete | \"f\" filter | \"s\" sort | \"/\" search | \"h\" help";

/// One-line instruction bar
pub fn render_key_hints(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let line = Line::from(Span::styled(KEY_HINTS, Style::default().fg(app.theme.dim).bg(bg)));
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
}

/// Summary counts, or the transient status message while it is live
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.status_bg;
    let (text, fg) = match app.current_status() {
        Some(msg) if msg.is_error => (msg.text.clone(), app.theme.red),
        Some(msg) => (msg.text.clone(), app.theme.text_bright),
        None => (summary_text(app), app.theme.text_bright),
    };
    let line = Line::from(Span::styled(text, Style::default().fg(fg).bg(bg)));
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
}

fn summary_text(app: &App) -> String {
    let summary = app.store.summary();
    let mut text = format!(
        "Tasks: {} | Completed: {} | Filter: {} | Sort: {}",
        summary.total, summary.completed, app.settings.filter, app.settings.sort
    );
    if !app.settings.search.is_empty() {
        text.push_str(&format!(" | Search: {}", app.settings.search));
    }
    text
}
