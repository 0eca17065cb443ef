use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;
use crate::util::unicode::truncate_to_width;

/// Render the recovery log overlay (full-screen popup)
pub fn render_recovery_overlay(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let text_color = app.theme.text;
    let dim = app.theme.dim;
    let highlight = app.theme.highlight;

    // Size: centered, taking most of the screen
    let margin_x = 4u16.min(area.width / 8);
    let margin_y = 2u16.min(area.height / 8);
    let popup_area = Rect::new(
        area.x + margin_x,
        area.y + margin_y,
        area.width.saturating_sub(margin_x * 2),
        area.height.saturating_sub(margin_y * 2),
    );

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(Span::styled(
            " Recovery Log ",
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(dim).bg(bg))
        .style(Style::default().bg(bg));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    if app.recovery_log_lines.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No recovery log entries.",
            Style::default().fg(dim).bg(bg),
        )))
        .style(Style::default().bg(bg));
        frame.render_widget(empty, inner);
        return;
    }

    // Clamp scroll so the last page stays full
    let visible_height = inner.height as usize;
    let total = app.recovery_log_lines.len();
    let scroll = app
        .recovery_log_scroll
        .min(total.saturating_sub(visible_height));
    app.recovery_log_scroll = scroll;

    let width = inner.width as usize;
    let lines: Vec<Line> = app
        .recovery_log_lines
        .iter()
        .skip(scroll)
        .take(visible_height)
        .map(|line| {
            let style = if line.starts_with("## ") {
                Style::default()
                    .fg(highlight)
                    .bg(bg)
                    .add_modifier(Modifier::BOLD)
            } else if line.starts_with("```") || line == "---" {
                Style::default().fg(dim).bg(bg)
            } else {
                Style::default().fg(text_color).bg(bg)
            };
            Line::from(Span::styled(truncate_to_width(line, width), style))
        })
        .collect();

    let paragraph = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(paragraph, inner);

    // Scroll indicator
    if total > visible_height {
        let indicator = format!(
            " {}/{} ",
            scroll + 1,
            total.saturating_sub(visible_height) + 1
        );
        let indicator_style = Style::default()
            .fg(Color::Black)
            .bg(dim)
            .add_modifier(Modifier::BOLD);
        let indicator_width = indicator.len() as u16;
        let indicator_x = popup_area.x + popup_area.width.saturating_sub(indicator_width + 1);
        let indicator_y = popup_area.y + popup_area.height.saturating_sub(1);
        let indicator_area = Rect::new(indicator_x, indicator_y, indicator_width, 1);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(indicator, indicator_style))),
            indicator_area.intersection(area),
        );
    }
}
